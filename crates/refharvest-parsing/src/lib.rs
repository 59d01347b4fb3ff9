pub mod fields;
pub mod filter;
pub mod identifiers;
pub mod section;
pub mod segment;

pub use fields::parse_reference;
pub use filter::is_reference_candidate;
pub use section::find_reference_section;
pub use segment::{SegmentStrategy, segment_references, segment_references_detailed};
// Re-export domain types from core (canonical definitions live there)
pub use refharvest_core::{ExtractionResult, Reference};

/// Segment a reference section, filter out non-reference candidates, and
/// parse each survivor into a [`Reference`].
///
/// This is the shared tail of both the PDF and web extraction pipelines.
pub fn parse_reference_section(section_text: &str) -> Vec<Reference> {
    segment_references(section_text)
        .iter()
        .filter(|candidate| is_reference_candidate(candidate))
        .filter_map(|candidate| parse_reference(candidate))
        .collect()
}
