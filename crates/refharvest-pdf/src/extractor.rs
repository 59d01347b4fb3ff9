use refharvest_core::{ExtractionResult, Reference};
use refharvest_parsing::{parse_reference, parse_reference_section};

use crate::layout::{self, PageWords};

/// The PDF-side extraction pipeline.
///
/// Consumes positioned words produced by the PDF collaborator and exposes
/// each pipeline step alongside the full run:
/// 1. Order the reference section text (layout-aware, column-major)
/// 2. Segment it into candidate reference strings
/// 3. Filter caption-like candidates
/// 4. Parse each survivor into a [`Reference`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReferenceExtractor;

impl PdfReferenceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Locate and order the reference section (step 1).
    pub fn extract_reference_section(&self, pages: &[PageWords]) -> String {
        layout::extract_reference_section(pages)
    }

    /// Parse a single candidate string (step 4).
    pub fn parse_reference(&self, text: &str) -> Option<Reference> {
        parse_reference(text)
    }

    /// Run the whole pipeline over a document's positioned pages.
    ///
    /// `source` identifies the document in the result (typically a file
    /// path). A document yielding no text is reported as a diagnostic with
    /// zero references; nothing here panics or errors.
    pub fn extract(&self, source: &str, pages: &[PageWords]) -> ExtractionResult {
        let mut result = ExtractionResult::new(source);

        let section = self.extract_reference_section(pages);
        if section.trim().is_empty() {
            result.push_error("No text content in reference section".to_string());
            return result;
        }

        for reference in parse_reference_section(&section) {
            result.push_reference(reference);
        }

        tracing::info!(
            source,
            count = result.total_references,
            "primary PDF extraction complete"
        );
        result
    }
}
