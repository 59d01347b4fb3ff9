pub mod extractor;
pub mod layout;
pub mod tables;

pub use extractor::PdfReferenceExtractor;
pub use layout::{PageWords, Word, extract_reference_section, find_section_start, full_text};
pub use tables::{TableError, TableGrid, extract_from_tables, is_reference_table};
// Re-export domain types from core (canonical definitions live there)
pub use refharvest_core::{ExtractionResult, Reference};
