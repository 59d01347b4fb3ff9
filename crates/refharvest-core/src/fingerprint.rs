use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Reference;

/// Derived dedup key for a reference. Used only for set membership during
/// fallback merging, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a reference.
    ///
    /// Priority: DOI, then title+year, then the normalized first 100
    /// characters of the raw text.
    pub fn of(reference: &Reference) -> Self {
        if let Some(doi) = &reference.doi {
            return Fingerprint(format!("doi:{}", doi.to_lowercase()));
        }
        if let (Some(title), Some(year)) = (&reference.title, reference.year) {
            return Fingerprint(format!("title_year:{}_{}", normalize(title), year));
        }
        let head: String = reference.raw_text.chars().take(100).collect();
        Fingerprint(format!("raw:{}", normalize(&head)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lowercase, trim, and collapse runs of whitespace.
fn normalize(text: &str) -> String {
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    WS_RE.replace_all(text.trim(), " ").to_lowercase()
}

/// Fingerprints of all the given references.
pub fn fingerprint_set(references: &[Reference]) -> HashSet<Fingerprint> {
    references.iter().map(Fingerprint::of).collect()
}
