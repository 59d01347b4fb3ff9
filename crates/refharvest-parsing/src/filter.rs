use once_cell::sync::Lazy;
use regex::Regex;

/// Line prefixes that mark figure/table captions rather than references.
const CAPTION_KEYWORDS: [&str; 5] = ["figure", "fig.", "fig ", "table", "scheme"];

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
static DOI_HINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)doi|10\.\d{4,}/").unwrap());
static URL_HINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://").unwrap());
static AUTHOR_INITIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][a-z]+,?\s+[A-Z]\.").unwrap());

/// Decide whether a segmented candidate looks like a bibliographic
/// reference rather than a caption or stray noise.
pub fn is_reference_candidate(text: &str) -> bool {
    let text = text.trim();
    if text.len() < 15 {
        return false;
    }

    let lower = text.to_lowercase();
    let word_count = text.split_whitespace().count();

    let has_indicator = YEAR_RE.is_match(text)
        || DOI_HINT_RE.is_match(text)
        || URL_HINT_RE.is_match(text)
        || AUTHOR_INITIAL_RE.is_match(text);

    if CAPTION_KEYWORDS.iter().any(|k| lower.starts_with(k)) {
        return word_count >= 15 || has_indicator;
    }

    if has_indicator {
        return true;
    }

    word_count > 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_text() {
        assert!(!is_reference_candidate("too short"));
    }

    #[test]
    fn test_rejects_caption() {
        assert!(!is_reference_candidate("Figure 3: System overview"));
        assert!(!is_reference_candidate("Table 2: Results summary"));
    }

    #[test]
    fn test_caption_with_year_kept() {
        assert!(is_reference_candidate(
            "Figure und Grund, T. (2021). Not actually a caption."
        ));
    }

    #[test]
    fn test_caption_with_many_words_kept() {
        let text = "Table of integrals series and products compiled from many classical sources over the years by editors";
        assert!(text.split_whitespace().count() >= 15);
        assert!(is_reference_candidate(text));
    }

    #[test]
    fn test_accepts_year() {
        assert!(is_reference_candidate("Doe, A. (2022). Other."));
    }

    #[test]
    fn test_accepts_doi() {
        assert!(is_reference_candidate("Some work, doi:10.1234/xyz"));
    }

    #[test]
    fn test_accepts_author_initials() {
        assert!(is_reference_candidate("Smith, J. An undated manuscript"));
    }

    #[test]
    fn test_accepts_long_plain_text() {
        assert!(is_reference_candidate(
            "an untitled note about something with more than eight plain words in it"
        ));
    }

    #[test]
    fn test_rejects_short_plain_text() {
        assert!(!is_reference_candidate("just a few plain words"));
    }
}
