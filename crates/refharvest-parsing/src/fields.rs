use once_cell::sync::Lazy;
use regex::Regex;

use refharvest_core::Reference;

use crate::identifiers;

/// Parse a single candidate string into a structured [`Reference`].
///
/// Returns `None` only for candidates under 10 characters. Every
/// sub-extractor is best-effort: a pattern that fails to match leaves its
/// field unset and never affects the others, so a reference carrying
/// nothing but `raw_text` is still a successful parse.
pub fn parse_reference(text: &str) -> Option<Reference> {
    let text = text.trim();
    if text.len() < 10 {
        return None;
    }

    let mut reference = Reference::new(text);

    // Identifiers first
    reference.doi = identifiers::extract_doi(text);
    reference.pmid = identifiers::extract_pmid(text);
    reference.arxiv_id = identifiers::extract_arxiv_id(text);
    reference.url = identifiers::extract_urls(text).into_iter().next();

    reference.year = extract_year(text);

    reference.authors = extract_authors(text);
    if let Some(first) = reference.authors.first() {
        reference.first_author_last_name = extract_last_name(first);
    }

    reference.title = extract_title(text);

    reference.journal = extract_journal(text);
    reference.volume = extract_volume(text);
    reference.issue = extract_issue(text);
    reference.pages = extract_page_range(text);
    reference.publisher = extract_publisher(text);

    Some(reference)
}

/// First plausible publication year anywhere in the text.
pub fn extract_year(text: &str) -> Option<i32> {
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Author list, capped at 10 entries.
///
/// Prefers the text before a `(YYYY)` marker; otherwise scans the head of
/// the candidate for `A. Name`-style tokens.
pub fn extract_authors(text: &str) -> Vec<String> {
    static YEAR_PAREN_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\((?:19|20)\d{2}\)").unwrap());

    let mut authors = Vec::new();

    if let Some(m) = YEAR_PAREN_RE.find(text) {
        let section = text[..m.start()]
            .trim()
            .trim_end_matches(['.', ',', ';', ':']);
        authors = split_author_list(section);
    }

    if authors.is_empty() {
        static INITIAL_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"([A-Z]\.[A-Za-z\s.]+?)(?:,|\band\b|;|$)").unwrap());
        let head: String = text.chars().take(200).collect();
        authors = INITIAL_RE
            .captures_iter(&head)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
    }

    authors.truncate(10);
    authors
}

/// Split an author section on `and` when present, otherwise on commas.
fn split_author_list(section: &str) -> Vec<String> {
    static AND_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+").unwrap());

    let parts: Vec<&str> = if section.to_lowercase().contains(" and ") {
        AND_SPLIT_RE.split(section).collect()
    } else {
        section.split(',').collect()
    };

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Last name of one author: the part before the first comma, else the
/// final whitespace-separated token.
pub fn extract_last_name(author: &str) -> Option<String> {
    let author = author.trim();
    if author.is_empty() {
        return None;
    }
    if let Some(idx) = author.find(',') {
        let last = author[..idx].trim();
        if !last.is_empty() {
            return Some(last.to_string());
        }
    }
    author.split_whitespace().last().map(String::from)
}

/// Title extraction: quoted span, else the stretch before the year marker,
/// else the first plausible free-standing line.
pub fn extract_title(text: &str) -> Option<String> {
    static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']([^"']{10,})["']"#).unwrap());
    if let Some(caps) = QUOTE_RE.captures(text) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    static YEAR_PAREN_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\((?:19|20)\d{2}\)").unwrap());
    if let Some(m) = YEAR_PAREN_RE.find(text) {
        let candidate: String = text[..m.start()]
            .chars()
            .filter(|c| *c != '(' && *c != ')')
            .collect();
        let candidate = candidate.trim();
        if candidate.len() > 15 {
            return Some(candidate.chars().take(200).collect());
        }
    }

    for line in text.split('\n') {
        let line = line.trim();
        if line.len() > 15
            && line.len() < 200
            && !["http", "doi", "ISBN", "pp."]
                .iter()
                .any(|marker| line.contains(marker))
        {
            return Some(line.to_string());
        }
    }

    None
}

/// Journal/venue name: `in <Venue>,` style markers, else a name directly
/// in front of a volume number.
pub fn extract_journal(text: &str) -> Option<String> {
    static IN_VENUE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\b(?:[Ii]n|published in)\s+([A-Z][A-Za-z0-9\s&.\-]*?)[,.]").unwrap()
    });
    if let Some(caps) = IN_VENUE_RE.captures(text) {
        let journal = caps.get(1).map_or("", |m| m.as_str()).trim();
        if journal.len() > 2 {
            return Some(journal.to_string());
        }
    }

    static VOLUME_VENUE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"([A-Z][A-Za-z0-9\s&.\-]*?)\s+(?i:vol(?:ume)?)\.?\s*\d+").unwrap()
    });
    if let Some(caps) = VOLUME_VENUE_RE.captures(text) {
        let journal = caps.get(1).map_or("", |m| m.as_str()).trim();
        if journal.len() > 2 && journal.len() < 200 {
            return Some(journal.to_string());
        }
    }

    None
}

pub fn extract_volume(text: &str) -> Option<String> {
    static VOL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\bvol(?:ume)?\.?\s*(\d+)").unwrap());
    if let Some(caps) = VOL_RE.captures(text) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    // volume(issue) form
    static VOL_ISSUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*\(\d+\)").unwrap());
    VOL_ISSUE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn extract_issue(text: &str) -> Option<String> {
    static ISSUE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\b(?:issue|no|number)\.?\s*(\d+)").unwrap());
    if let Some(caps) = ISSUE_RE.captures(text) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    // Parenthesized issue; 1-3 digits so a (YYYY) year never qualifies
    static PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*(\d{1,3})\s*\)").unwrap());
    PAREN_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Page range `N-N` (with optional `pp.` prefix), else a single page.
pub fn extract_page_range(text: &str) -> Option<String> {
    static RANGE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?:pp\.?\s*)?(\d+)\s*[-\u{2013}]\s*(\d+)").unwrap());
    if let Some(caps) = RANGE_RE.captures(text) {
        let start = caps.get(1).map_or("", |m| m.as_str());
        let end = caps.get(2).map_or("", |m| m.as_str());
        return Some(format!("{start}-{end}"));
    }

    static SINGLE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?:pp\.?\s*)?(\d+)\b").unwrap());
    SINGLE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn extract_publisher(text: &str) -> Option<String> {
    static PUBLISHER_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i:published by|publisher)\s*:?\s*([A-Z][A-Za-z0-9\s,&.\-]*?)(?:[,.]|$)")
            .unwrap()
    });
    PUBLISHER_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_too_short() {
        assert!(parse_reference("short").is_none());
        assert!(parse_reference("   x   ").is_none());
    }

    #[test]
    fn test_parse_reference_raw_only_still_succeeds() {
        let r = parse_reference("an unremarkable string").unwrap();
        assert_eq!(r.raw_text, "an unremarkable string");
        assert!(r.doi.is_none());
        assert!(r.year.is_none());
        assert!(r.authors.is_empty());
    }

    #[test]
    fn test_parse_full_reference() {
        let text = "Smith, J. and Jones, A. (2023). Deep learning for reference extraction. \
                    In Journal of Testing, vol. 12(4), pp. 100-115. doi:10.1234/jtest.2023";
        let r = parse_reference(text).unwrap();
        assert_eq!(r.year, Some(2023));
        assert_eq!(r.doi.as_deref(), Some("10.1234/jtest.2023"));
        // Trailing punctuation is stripped from the author section before splitting
        assert_eq!(r.authors, vec!["Smith, J.", "Jones, A"]);
        assert_eq!(r.first_author_last_name.as_deref(), Some("Smith"));
        assert_eq!(r.volume.as_deref(), Some("12"));
        assert_eq!(r.pages.as_deref(), Some("100-115"));
    }

    #[test]
    fn test_extract_year_first_match() {
        assert_eq!(extract_year("Published 1998, revised 2004"), Some(1998));
        assert_eq!(extract_year("no year"), None);
        // 3999 is not a plausible year token
        assert_eq!(extract_year("item 3999"), None);
    }

    #[test]
    fn test_extract_authors_before_year_comma_split() {
        let authors = extract_authors("Doe, A. (2022). Other.");
        assert_eq!(authors, vec!["Doe", "A"]);
    }

    #[test]
    fn test_extract_authors_and_split() {
        let authors = extract_authors("Alice Smith and Bob Jones (2020) Title here.");
        assert_eq!(authors, vec!["Alice Smith", "Bob Jones"]);
    }

    #[test]
    fn test_extract_authors_initial_scan_fallback() {
        let authors = extract_authors("J. Smith, A. Jones, Some Title Without Year Marker");
        assert!(!authors.is_empty());
    }

    #[test]
    fn test_authors_capped_at_ten() {
        let list = (0..15)
            .map(|i| format!("Author{i} Surname{i}"))
            .collect::<Vec<_>>()
            .join(" and ");
        let text = format!("{list} (2020) Title.");
        assert_eq!(extract_authors(&text).len(), 10);
    }

    #[test]
    fn test_extract_last_name_comma_form() {
        assert_eq!(extract_last_name("Smith, J."), Some("Smith".into()));
    }

    #[test]
    fn test_extract_last_name_plain_form() {
        assert_eq!(extract_last_name("Jane van Dyke"), Some("Dyke".into()));
        assert_eq!(extract_last_name("  "), None);
    }

    #[test]
    fn test_extract_title_quoted() {
        let title = extract_title(r#"J. Smith, "A Long Enough Quoted Title," in Proc. X, 2020."#);
        assert_eq!(title.as_deref(), Some("A Long Enough Quoted Title,"));
    }

    #[test]
    fn test_extract_title_before_year() {
        let title = extract_title("Reference extraction methods and tools (2021). Venue.");
        assert_eq!(
            title.as_deref(),
            Some("Reference extraction methods and tools")
        );
    }

    #[test]
    fn test_extract_title_line_scan() {
        let text = "doi:10.1/x on this line\nA free standing title line\nhttp://skip.me";
        assert_eq!(extract_title(text).as_deref(), Some("A free standing title line"));
    }

    #[test]
    fn test_extract_journal_in_marker() {
        assert_eq!(
            extract_journal("Smith J. Title. In Nature Methods, 2020."),
            Some("Nature Methods".into())
        );
    }

    #[test]
    fn test_extract_journal_volume_marker() {
        assert_eq!(
            extract_journal("Journal of Testing vol. 12, 2020"),
            Some("Journal of Testing".into())
        );
    }

    #[test]
    fn test_extract_volume_labels_and_composite() {
        assert_eq!(extract_volume("vol. 42, 2020"), Some("42".into()));
        assert_eq!(extract_volume("Volume 7"), Some("7".into()));
        assert_eq!(extract_volume("appears in 15(3)"), Some("15".into()));
        assert_eq!(extract_volume("no volume"), None);
    }

    #[test]
    fn test_extract_issue() {
        assert_eq!(extract_issue("no. 4, 2020"), Some("4".into()));
        assert_eq!(extract_issue("15(3), 100-110"), Some("3".into()));
        assert_eq!(extract_issue("(2023)"), None);
    }

    #[test]
    fn test_extract_pages_range() {
        assert_eq!(extract_page_range("pp. 123-145"), Some("123-145".into()));
        assert_eq!(extract_page_range("pages 9\u{2013}17 roughly"), Some("9-17".into()));
    }

    #[test]
    fn test_extract_pages_single() {
        assert_eq!(extract_page_range("p. 7 only"), Some("7".into()));
        assert_eq!(extract_page_range("no digits"), None);
    }

    #[test]
    fn test_extract_publisher() {
        assert_eq!(
            extract_publisher("Published by Springer, Berlin"),
            Some("Springer".into())
        );
        assert_eq!(extract_publisher("Publisher: MIT Press."), Some("MIT Press".into()));
        assert_eq!(extract_publisher("nothing relevant"), None);
    }
}
