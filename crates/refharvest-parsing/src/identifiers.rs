use once_cell::sync::Lazy;
use regex::Regex;

/// Strip punctuation that commonly trails an identifier at a sentence or
/// clause boundary.
fn clean_trailing(value: &str) -> String {
    value.trim_end_matches(['.', ',', ';', ':', ')']).to_string()
}

/// Extract a DOI from reference text.
///
/// Handles `https://doi.org/10.xxxx/yyyy`, `doi:10.xxxx/yyyy` (including
/// short registrant suffixes), and bare `10.xxxx/yyyy` forms, in that
/// priority order.
pub fn extract_doi(text: &str) -> Option<String> {
    static URL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)doi\.org/(10\.\S+)").unwrap());
    if let Some(caps) = URL_RE.captures(text) {
        return Some(clean_trailing(caps.get(1).map_or("", |m| m.as_str())));
    }

    static LABELED_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\bdoi\s*:\s*(10\.\S+)").unwrap());
    if let Some(caps) = LABELED_RE.captures(text) {
        return Some(clean_trailing(caps.get(1).map_or("", |m| m.as_str())));
    }

    static BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"10\.\d{4,}/\S+").unwrap());
    BARE_RE.find(text).map(|m| clean_trailing(m.as_str()))
}

/// Extract a PubMed ID (`PMID: 12345678`).
pub fn extract_pmid(text: &str) -> Option<String> {
    static PMID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bPMID\s*:\s*(\d+)").unwrap());
    PMID_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract a new-format arXiv identifier (`YYMM.NNNNN`).
///
/// Accepts an `arXiv:` prefix, an `arxiv.org/abs/` URL, or a bare
/// boundary-delimited id.
pub fn extract_arxiv_id(text: &str) -> Option<String> {
    static PREFIXED_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\barXiv\s*:?\s*(\d{4}\.\d{4,5})").unwrap());
    if let Some(caps) = PREFIXED_RE.captures(text) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    static URL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)arxiv\.org/abs/(\d{4}\.\d{4,5})").unwrap());
    if let Some(caps) = URL_RE.captures(text) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    static BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4}\.\d{4,5})\b").unwrap());
    BARE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract all URLs from text, trailing punctuation stripped.
pub fn extract_urls(text: &str) -> Vec<String> {
    static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
    URL_RE
        .find_iter(text)
        .map(|m| clean_trailing(m.as_str()))
        .collect()
}
