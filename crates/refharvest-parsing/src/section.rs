use once_cell::sync::Lazy;
use regex::Regex;

/// Locate the reference section in plain document text.
///
/// Scans for the first common section header (References, Bibliography,
/// Works Cited, ...) and returns everything from the header onward. When
/// no header exists, a document that still carries `[n]` markers is
/// returned whole; otherwise the last 30% of lines is assumed to hold the
/// bibliography.
pub fn find_reference_section(text: &str) -> String {
    static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?i)\b(?:references?|bibliography|cited works?|works cited|further reading|sources?)\b",
        )
        .unwrap()
    });

    if let Some(m) = HEADER_RE.find(text) {
        return text[m.start()..].to_string();
    }

    static BRACKET_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\[\d+\]").unwrap());
    if BRACKET_MARKER_RE.is_match(text) {
        return text.to_string();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let start = lines.len() * 7 / 10;
    lines[start..].join("\n")
}
