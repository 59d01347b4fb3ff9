use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use refharvest_core::Reference;

#[derive(Error, Debug)]
pub enum BibtexError {
    #[error("No BibTeX blocks detected")]
    NoBlocks,
}

/// Extract balanced `@type{...}` blocks from arbitrary text.
///
/// Brace counting from each opening brace finds the matching close, so
/// nested braces inside field values (`title = {The {X} system}`) stay
/// inside their block. A block whose braces never balance is dropped.
pub fn extract_bibtex_blocks(text: &str) -> Vec<&str> {
    static ENTRY_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)\s*\{").unwrap());

    let bytes = text.as_bytes();
    let mut blocks = Vec::new();

    for m in ENTRY_START_RE.find_iter(text) {
        let brace_start = m.end() - 1;

        let mut depth = 0i32;
        let mut end = None;
        for (offset, b) in bytes[brace_start..].iter().enumerate() {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(brace_start + offset + 1);
                        break;
                    }
                }
                _ => {}
            }
        }

        if let Some(end) = end {
            blocks.push(&text[m.start()..end]);
        }
    }

    blocks
}

/// Map a BibTeX entry type to a publication type.
fn publication_type(entry_type: &str) -> &'static str {
    match entry_type {
        "article" => "journal",
        "inproceedings" => "conference",
        "incollection" | "book" => "book",
        "phdthesis" | "mastersthesis" => "thesis",
        _ => "other",
    }
}

/// Parse the `field = {value}` / `field = "value"` assignments of an entry.
fn parse_fields(entry: &str) -> HashMap<String, String> {
    static FIELD_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"(\w+)\s*=\s*(?:\{([^{}]*)\}|"([^"]*)")"#).unwrap());

    let mut fields = HashMap::new();
    for caps in FIELD_RE.captures_iter(entry) {
        let name = caps
            .get(1)
            .map_or(String::new(), |m| m.as_str().to_lowercase());
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str())
            .trim();
        if !value.is_empty() {
            fields.insert(name, value.to_string());
        }
    }
    fields
}

/// Split a BibTeX author field on `" and "`, collapsing whitespace in each
/// name; capped at 10 authors.
fn parse_authors(author_field: &str) -> Vec<String> {
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    author_field
        .split(" and ")
        .map(|a| WS_RE.replace_all(a.trim(), " ").to_string())
        .filter(|a| !a.is_empty())
        .take(10)
        .collect()
}

fn last_name(author: &str) -> Option<String> {
    let author = author.trim();
    if let Some(idx) = author.find(',') {
        let last = author[..idx].trim();
        if !last.is_empty() {
            return Some(last.to_string());
        }
    }
    author.split_whitespace().last().map(String::from)
}

/// Parse one balanced BibTeX block into a [`Reference`].
///
/// Returns `None` for blocks without a recognizable `@type{key,` shape.
pub fn parse_bibtex_entry(entry: &str) -> Option<Reference> {
    static TYPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@(\w+)\s*\{").unwrap());
    static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+\s*\{\s*([^,{}]+)\s*,").unwrap());
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

    let entry = entry.trim();
    let entry_type = TYPE_RE.captures(entry)?.get(1)?.as_str().to_lowercase();
    let citation_key = KEY_RE.captures(entry)?.get(1)?.as_str().trim().to_string();

    let fields = parse_fields(entry);

    let raw_text = WS_RE.replace_all(entry, " ").to_string();
    let mut reference = Reference::new(raw_text);
    reference.tag("source", "bibtex");
    reference.tag("entry_type", entry_type.clone());
    reference.tag("citation_key", citation_key);

    reference.title = fields.get("title").cloned();
    reference.authors = fields.get("author").map(|a| parse_authors(a)).unwrap_or_default();
    if let Some(first) = reference.authors.first() {
        reference.first_author_last_name = last_name(first);
    }

    reference.year = fields
        .get("year")
        .and_then(|y| YEAR_RE.find(y))
        .and_then(|m| m.as_str().parse().ok());

    reference.journal = fields
        .get("journal")
        .or_else(|| fields.get("booktitle"))
        .cloned();
    reference.volume = fields.get("volume").cloned();
    reference.issue = fields.get("number").cloned();
    reference.pages = fields.get("pages").cloned();
    reference.publisher = fields.get("publisher").cloned();
    reference.doi = fields
        .get("doi")
        .map(|d| d.trim_start_matches("doi:").trim().to_string());
    reference.url = fields.get("url").cloned();

    reference.publication_type = Some(publication_type(&entry_type).to_string());

    Some(reference)
}

/// Scan arbitrary text for embedded BibTeX entries and parse them all.
///
/// Errors with [`BibtexError::NoBlocks`] when the text carries no balanced
/// entry at all; individually malformed entries are skipped silently.
pub fn extract_references_from_text(text: &str) -> Result<Vec<Reference>, BibtexError> {
    let blocks = extract_bibtex_blocks(text);

    let references: Vec<Reference> = blocks
        .iter()
        .filter_map(|block| parse_bibtex_entry(block))
        .collect();

    if references.is_empty() {
        return Err(BibtexError::NoBlocks);
    }
    Ok(references)
}
