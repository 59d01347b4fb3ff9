use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use refharvest_core::{ExtractionResult, Reference};
use refharvest_parsing::{find_reference_section, parse_reference, parse_reference_section};

#[derive(Error, Debug)]
pub enum HtmlError {
    #[error("No structured citation elements found")]
    NoCitationElements,
}

/// id/class tokens that mark a reference section container.
const SECTION_TOKENS: [&str; 7] = [
    "references",
    "reference",
    "bibliography",
    "cited-works",
    "works-cited",
    "citations",
    "refs",
];

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
static DOI_HINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)doi|10\.\d{4,}/").unwrap());
static URL_HINT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://").unwrap());
static AUTHOR_INITIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][a-z]+,?\s+[A-Z]\.").unwrap());
static LIST_INDICATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)doi|http|et al|\bvol|\bpp\.|\b(?:19|20)\d{2}\b").unwrap());

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn normalize_ws(text: &str) -> String {
    WS_RE.replace_all(text.trim(), " ").to_string()
}

/// Recover references from the structural elements of an HTML document.
///
/// Section discovery priority: an element whose id/class names a reference
/// container, then a references heading (its parent `section`/`div`, the
/// next list after it, or its next sibling), then any list whose leading
/// items read like citations.
pub fn extract_from_html(html: &str) -> Result<Vec<Reference>, HtmlError> {
    let document = Html::parse_document(html);

    let Some(section) = find_section(&document) else {
        return Err(HtmlError::NoCitationElements);
    };

    let references: Vec<Reference> = section_items(section)
        .iter()
        .filter(|item| is_reference_item(item))
        .filter_map(|item| parse_reference(item))
        .collect();

    if references.is_empty() {
        return Err(HtmlError::NoCitationElements);
    }

    tracing::debug!(count = references.len(), "structural citation elements parsed");
    Ok(references)
}

fn find_section(document: &Html) -> Option<ElementRef<'_>> {
    // Priority (a): id/class token match
    let attributed = Selector::parse("[id], [class]").unwrap();
    for element in document.select(&attributed) {
        if let Some(id) = element.value().attr("id")
            && SECTION_TOKENS.contains(&id.to_lowercase().as_str())
        {
            return Some(element);
        }
        for class in element.value().classes() {
            if SECTION_TOKENS.contains(&class.to_lowercase().as_str()) {
                return Some(element);
            }
        }
    }

    // Priority (b): a references heading
    let headings = Selector::parse("h1, h2, h3, h4").unwrap();
    for heading in document.select(&headings) {
        let text = heading.text().collect::<String>().to_lowercase();
        if !(text.contains("reference")
            || text.contains("bibliography")
            || text.contains("cited work"))
        {
            continue;
        }

        if let Some(parent) = heading.parent().and_then(ElementRef::wrap) {
            let name = parent.value().name();
            if name == "section" || name == "div" {
                return Some(parent);
            }
        }
        if let Some(list) = next_list_after(document, &heading) {
            return Some(list);
        }
        if let Some(sibling) = heading.next_siblings().find_map(ElementRef::wrap) {
            return Some(sibling);
        }
    }

    // Priority (c): a list whose leading items read like citations
    let lists = Selector::parse("ol, ul").unwrap();
    let item_sel = Selector::parse("li").unwrap();
    for list in document.select(&lists) {
        let leading: Vec<String> = list
            .select(&item_sel)
            .take(5)
            .map(|li| normalize_ws(&li.text().collect::<String>()))
            .collect();
        if leading.is_empty() {
            continue;
        }
        let hits = leading
            .iter()
            .filter(|item| LIST_INDICATOR_RE.is_match(item))
            .count();
        if hits as f64 / leading.len() as f64 > 0.6 {
            return Some(list);
        }
    }

    None
}

/// First `ol`/`ul` that appears after the heading in document order.
fn next_list_after<'a>(document: &'a Html, heading: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let heading_id = heading.id();
    let mut past_heading = false;
    for node in document.tree.root().descendants() {
        if node.id() == heading_id {
            past_heading = true;
            continue;
        }
        if !past_heading {
            continue;
        }
        if let Some(element) = ElementRef::wrap(node) {
            let name = element.value().name();
            if name == "ol" || name == "ul" {
                return Some(element);
            }
        }
    }
    None
}

/// Pull candidate item strings out of the chosen section: list items of
/// nested lists first, then any `li`, then `p`/`div` children.
fn section_items(section: ElementRef<'_>) -> Vec<String> {
    let nested_items = Selector::parse("ol li, ul li").unwrap();
    let any_item = Selector::parse("li").unwrap();

    let items = texts_of(section.select(&nested_items));
    if !items.is_empty() {
        return items;
    }

    let items = texts_of(section.select(&any_item));
    if !items.is_empty() {
        return items;
    }

    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "p" | "div"))
        .map(|el| normalize_ws(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn texts_of<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    elements
        .map(|el| normalize_ws(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_reference_item(text: &str) -> bool {
    text.len() >= 20
        && (YEAR_RE.is_match(text)
            || DOI_HINT_RE.is_match(text)
            || URL_HINT_RE.is_match(text)
            || AUTHOR_INITIAL_RE.is_match(text))
}

/// Flatten an HTML document to text, dropping `<script>`/`<style>` content.
/// Each text node lands on its own line so list items and headings stay
/// segmentable.
pub fn flatten_html_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_skipped_tag = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| matches!(el.name(), "script" | "style"))
        });
        if in_skipped_tag {
            continue;
        }
        let piece = text.trim();
        if piece.is_empty() {
            continue;
        }
        out.push_str(piece);
        out.push('\n');
    }

    out
}

/// The web-side extraction pipeline: flatten the page, locate the
/// reference section in the text, segment, filter, and parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebReferenceExtractor;

impl WebReferenceExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, source: &str, html: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new(source);

        let text = flatten_html_text(html);
        if text.trim().is_empty() {
            result.push_error("No text content in HTML document");
            return result;
        }

        let section = find_reference_section(&text);
        for reference in parse_reference_section(&section) {
            result.push_reference(reference);
        }

        tracing::info!(
            source,
            count = result.total_references,
            "primary web extraction complete"
        );
        result
    }
}
