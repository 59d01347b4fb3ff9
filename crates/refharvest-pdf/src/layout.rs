use once_cell::sync::Lazy;
use regex::Regex;

/// A positioned word from a PDF page. Coordinates grow rightward (x) and
/// downward (top/bottom), matching the collaborator's word extraction.
#[derive(Debug, Clone)]
pub struct Word {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, x0: f64, x1: f64, top: f64, bottom: f64) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
            bottom,
        }
    }

    fn center_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// All positioned words of one page plus the page width.
#[derive(Debug, Clone)]
pub struct PageWords {
    pub width: f64,
    pub words: Vec<Word>,
}

/// Words closer vertically than this belong to the same line.
const LINE_TOLERANCE: f64 = 3.0;

/// Fraction of the document kept when no reference header is found.
const FALLBACK_CUTOFF: f64 = 0.7;

const REFERENCE_HEADERS: [&str; 6] = [
    "references",
    "bibliography",
    "cited works",
    "works cited",
    "literature cited",
    "reference list",
];

const CAPTION_KEYWORDS: [&str; 5] = ["figure", "fig.", "fig ", "table", "scheme"];

/// Extract the reference section from positioned pages, reading
/// multi-column layouts in column-major order.
///
/// Falls back to the last 30% of the document text when no reference
/// header can be located; the absence of a header is a normal branch, not
/// an error.
pub fn extract_reference_section(pages: &[PageWords]) -> String {
    let Some((start_page, start_y)) = find_section_start(pages) else {
        tracing::debug!("no reference header found, using document tail");
        return tail_fraction(&full_text(pages), FALLBACK_CUTOFF);
    };

    tracing::debug!(page = start_page + 1, y = start_y, "reference section located");

    let mut sections = Vec::new();
    for (idx, page) in pages.iter().enumerate().skip(start_page) {
        let mut words: Vec<&Word> = page.words.iter().collect();
        if idx == start_page {
            words.retain(|w| w.top >= start_y);
        }
        let words = filter_caption_words(words);
        if words.is_empty() {
            continue;
        }
        let ordered = order_by_columns(words, page.width);
        if !ordered.is_empty() {
            sections.push(ordered);
        }
    }

    sections.join("\n\n")
}

/// Find the page and y-position where the reference section header sits.
///
/// A header line must contain a known header phrase, stay under 50 chars,
/// and be at least as prominent as 0.9x the page's average word height.
pub fn find_section_start(pages: &[PageWords]) -> Option<(usize, f64)> {
    for (page_idx, page) in pages.iter().enumerate() {
        if page.words.is_empty() {
            continue;
        }

        let avg_height =
            page.words.iter().map(Word::height).sum::<f64>() / page.words.len() as f64;

        let words: Vec<&Word> = page.words.iter().collect();
        for line in group_into_lines(&words) {
            let line_text = line_text_lower(&line);
            if line_text.len() >= 50 {
                continue;
            }
            if !REFERENCE_HEADERS.iter().any(|h| line_text.contains(h)) {
                continue;
            }

            let line_height = line.iter().map(|w| w.height()).fold(0.0_f64, f64::max);
            if line_height >= avg_height * 0.9 {
                let y = line.iter().map(|w| w.bottom).fold(0.0_f64, f64::max);
                tracing::debug!(
                    page = page_idx + 1,
                    header = %line_text,
                    "reference header matched"
                );
                return Some((page_idx, y));
            }
        }
    }
    None
}

/// Group words into lines: sort by (top, x0), start a new line when the
/// vertical offset to the previous word exceeds the tolerance.
fn group_into_lines<'a>(words: &[&'a Word]) -> Vec<Vec<&'a Word>> {
    if words.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&Word> = words.to_vec();
    sorted.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

    let mut lines: Vec<Vec<&Word>> = Vec::new();
    let mut current = vec![sorted[0]];
    for &word in &sorted[1..] {
        let prev_top = current[current.len() - 1].top;
        if (word.top - prev_top).abs() < LINE_TOLERANCE {
            current.push(word);
        } else {
            lines.push(std::mem::replace(&mut current, vec![word]));
        }
    }
    lines.push(current);
    lines
}

fn line_text_lower(line: &[&Word]) -> String {
    line.iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_lowercase()
}

static CAPTION_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
static CAPTION_NUMBERING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[\[\(]?\d+[\]\)]?\.?\s").unwrap());

/// Drop lines that look like figure/table captions. A short caption-prefixed
/// line survives only when it carries reference indicators (year, DOI token,
/// or leading numbering).
fn filter_caption_words<'a>(words: Vec<&'a Word>) -> Vec<&'a Word> {
    if words.is_empty() {
        return words;
    }

    let mut kept = Vec::new();
    for line in group_into_lines(&words) {
        let line_text = line_text_lower(&line);

        let starts_with_caption = CAPTION_KEYWORDS.iter().any(|k| line_text.starts_with(k));
        let is_very_short = line_text.split_whitespace().count() < 6;
        let looks_like_reference = CAPTION_YEAR_RE.is_match(&line_text)
            || line_text.contains("doi")
            || line_text.contains("10.")
            || CAPTION_NUMBERING_RE.is_match(&line_text);

        if !starts_with_caption || looks_like_reference || !is_very_short {
            kept.extend(line);
        } else {
            tracing::debug!(line = %line_text, "caption line filtered");
        }
    }
    kept
}

/// Order words column-major: columns left-to-right, lines top-to-bottom
/// within each column, words left-to-right within a line.
fn order_by_columns(words: Vec<&Word>, page_width: f64) -> String {
    if words.is_empty() {
        return String::new();
    }

    let boundaries = detect_column_boundaries(&words, page_width);

    let mut columns: Vec<Vec<&Word>> = vec![Vec::new(); boundaries.len() + 1];
    for word in words {
        let mut idx = 0;
        for boundary in &boundaries {
            if word.center_x() < *boundary {
                break;
            }
            idx += 1;
        }
        columns[idx].push(word);
    }
    columns.retain(|col| !col.is_empty());

    tracing::debug!(columns = columns.len(), "page column layout detected");

    columns.sort_by(|a, b| {
        let ax = a.iter().map(|w| w.x0).fold(f64::INFINITY, f64::min);
        let bx = b.iter().map(|w| w.x0).fold(f64::INFINITY, f64::min);
        ax.total_cmp(&bx)
    });

    let mut column_texts = Vec::new();
    for col in &columns {
        let lines = group_into_lines(col);
        let line_texts: Vec<String> = lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        column_texts.push(line_texts.join("\n"));
    }
    column_texts.join("\n\n")
}

/// Detect up to two column boundaries from gaps in the distribution of
/// word-center x positions. A gap qualifies when it is wider than 10% of
/// the page width; when more than two qualify, the two widest win, ties
/// going to the gap nearer the page center.
fn detect_column_boundaries(words: &[&Word], page_width: f64) -> Vec<f64> {
    let mut xs: Vec<i64> = words.iter().map(|w| w.center_x() as i64).collect();
    xs.sort_unstable();
    xs.dedup();

    let gap_threshold = page_width * 0.1;

    // (boundary midpoint, gap width)
    let mut gaps: Vec<(f64, f64)> = Vec::new();
    for pair in xs.windows(2) {
        let width = (pair[1] - pair[0]) as f64;
        if width > gap_threshold {
            gaps.push(((pair[0] + pair[1]) as f64 / 2.0, width));
        }
    }

    if gaps.len() > 2 {
        let center = page_width / 2.0;
        gaps.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| (a.0 - center).abs().total_cmp(&(b.0 - center).abs()))
        });
        gaps.truncate(2);
    }

    let mut boundaries: Vec<f64> = gaps.into_iter().map(|(boundary, _)| boundary).collect();
    boundaries.sort_by(|a, b| a.total_cmp(b));
    boundaries
}

/// Plain line-ordered text of the whole document, used by the no-header
/// fallback and as the source text for the BibTeX fallback scan.
pub fn full_text(pages: &[PageWords]) -> String {
    let mut parts = Vec::new();
    for page in pages {
        let words: Vec<&Word> = page.words.iter().collect();
        if words.is_empty() {
            continue;
        }
        let lines = group_into_lines(&words);
        let page_text: Vec<String> = lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        parts.push(page_text.join("\n"));
    }
    parts.join("\n")
}

/// Last `1 - fraction` share of the text by character count, cut on a
/// char boundary.
fn tail_fraction(text: &str, fraction: f64) -> String {
    let cutoff = (text.len() as f64 * fraction) as usize;
    let cutoff = text
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| i >= cutoff)
        .unwrap_or(text.len());
    text[cutoff..].to_string()
}
