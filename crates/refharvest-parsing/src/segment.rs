use once_cell::sync::Lazy;
use regex::Regex;

/// One strategy in the segmentation cascade.
///
/// Strategies are tried in [`SegmentStrategy::CASCADE`] order; the first
/// whose marker-count requirement is met wins. [`SegmentStrategy::BlankLine`]
/// is the universal fallback and always produces at least one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStrategy {
    /// `[1]`, `[2]`, ... at line starts.
    BracketNumber,
    /// `1.`, `2.`, ... at line starts.
    DottedNumber,
    /// Split after each line carrying a `doi` occurrence.
    DoiSplit,
    /// New block at each line opening with an uppercase letter and a
    /// `(YYYY)` or `YYYY.` marker.
    YearMarker,
    /// Blank-line separated blocks.
    BlankLine,
}

impl SegmentStrategy {
    pub const CASCADE: [SegmentStrategy; 5] = [
        SegmentStrategy::BracketNumber,
        SegmentStrategy::DottedNumber,
        SegmentStrategy::DoiSplit,
        SegmentStrategy::YearMarker,
        SegmentStrategy::BlankLine,
    ];

    /// Try this strategy; `None` means its requirements were not met and
    /// the cascade should move on.
    pub fn attempt(self, text: &str) -> Option<Vec<String>> {
        static BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\[\d+\]\s*").unwrap());
        static DOTTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+\.\s+").unwrap());

        match self {
            SegmentStrategy::BracketNumber => try_marker_split(text, &BRACKET_RE, 2, 10),
            SegmentStrategy::DottedNumber => try_marker_split(text, &DOTTED_RE, 2, 10),
            SegmentStrategy::DoiSplit => try_doi_split(text),
            SegmentStrategy::YearMarker => try_year_marker(text),
            SegmentStrategy::BlankLine => Some(blank_line_split(text)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SegmentStrategy::BracketNumber => "bracket_number",
            SegmentStrategy::DottedNumber => "dotted_number",
            SegmentStrategy::DoiSplit => "doi_split",
            SegmentStrategy::YearMarker => "year_marker",
            SegmentStrategy::BlankLine => "blank_line",
        }
    }
}

/// Split a reference section into candidate reference strings.
pub fn segment_references(text: &str) -> Vec<String> {
    segment_references_detailed(text).1
}

/// Like [`segment_references`], also reporting which strategy fired.
pub fn segment_references_detailed(text: &str) -> (SegmentStrategy, Vec<String>) {
    for strategy in [
        SegmentStrategy::BracketNumber,
        SegmentStrategy::DottedNumber,
        SegmentStrategy::DoiSplit,
        SegmentStrategy::YearMarker,
    ] {
        if let Some(refs) = strategy.attempt(text) {
            return (strategy, refs);
        }
    }
    (SegmentStrategy::BlankLine, blank_line_split(text))
}

/// Slice the text between consecutive markers; content before the first
/// marker (page headers, section title residue) is dropped.
fn try_marker_split(
    text: &str,
    re: &Regex,
    min_markers: usize,
    min_len: usize,
) -> Option<Vec<String>> {
    let matches: Vec<_> = re.find_iter(text).collect();
    if matches.len() < min_markers {
        return None;
    }

    let mut refs = Vec::new();
    for i in 0..matches.len() {
        let start = matches[i].end();
        let end = if i + 1 < matches.len() {
            matches[i + 1].start()
        } else {
            text.len()
        };
        let content = text[start..end].trim();
        if content.len() > min_len {
            refs.push(content.to_string());
        }
    }
    Some(refs)
}

/// A DOI terminates its reference, so each cut point is the end of a line
/// containing a `doi` occurrence.
fn try_doi_split(text: &str) -> Option<Vec<String>> {
    static DOI_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bdoi\b").unwrap());

    let occurrences = DOI_TOKEN_RE.find_iter(text).count();
    if occurrences < 2 {
        return None;
    }

    let mut cuts: Vec<usize> = Vec::new();
    for m in DOI_TOKEN_RE.find_iter(text) {
        let cut = text[m.end()..]
            .find('\n')
            .map(|i| m.end() + i + 1)
            .unwrap_or(text.len());
        if cuts.last() != Some(&cut) {
            cuts.push(cut);
        }
    }

    let mut blocks = Vec::new();
    let mut start = 0;
    for &cut in &cuts {
        let content = text[start..cut].trim();
        if content.len() > 20 {
            blocks.push(content.to_string());
        }
        start = cut;
    }
    let tail = text[start..].trim();
    if tail.len() > 20 {
        blocks.push(tail.to_string());
    }

    if blocks.len() < 2 {
        return None;
    }
    Some(blocks)
}

fn try_year_marker(text: &str) -> Option<Vec<String>> {
    static UPPER_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]").unwrap());
    static PURE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
    static YEAR_MARK_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\((?:19|20)\d{2}\)|(?:19|20)\d{2}\.").unwrap());

    let mut starts = Vec::new();
    let mut pos = 0;
    for line in text.split('\n') {
        if !line.is_empty()
            && UPPER_START_RE.is_match(line)
            && !PURE_NUMBER_RE.is_match(line.trim())
            && YEAR_MARK_RE.is_match(line)
        {
            starts.push(pos);
        }
        pos += line.len() + 1;
    }

    if starts.len() < 5 {
        return None;
    }

    let mut refs = Vec::new();
    for i in 0..starts.len() {
        let end = if i + 1 < starts.len() {
            starts[i + 1]
        } else {
            text.len()
        };
        let content = text[starts[i]..end].trim();
        if content.len() > 20 {
            refs.push(content.to_string());
        }
    }

    if refs.len() < 5 {
        return None;
    }
    Some(refs)
}

fn blank_line_split(text: &str) -> Vec<String> {
    static BLANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

    let refs: Vec<String> = BLANK_RE
        .split(text)
        .map(str::trim)
        .filter(|p| p.len() > 20)
        .map(String::from)
        .collect();

    if refs.is_empty() {
        vec![text.trim().to_string()]
    } else {
        refs
    }
}
