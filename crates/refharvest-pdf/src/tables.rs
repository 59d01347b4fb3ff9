use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use refharvest_core::Reference;
use refharvest_parsing::parse_reference;

/// One extracted table: rows of nullable cells, as delivered by the PDF
/// collaborator.
pub type TableGrid = Vec<Vec<Option<String>>>;

/// Tables with fewer rows than this are never reference tables.
const MIN_TABLE_ROWS: usize = 3;

/// Rows sampled when classifying a table.
const SAMPLE_ROWS: usize = 10;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("No reference tables detected")]
    NoReferenceTables,
}

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
static DOI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)doi:|10\.").unwrap());
static VOLUME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bvol\.?|volume").unwrap());
static PAGES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bpp\.?|pages").unwrap());
static NUMBERING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[\[\(]?\d+[\]\)]?\.?(?:\s|$)").unwrap());

const HEADER_WORDS: [&str; 5] = ["author", "title", "journal", "year", "reference"];

/// Which of the five indicator classes a cell matches.
fn indicator_classes(cell: &str) -> [bool; 5] {
    [
        YEAR_RE.is_match(cell),
        DOI_RE.is_match(cell),
        VOLUME_RE.is_match(cell),
        PAGES_RE.is_match(cell),
        NUMBERING_RE.is_match(cell),
    ]
}

/// Heuristically decide whether a table holds bibliographic references.
///
/// Samples the first rows; the table qualifies when at least two distinct
/// indicator classes appear and at least 30% of the sampled non-empty
/// cells carry some indicator.
pub fn is_reference_table(table: &TableGrid) -> bool {
    if table.len() < MIN_TABLE_ROWS {
        return false;
    }

    let mut class_seen = [false; 5];
    let mut total_cells = 0usize;
    let mut indicator_cells = 0usize;

    for row in table.iter().take(SAMPLE_ROWS) {
        for cell in row.iter().flatten() {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            total_cells += 1;

            let classes = indicator_classes(cell);
            if classes.contains(&true) {
                indicator_cells += 1;
            }
            for (seen, hit) in class_seen.iter_mut().zip(classes) {
                *seen |= hit;
            }
        }
    }

    if total_cells == 0 {
        return false;
    }

    let distinct_classes = class_seen.iter().filter(|seen| **seen).count();
    distinct_classes >= 2 && indicator_cells as f64 / total_cells as f64 >= 0.3
}

fn is_header_row(row: &[Option<String>]) -> bool {
    let row_text = row
        .iter()
        .flatten()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    HEADER_WORDS.iter().any(|w| row_text.contains(w))
}

/// Recover references from tables that classify as reference tables.
///
/// Each row becomes one candidate string (cells joined with spaces), the
/// first row is skipped when it reads like a column header, and candidates
/// over 20 chars go through the field parser.
pub fn extract_from_tables(tables: &[TableGrid]) -> Result<Vec<Reference>, TableError> {
    let mut references = Vec::new();

    for table in tables {
        if !is_reference_table(table) {
            continue;
        }
        tracing::debug!(rows = table.len(), "reference-like table found");

        for (row_idx, row) in table.iter().enumerate() {
            if row_idx == 0 && is_header_row(row) {
                tracing::debug!("skipping table header row");
                continue;
            }

            let candidate = row
                .iter()
                .flatten()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(" ");

            if candidate.len() > 20
                && let Some(reference) = parse_reference(&candidate)
            {
                references.push(reference);
            }
        }
    }

    if references.is_empty() {
        return Err(TableError::NoReferenceTables);
    }
    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn reference_table() -> TableGrid {
        vec![
            vec![cell("Author"), cell("Title"), cell("Year")],
            vec![
                cell("[1] Smith, J."),
                cell("A study of things, vol. 3"),
                cell("2020"),
            ],
            vec![
                cell("[2] Doe, A."),
                cell("Another study, doi:10.1234/x"),
                cell("2021"),
            ],
            vec![
                cell("[3] Roe, B."),
                cell("Third study, pp. 1-10"),
                cell("2022"),
            ],
        ]
    }

    fn roster_table() -> TableGrid {
        vec![
            vec![cell("Name"), cell("Age")],
            vec![cell("Alice"), cell("34")],
            vec![cell("Bob"), cell("29")],
            vec![cell("Carol"), cell("41")],
        ]
    }

    #[test]
    fn test_reference_table_classified() {
        assert!(is_reference_table(&reference_table()));
    }

    #[test]
    fn test_roster_table_rejected() {
        assert!(!is_reference_table(&roster_table()));
    }

    #[test]
    fn test_too_few_rows_rejected() {
        let table: TableGrid = vec![
            vec![cell("2020 doi:10.1/x")],
            vec![cell("2021 doi:10.1/y")],
        ];
        assert!(!is_reference_table(&table));
    }

    #[test]
    fn test_extract_skips_header_row() {
        let refs = extract_from_tables(&[reference_table()]).unwrap();
        assert_eq!(refs.len(), 3);
        assert!(refs[0].raw_text.contains("Smith"));
        assert_eq!(refs[0].year, Some(2020));
        assert_eq!(refs[1].doi.as_deref(), Some("10.1234/x"));
    }

    #[test]
    fn test_extract_no_tables_is_error() {
        let err = extract_from_tables(&[roster_table()]).unwrap_err();
        assert!(matches!(err, TableError::NoReferenceTables));
    }

    #[test]
    fn test_short_rows_dropped() {
        let table: TableGrid = vec![
            vec![cell("2020"), cell("doi:10.1/a, pp. 11-22")],
            vec![cell("2021"), cell("x")],
            vec![
                cell("Smith, J. A proper reference row from 2022, doi:10.2/b"),
                None,
            ],
        ];
        assert!(is_reference_table(&table));
        let refs = extract_from_tables(&[table]).unwrap();
        // "2021 x" is under the length floor, the other two rows clear it
        assert_eq!(refs.len(), 2);
    }
}
