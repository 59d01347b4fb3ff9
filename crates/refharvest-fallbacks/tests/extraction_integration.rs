//! End-to-end flows: primary pipelines feeding the fallback orchestrator.

use refharvest_core::{FallbackConfigBuilder, SourceKind};
use refharvest_fallbacks::FallbackOrchestrator;
use refharvest_html::WebReferenceExtractor;
use refharvest_parsing::{SegmentStrategy, segment_references_detailed};
use refharvest_pdf::{PageWords, PdfReferenceExtractor, TableGrid, Word};

fn page_from_lines(lines: &[&str]) -> PageWords {
    let mut words = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let mut x = 50.0;
        for token in line.split_whitespace() {
            let x1 = x + token.len() as f64 * 8.0;
            words.push(Word::new(
                token,
                x,
                x1,
                100.0 + i as f64 * 14.0,
                110.0 + i as f64 * 14.0,
            ));
            x = x1 + 4.0;
        }
    }
    PageWords {
        width: 600.0,
        words,
    }
}

#[test]
fn pdf_pipeline_with_rich_section_skips_fallbacks() {
    let pages = vec![page_from_lines(&[
        "References",
        "[1] Smith, J. (2020). First paper title here. doi:10.1/aa",
        "[2] Doe, A. (2021). Second paper title here. doi:10.1/bb",
        "[3] Roe, B. (2022). Third paper title here. doi:10.1/cc",
    ])];
    let primary = PdfReferenceExtractor::new().extract("paper.pdf", &pages);
    assert_eq!(primary.total_references, 3);

    let orchestrator = FallbackOrchestrator::new();
    assert!(!orchestrator.should_trigger(&primary));

    // Even with BibTeX material available, nothing runs at threshold
    let source_text = "@article{x, title={Should Not Appear}, year={2020}}";
    let out = orchestrator.apply_fallbacks(primary, source_text, SourceKind::Pdf, None, None);
    assert_eq!(out.total_references, 3);
    assert!(out.extraction_errors.is_empty());
}

#[test]
fn sparse_pdf_recovers_references_from_embedded_bibtex() {
    let pages = vec![page_from_lines(&[
        "A short note without a reference section to speak of",
    ])];
    let extractor = PdfReferenceExtractor::new();
    let primary = extractor.extract("note.pdf", &pages);
    assert!(primary.total_references < 3);

    let source_text = "body text\n\
        @article{a, author={Smith, John}, title={Recovered One}, year={2020}, doi={10.9/r1}}\n\
        @inproceedings{b, author={Doe, Jane}, title={Recovered Two}, year={2021}, doi={10.9/r2}}";
    let before = primary.total_references;
    let out = FallbackOrchestrator::new().apply_fallbacks(
        primary,
        source_text,
        SourceKind::Pdf,
        None,
        None,
    );

    assert!(out.total_references >= before);
    assert_eq!(out.total_references, out.references.len());
    let recovered: Vec<_> = out
        .references
        .iter()
        .filter(|r| r.metadata.get("fallback_stage").is_some())
        .collect();
    assert_eq!(recovered.len(), 2);
    assert_eq!(recovered[0].publication_type.as_deref(), Some("journal"));
    assert_eq!(recovered[1].publication_type.as_deref(), Some("conference"));
}

#[test]
fn sparse_pdf_recovers_references_from_tables() {
    let table: TableGrid = vec![
        vec![
            Some("Author".into()),
            Some("Title".into()),
            Some("Year".into()),
        ],
        vec![
            Some("[1] Smith, J.".into()),
            Some("Tabular citation one, vol. 3".into()),
            Some("2020".into()),
        ],
        vec![
            Some("[2] Doe, A.".into()),
            Some("Tabular citation two, doi:10.7/t2".into()),
            Some("2021".into()),
        ],
    ];
    let tables = vec![table];

    let primary = PdfReferenceExtractor::new().extract("sparse.pdf", &[]);
    let out = FallbackOrchestrator::new().apply_fallbacks(
        primary,
        "",
        SourceKind::Pdf,
        Some(&tables),
        None,
    );

    assert_eq!(out.total_references, 2);
    assert!(
        out.references
            .iter()
            .all(|r| r.metadata.get("fallback_stage").map(String::as_str) == Some("table"))
    );
    // BibTeX stage still ran and recorded its empty outcome
    assert!(
        out.extraction_errors
            .iter()
            .any(|e| e.starts_with("BibTeX fallback:"))
    );
}

#[test]
fn sparse_web_page_recovers_references_from_structure() {
    // The flattened page text hides the citations from the text pipeline,
    // but the list structure carries them.
    let html = r#"<html><body>
        <p>A stub page.</p>
        <ol id="citations">
            <li>Smith, J. (2020). Structure recovered one. doi:10.5/s1</li>
            <li>Doe, A. (2021). Structure recovered two. doi:10.5/s2</li>
        </ol>
    </body></html>"#;

    let primary = WebReferenceExtractor::new().extract("https://example.org/stub", html);
    let before = primary.total_references;

    let out = FallbackOrchestrator::new().apply_fallbacks(
        primary,
        "",
        SourceKind::Web,
        None,
        Some(html),
    );

    assert!(out.total_references >= before);
    // Every DOI survives at most once, whatever the primary pass found
    let mut dois: Vec<String> = out
        .references
        .iter()
        .filter_map(|r| r.doi.as_deref().map(str::to_lowercase))
        .collect();
    let total = dois.len();
    dois.sort();
    dois.dedup();
    assert_eq!(dois.len(), total);
    assert!(
        out.references
            .iter()
            .any(|r| r.doi.as_deref() == Some("10.5/s1"))
    );
}

#[test]
fn segmentation_priority_holds_inside_pipeline() {
    let text = "[1] Smith, J. (2023). Paper. J. of X, 10(2), 1-10. doi:10.1/a\n\
                [2] Doe, A. (2022). Other.";
    let (strategy, refs) = segment_references_detailed(text);
    assert_eq!(strategy, SegmentStrategy::BracketNumber);
    assert_eq!(refs.len(), 2);
}

#[test]
fn idempotent_end_to_end() {
    let pages = vec![page_from_lines(&[
        "References",
        "[1] Smith, J. (2020). Deterministic paper title. doi:10.4/d1",
    ])];
    let source_text = "@article{a, title={Deterministic Entry}, year={2020}, doi={10.4/d2}}";

    let run = || {
        let primary = PdfReferenceExtractor::new().extract("paper.pdf", &pages);
        FallbackOrchestrator::new().apply_fallbacks(
            primary,
            source_text,
            SourceKind::Pdf,
            None,
            None,
        )
    };

    let first = run();
    let second = run();
    assert_eq!(first.references, second.references);
    assert_eq!(first.extraction_errors, second.extraction_errors);
}

#[test]
fn stage_toggles_respected_end_to_end() {
    let config = FallbackConfigBuilder::new()
        .min_reference_threshold(5)
        .bibtex_fallback(false)
        .build();
    let orchestrator = FallbackOrchestrator::with_config(config);

    let primary = PdfReferenceExtractor::new().extract("empty.pdf", &[]);
    let out = orchestrator.apply_fallbacks(
        primary,
        "@article{a, title={Hidden By Toggle}, year={2020}}",
        SourceKind::Pdf,
        None,
        None,
    );
    assert_eq!(out.total_references, 0);
    assert!(!out.extraction_errors.iter().any(|e| e.contains("BibTeX")));
}
