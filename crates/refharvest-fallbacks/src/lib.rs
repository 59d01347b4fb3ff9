use std::collections::HashSet;

use refharvest_core::{
    ExtractionResult, FallbackConfig, Fingerprint, Reference, SourceKind, fingerprint_set,
};
use refharvest_pdf::TableGrid;

/// Runs secondary extraction strategies when primary yield is low.
///
/// Stages run in a fixed order (table, BibTeX, HTML structure); every
/// candidate a stage produces is admitted only if its fingerprint has not
/// been seen, either in the primary result or in an earlier stage. A stage
/// that contributes nothing records a diagnostic instead of failing, and
/// one stage's failure never blocks the rest.
#[derive(Debug, Clone, Default)]
pub struct FallbackOrchestrator {
    config: FallbackConfig,
}

impl FallbackOrchestrator {
    pub fn new() -> Self {
        Self::with_config(FallbackConfig::default())
    }

    pub fn with_config(config: FallbackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Fallbacks run only when primary extraction fell short.
    pub fn should_trigger(&self, result: &ExtractionResult) -> bool {
        result.references.len() < self.config.min_reference_threshold
    }

    /// Apply the configured fallback stages to `result`.
    ///
    /// `source_text` is the flattened document text (scanned for BibTeX
    /// blocks), `tables` the PDF collaborator's table grids, and
    /// `html_content` the raw page for web sources. References and
    /// diagnostics are only ever appended.
    pub fn apply_fallbacks(
        &self,
        mut result: ExtractionResult,
        source_text: &str,
        source: SourceKind,
        tables: Option<&[TableGrid]>,
        html_content: Option<&str>,
    ) -> ExtractionResult {
        if !self.should_trigger(&result) {
            return result;
        }

        tracing::info!(
            source = %result.source,
            kind = ?source,
            primary = result.references.len(),
            "applying fallback strategies"
        );

        let mut seen = fingerprint_set(&result.references);
        let mut added = 0usize;

        if source == SourceKind::Pdf
            && self.config.enable_table_fallback
            && let Some(tables) = tables
        {
            match refharvest_pdf::extract_from_tables(tables) {
                Ok(refs) => {
                    added += merge_stage(&mut result, refs, &mut seen, "table", "Table fallback");
                }
                Err(e) => result.push_error(format!("Table fallback: {e}")),
            }
        }

        if self.config.enable_bibtex_fallback {
            match refharvest_bibtex::extract_references_from_text(source_text) {
                Ok(refs) => {
                    added += merge_stage(&mut result, refs, &mut seen, "bibtex", "BibTeX fallback");
                }
                Err(e) => result.push_error(format!("BibTeX fallback: {e}")),
            }
        }

        if source == SourceKind::Web
            && self.config.enable_html_structure_fallback
            && let Some(html) = html_content
        {
            match refharvest_html::extract_from_html(html) {
                Ok(refs) => {
                    added += merge_stage(
                        &mut result,
                        refs,
                        &mut seen,
                        "html_structure",
                        "HTML structure fallback",
                    );
                }
                Err(e) => result.push_error(format!("HTML structure fallback: {e}")),
            }
        }

        if added == 0 {
            result.push_error("All fallback strategies failed to extract new references");
        } else {
            tracing::info!(
                added,
                total = result.references.len(),
                "fallback strategies merged"
            );
        }

        result.recount();
        result
    }
}

/// Append the stage's unseen references, tagging each with its provenance.
/// Returns how many were new.
fn merge_stage(
    result: &mut ExtractionResult,
    references: Vec<Reference>,
    seen: &mut HashSet<Fingerprint>,
    stage_tag: &str,
    stage_label: &str,
) -> usize {
    let mut new_count = 0usize;

    for mut reference in references {
        let fingerprint = Fingerprint::of(&reference);
        if seen.contains(&fingerprint) {
            continue;
        }
        seen.insert(fingerprint);
        reference.tag("fallback_stage", stage_tag);
        result.push_reference(reference);
        new_count += 1;
    }

    if new_count == 0 {
        result.push_error(format!("{stage_label}: No new unique references found"));
    } else {
        tracing::debug!(stage = stage_tag, added = new_count, "fallback stage merged");
    }
    new_count
}
