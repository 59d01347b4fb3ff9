/// Configuration for the fallback orchestrator.
///
/// An immutable value passed in at construction; there is no process-wide
/// mutable configuration. Use [`FallbackConfigBuilder`] to override
/// individual settings.
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    /// Fallback stages run only when the primary extraction yielded fewer
    /// references than this.
    pub min_reference_threshold: usize,
    pub enable_table_fallback: bool,
    pub enable_bibtex_fallback: bool,
    pub enable_html_structure_fallback: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            min_reference_threshold: 3,
            enable_table_fallback: true,
            enable_bibtex_fallback: true,
            enable_html_structure_fallback: true,
        }
    }
}

/// Builder for [`FallbackConfig`].
#[derive(Debug, Clone, Default)]
pub struct FallbackConfigBuilder {
    min_reference_threshold: Option<usize>,
    enable_table_fallback: Option<bool>,
    enable_bibtex_fallback: Option<bool>,
    enable_html_structure_fallback: Option<bool>,
}

impl FallbackConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_reference_threshold(mut self, n: usize) -> Self {
        self.min_reference_threshold = Some(n);
        self
    }

    pub fn table_fallback(mut self, enabled: bool) -> Self {
        self.enable_table_fallback = Some(enabled);
        self
    }

    pub fn bibtex_fallback(mut self, enabled: bool) -> Self {
        self.enable_bibtex_fallback = Some(enabled);
        self
    }

    pub fn html_structure_fallback(mut self, enabled: bool) -> Self {
        self.enable_html_structure_fallback = Some(enabled);
        self
    }

    pub fn build(self) -> FallbackConfig {
        let defaults = FallbackConfig::default();
        FallbackConfig {
            min_reference_threshold: self
                .min_reference_threshold
                .unwrap_or(defaults.min_reference_threshold),
            enable_table_fallback: self
                .enable_table_fallback
                .unwrap_or(defaults.enable_table_fallback),
            enable_bibtex_fallback: self
                .enable_bibtex_fallback
                .unwrap_or(defaults.enable_bibtex_fallback),
            enable_html_structure_fallback: self
                .enable_html_structure_fallback
                .unwrap_or(defaults.enable_html_structure_fallback),
        }
    }
}
