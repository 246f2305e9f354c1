//! Per-run configuration.

/// Options for one `run` over a translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    /// Skip declarations the host marks as system/library code.
    pub skip_excluded: bool,
    /// Build an [`AnnotationTable`](crate::export::AnnotationTable) for
    /// downstream consumers.
    pub collect_exports: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            skip_excluded: true,
            collect_exports: false,
        }
    }
}

impl CheckOptions {
    pub fn builder() -> CheckOptionsBuilder {
        CheckOptionsBuilder::default()
    }
}

/// Builder for [`CheckOptions`].
///
/// ```
/// use quala_sema::CheckOptions;
///
/// let options = CheckOptions::builder().collect_exports(true).build();
/// assert!(options.skip_excluded);
/// assert!(options.collect_exports);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CheckOptionsBuilder {
    options: CheckOptions,
}

impl CheckOptionsBuilder {
    /// Skip system declarations (default: true).
    pub fn skip_excluded(mut self, skip: bool) -> Self {
        self.options.skip_excluded = skip;
        self
    }

    /// Collect the label export table (default: false).
    pub fn collect_exports(mut self, collect: bool) -> Self {
        self.options.collect_exports = collect;
        self
    }

    pub fn build(self) -> CheckOptions {
        self.options
    }
}
