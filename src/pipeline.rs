//! Host integration: run a policy over each translation unit and hand the
//! resulting labels to downstream stages.
//!
//! The checker has to see a unit before any stage that reads its labels.
//! `PassOrder` states where it runs relative to the registered consumers,
//! and `Pipeline::run` refuses orderings that would starve a consumer of
//! labels.

#![allow(unused_assignments)] // False positives from thiserror derive

use std::io::Write;

use miette::Diagnostic;
use quala_frontend::TranslationUnit;
use quala_sema::errors::report;
use quala_sema::{
    AnnotationTable, CheckOptions, CheckStats, ExportError, Policy, QualifierDiagnostic, run,
};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum PipelineError {
    #[error("consumer `{consumer}` needs labels but the checker runs after it")]
    #[diagnostic(
        code(P0001),
        help("use PassOrder::BeforeConsumers, or drop the consumer's label requirement")
    )]
    LabelsUnavailable { consumer: String },

    #[error("consumer `{consumer}` failed")]
    #[diagnostic(code(P0002))]
    Consumer {
        consumer: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    #[diagnostic(code(P0003))]
    Export(#[from] ExportError),
}

/// Where the checker runs relative to the registered consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassOrder {
    /// Check first, then hand the label table to every consumer.
    #[default]
    BeforeConsumers,
    /// Run consumers first. Only valid when none of them needs labels.
    AfterConsumers,
}

/// A downstream stage (instrumentation, code generation, ...) that runs
/// once per unit.
pub trait LabelConsumer {
    fn name(&self) -> &str;

    /// Whether this consumer reads the label table.
    fn needs_labels(&self) -> bool {
        true
    }

    /// `labels` is None when the checker has not run yet.
    fn consume(
        &mut self,
        unit: &TranslationUnit,
        labels: Option<&AnnotationTable>,
    ) -> Result<(), PipelineError>;
}

/// Writes each unit's label table as JSON.
pub struct JsonTableWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonTableWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LabelConsumer for JsonTableWriter<W> {
    fn name(&self) -> &str {
        "json-table"
    }

    fn consume(
        &mut self,
        _unit: &TranslationUnit,
        labels: Option<&AnnotationTable>,
    ) -> Result<(), PipelineError> {
        let Some(labels) = labels else {
            return Ok(());
        };
        let json = labels.to_json()?;
        writeln!(self.writer, "{json}").map_err(|e| PipelineError::Consumer {
            consumer: self.name().to_string(),
            source: Box::new(e),
        })
    }
}

/// Everything one unit produced.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub diagnostics: Vec<QualifierDiagnostic>,
    pub stats: CheckStats,
    pub labels: Option<AnnotationTable>,
}

impl PipelineOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(QualifierDiagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    /// Render all diagnostics without colors.
    pub fn render(&self, unit: &TranslationUnit) -> String {
        report::render_all(&self.diagnostics, &unit.name, unit.source.as_deref())
    }
}

pub struct Pipeline<'p> {
    policy: &'p dyn Policy,
    order: PassOrder,
    options: CheckOptions,
    consumers: Vec<Box<dyn LabelConsumer + 'p>>,
}

impl<'p> Pipeline<'p> {
    pub fn new(policy: &'p dyn Policy) -> Self {
        Self {
            policy,
            order: PassOrder::default(),
            options: CheckOptions::default(),
            consumers: Vec::new(),
        }
    }

    pub fn order(mut self, order: PassOrder) -> Self {
        self.order = order;
        self
    }

    pub fn options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    pub fn consumer(mut self, consumer: impl LabelConsumer + 'p) -> Self {
        self.consumers.push(Box::new(consumer));
        self
    }

    /// Check `unit` and run the consumers in the configured order.
    pub fn run(&mut self, unit: &mut TranslationUnit) -> Result<PipelineOutput, PipelineError> {
        let _span = tracing::info_span!("pipeline", unit = %unit.name, order = ?self.order).entered();

        if self.order == PassOrder::AfterConsumers
            && let Some(consumer) = self.consumers.iter().find(|c| c.needs_labels())
        {
            return Err(PipelineError::LabelsUnavailable {
                consumer: consumer.name().to_string(),
            });
        }

        let mut options = self.options.clone();
        if self.consumers.iter().any(|c| c.needs_labels()) {
            options.collect_exports = true;
        }

        match self.order {
            PassOrder::BeforeConsumers => {
                let output = self.check(unit, &options);
                self.run_consumers(unit, output.labels.as_ref())?;
                Ok(output)
            }
            PassOrder::AfterConsumers => {
                self.run_consumers(unit, None)?;
                Ok(self.check(unit, &options))
            }
        }
    }

    fn check(&self, unit: &mut TranslationUnit, options: &CheckOptions) -> PipelineOutput {
        let _span = tracing::info_span!("check", policy = self.policy.name()).entered();
        let mut diagnostics = Vec::new();
        let output = run(self.policy, unit, &mut diagnostics, options);
        tracing::info!(
            diagnostics = diagnostics.len(),
            flows = output.stats.flows_checked,
            "checked"
        );
        PipelineOutput {
            diagnostics,
            stats: output.stats,
            labels: output.exports,
        }
    }

    fn run_consumers(
        &mut self,
        unit: &TranslationUnit,
        labels: Option<&AnnotationTable>,
    ) -> Result<(), PipelineError> {
        for consumer in &mut self.consumers {
            let _span = tracing::info_span!("consumer", name = consumer.name()).entered();
            consumer.consume(unit, labels)?;
        }
        Ok(())
    }
}
