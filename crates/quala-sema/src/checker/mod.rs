//! The checker: one postorder pass over a translation unit.
//!
//! `run` builds a [`Checker`] around the unit, walks every project
//! declaration, and returns what the pass observed. Policies receive the
//! checker as their context and use it to read labels, attach labels, and
//! report diagnostics.

mod flow;
mod infer;
mod traverse;


use quala_frontend::{
    Expr, FuncDecl, Label, LabelTable, Program, Span, TranslationUnit, TypeArena, TypeId,
};

use crate::errors::{DiagnosticSink, QualifierDiagnostic, Severity, codes};
use crate::export::AnnotationTable;
use crate::options::CheckOptions;
use crate::policy::Policy;
use crate::store::AnnotationStore;

/// Counters collected during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckStats {
    pub functions_checked: usize,
    pub declarations_skipped: usize,
    pub expressions_visited: usize,
    pub statements_visited: usize,
    pub flows_checked: usize,
    pub violations: usize,
    /// Calls whose arguments were not checked (variadic or indirect).
    pub unchecked_calls: usize,
}

/// Result of checking one translation unit.
#[derive(Debug, Clone, Default)]
pub struct CheckOutput {
    pub stats: CheckStats,
    /// Present when `CheckOptions::collect_exports` was set.
    pub exports: Option<AnnotationTable>,
}

pub struct Checker<'u> {
    program: &'u Program,
    store: AnnotationStore<'u>,
    policy: &'u dyn Policy,
    sink: &'u mut dyn DiagnosticSink,
    options: &'u CheckOptions,
    /// Enclosing function declarations, innermost last.
    function_stack: Vec<&'u FuncDecl>,
    exports: Option<AnnotationTable>,
    stats: CheckStats,
}

/// Check one translation unit against `policy`, reporting violations to
/// `sink`.
///
/// Interns the policy's labels into the unit's label table; labels attached
/// to expressions during the run are dropped when it returns, apart from
/// what the export table captures.
#[tracing::instrument(skip_all, fields(policy = policy.name(), unit = %unit.name))]
pub fn run<'u>(
    policy: &'u dyn Policy,
    unit: &'u mut TranslationUnit,
    sink: &'u mut dyn DiagnosticSink,
    options: &'u CheckOptions,
) -> CheckOutput {
    for name in policy.labels() {
        unit.labels.intern(name);
    }
    let exports = options
        .collect_exports
        .then(|| AnnotationTable::new(unit.name.clone(), policy.name()));
    let TranslationUnit {
        program,
        types,
        labels,
        ..
    } = unit;

    let mut checker = Checker {
        program: &*program,
        store: AnnotationStore::new(types, &*labels, policy),
        policy,
        sink,
        options,
        function_stack: Vec::new(),
        exports,
        stats: CheckStats::default(),
    };
    checker.check_program();

    tracing::debug!(stats = ?checker.stats, "unit checked");
    CheckOutput {
        stats: checker.stats,
        exports: checker.exports,
    }
}

impl<'u> Checker<'u> {
    pub fn program(&self) -> &'u Program {
        self.program
    }

    pub fn store(&self) -> &AnnotationStore<'u> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AnnotationStore<'u> {
        &mut self.store
    }

    pub fn types(&self) -> &TypeArena {
        self.store.types()
    }

    pub fn labels(&self) -> &LabelTable {
        self.store.labels()
    }

    pub fn label(&self, name: &str) -> Option<Label> {
        self.store.label(name)
    }

    pub fn type_of(&self, expr: &Expr) -> TypeId {
        self.store.type_of(expr)
    }

    pub fn annotation_of(&self, expr: &Expr) -> Option<Label> {
        self.store.annotation_of(expr)
    }

    pub fn annotation_of_type(&self, ty: TypeId) -> Option<Label> {
        self.store.annotation_of_type(ty)
    }

    /// True when the expression's label is spelled `name`.
    pub fn expr_has_label(&self, expr: &Expr, name: &str) -> bool {
        self.labels().is(self.annotation_of(expr), name)
    }

    /// Innermost function whose body is being walked.
    pub fn current_function(&self) -> Option<&'u FuncDecl> {
        self.function_stack.last().copied()
    }

    pub fn options(&self) -> &CheckOptions {
        self.options
    }

    pub fn stats(&self) -> &CheckStats {
        &self.stats
    }

    pub fn report(&mut self, diagnostic: QualifierDiagnostic) {
        tracing::trace!(code = diagnostic.code, message = %diagnostic.message, "report");
        self.sink.report(diagnostic);
    }

    /// Report the generic "<src> incompatible with <dest>" diagnostic.
    pub fn report_incompatible(&mut self, site: Span, dest: TypeId, src: TypeId, severity: Severity) {
        let labels = self.labels();
        let message = format!(
            "{} incompatible with {}",
            labels.display(self.annotation_of_type(src)),
            labels.display(self.annotation_of_type(dest)),
        );
        let label = format!(
            "`{}` flows into `{}`",
            self.types().display(src, labels),
            self.types().display(dest, labels),
        );
        let diagnostic = QualifierDiagnostic::new(severity, codes::INCOMPATIBLE, message)
            .at(site)
            .with_label(label);
        self.report(diagnostic);
    }
}
