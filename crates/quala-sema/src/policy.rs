//! The `Policy` seam: everything a qualifier system customizes.
//!
//! The engine owns traversal, flow-point checking, and diagnostics plumbing.
//! A policy overrides only the hooks it needs; every hook has a default that
//! reproduces the framework's base behavior.

use quala_frontend::{Expr, Label, LabelTable, Span, Stmt, TypeArena, TypeId};

use crate::checker::Checker;
use crate::errors::Severity;
use crate::store::AnnotationStore;

pub trait Policy {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Label names this policy uses. Interned into the unit's label table
    /// before the run, so `LabelTable::lookup` always finds them.
    fn labels(&self) -> &[&'static str] {
        &[]
    }

    /// A label hard-wired onto a type by identity, consulted before any
    /// explicit qualifier. Must be a pure function of `ty`.
    fn implicit_annotation(
        &self,
        _types: &TypeArena,
        _labels: &LabelTable,
        _ty: TypeId,
    ) -> Option<Label> {
        None
    }

    /// Label for `expr`, called after all of its children were visited and
    /// after the engine's flow checks for it ran. The engine attaches the
    /// returned label to the expression.
    fn infer_expr(&self, cx: &mut Checker<'_>, expr: &Expr) -> Option<Label> {
        cx.default_infer_expr(expr)
    }

    /// Extra checks on a statement, after its children were visited.
    fn check_stmt(&self, _cx: &mut Checker<'_>, _stmt: &Stmt) {}

    /// Whether a value of type `src` may flow into a location of type `dest`.
    fn compatible(&self, _store: &AnnotationStore<'_>, _dest: TypeId, _src: TypeId) -> bool {
        true
    }

    /// Severity of the default incompatible-flow diagnostic.
    fn incompatible_severity(&self) -> Severity {
        Severity::Error
    }

    /// Report a failed `compatible` check at `site`.
    fn emit_incompatible_error(&self, cx: &mut Checker<'_>, site: Span, dest: TypeId, src: TypeId) {
        cx.report_incompatible(site, dest, src, self.incompatible_severity());
    }
}

/// Policy with no labels and no constraints. Useful for walking a unit to
/// collect the labels its declarations already carry.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasePolicy;

impl Policy for BasePolicy {
    fn name(&self) -> &str {
        "base"
    }
}
