//! Default inference rules.

use quala_frontend::{Expr, ExprKind, Label};

use super::Checker;

impl<'u> Checker<'u> {
    /// Label an expression gets when the policy does not override it.
    ///
    /// - assignments take the label of their destination
    /// - implicit casts, parentheses, and materialized temporaries pass the
    ///   label of their operand through
    /// - direct calls take the label of the callee's declared return type;
    ///   indirect calls get none
    ///
    /// Literals and everything else get no label.
    pub fn default_infer_expr(&self, expr: &Expr) -> Option<Label> {
        match &expr.kind {
            ExprKind::Assign(assign) => self.annotation_of(&assign.lhs),
            ExprKind::CompoundAssign(assign) => self.annotation_of(&assign.lhs),
            ExprKind::ImplicitCast(inner)
            | ExprKind::Paren(inner)
            | ExprKind::MaterializeTemporary(inner) => self.annotation_of(inner),
            ExprKind::Call(call) => self
                .program
                .direct_callee(call)
                .and_then(|callee| self.annotation_of_type(callee.ret)),
            _ => None,
        }
    }
}
