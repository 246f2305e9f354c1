//! Default flow points: assignment, compound assignment, call arguments,
//! declaration initializers, and returns.
//!
//! Calls the checker cannot see through are skipped on purpose. A call whose
//! argument count differs from the callee's parameter count (a variadic
//! call) and a call through a function pointer are logged at debug level and
//! never produce a diagnostic.

use quala_frontend::{CallExpr, Expr, ExprKind, Span, Stmt, TypeId};

use super::Checker;

impl<'u> Checker<'u> {
    /// Check the flow points an expression introduces, if any.
    pub(super) fn check_flow_points(&mut self, expr: &'u Expr) {
        match &expr.kind {
            ExprKind::Assign(assign) => {
                let dest = self.store.type_of(&assign.lhs);
                let src = self.store.type_of(&assign.rhs);
                self.check_flow(expr.span, dest, src);
            }
            ExprKind::CompoundAssign(assign) => {
                let dest = self.store.type_of(&assign.lhs);
                let src = self.store.type_of(&assign.rhs);
                self.check_flow(expr.span, dest, src);
            }
            ExprKind::Call(call) => self.check_call_args(expr, call),
            _ => {}
        }
    }

    fn check_call_args(&mut self, expr: &Expr, call: &'u CallExpr) {
        let Some(callee) = self.program.direct_callee(call) else {
            tracing::debug!(node = %expr.id, line = expr.span.line, "UNSOUND: indirect call");
            self.stats.unchecked_calls += 1;
            return;
        };
        if callee.params.len() != call.args.len() {
            tracing::debug!(
                callee = %callee.name,
                params = callee.params.len(),
                args = call.args.len(),
                "UNSOUND: varargs function"
            );
            self.stats.unchecked_calls += 1;
            return;
        }
        for (param, arg) in callee.params.iter().zip(&call.args) {
            let src = self.store.type_of(arg);
            self.check_flow(arg.span, param.ty, src);
        }
    }

    pub(super) fn check_return(&mut self, stmt: &Stmt, value: Option<&Expr>) {
        let Some(value) = value else {
            return;
        };
        let Some(func) = self.current_function() else {
            tracing::debug!(node = %stmt.id, "return outside of a function");
            return;
        };
        let src = self.store.type_of(value);
        self.check_flow(stmt.span, func.ret, src);
    }

    /// Ask the policy whether `src` may flow into `dest`; report at `site`
    /// if not. Policies call this for flow points of their own.
    pub fn check_flow(&mut self, site: Span, dest: TypeId, src: TypeId) {
        self.stats.flows_checked += 1;
        let policy = self.policy;
        if policy.compatible(&self.store, dest, src) {
            return;
        }
        tracing::trace!(
            dest = %self.types().display(dest, self.labels()),
            src = %self.types().display(src, self.labels()),
            "incompatible flow"
        );
        self.stats.violations += 1;
        policy.emit_incompatible_error(self, site, dest, src);
    }
}
