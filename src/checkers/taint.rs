//! Taint tracking: values derived from `tainted` data stay tainted.
//!
//! Tainted values may not reach untainted locations, pointers and references
//! must agree on taint at every nested layer, and tainted values may not
//! decide control flow. `__builtin_annotation(e, "endorse")` is the explicit
//! escape hatch: its result is `untainted` whatever `e` carried.

use quala_frontend::{CallExpr, Expr, ExprKind, Label, Stmt, TypeId};
use quala_sema::{AnnotationStore, Checker, Policy, QualifierDiagnostic, deep_positional_match};

pub const TAINTED: &str = "tainted";
pub const UNTAINTED: &str = "untainted";

/// Builtin whose second argument names an annotation for its first.
pub const ANNOTATION_BUILTIN: &str = "__builtin_annotation";
/// Annotation string that endorses a value.
pub const ENDORSE: &str = "endorse";

pub mod codes {
    /// A branch or loop decided by tainted data.
    pub const TAINTED_CONDITION: &str = "T0001";
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaintPolicy;

impl TaintPolicy {
    pub fn new() -> Self {
        Self
    }

    fn is_endorsement(cx: &Checker<'_>, call: &CallExpr) -> bool {
        let Some(callee) = cx.program().direct_callee(call) else {
            return false;
        };
        if callee.name != ANNOTATION_BUILTIN {
            return false;
        }
        matches!(
            call.args.get(1).map(|arg| &arg.ignore_paren_imp_casts().kind),
            Some(ExprKind::StringLiteral(tag)) if tag == ENDORSE
        )
    }

    fn check_condition(cx: &mut Checker<'_>, cond: &Expr) {
        if cx.expr_has_label(cond, TAINTED) {
            cx.report(
                QualifierDiagnostic::error(codes::TAINTED_CONDITION, "tainted condition")
                    .at(cond.span)
                    .with_label("control flow depends on tainted data")
                    .with_help("endorse the value with __builtin_annotation(value, \"endorse\")"),
            );
        }
    }
}

fn tainted(store: &AnnotationStore<'_>, ty: TypeId) -> bool {
    store.has_label(ty, TAINTED)
}

impl Policy for TaintPolicy {
    fn name(&self) -> &str {
        "taint"
    }

    fn labels(&self) -> &[&'static str] {
        &[TAINTED, UNTAINTED]
    }

    fn infer_expr(&self, cx: &mut Checker<'_>, expr: &Expr) -> Option<Label> {
        match &expr.kind {
            ExprKind::Binary(binary) => {
                if cx.expr_has_label(&binary.lhs, TAINTED) || cx.expr_has_label(&binary.rhs, TAINTED)
                {
                    cx.label(TAINTED)
                } else {
                    None
                }
            }
            ExprKind::Unary(unary) => cx.annotation_of(&unary.operand),
            ExprKind::ExplicitCast(inner) => cx.annotation_of(inner),
            ExprKind::Conditional(cond) => {
                Self::check_condition(cx, &cond.cond);
                if cx.expr_has_label(&cond.then_expr, TAINTED)
                    || cx.expr_has_label(&cond.else_expr, TAINTED)
                {
                    cx.label(TAINTED)
                } else {
                    None
                }
            }
            ExprKind::Call(call) if Self::is_endorsement(cx, call) => {
                // The call has the type of its first argument, so the label
                // may sit under an alias; mask it with an explicit one.
                let untainted = cx.label(UNTAINTED);
                let store = cx.store_mut();
                store.remove_outermost_label(expr);
                store.attach_label(expr, untainted);
                None
            }
            _ => cx.default_infer_expr(expr),
        }
    }

    fn check_stmt(&self, cx: &mut Checker<'_>, stmt: &Stmt) {
        if let Some(cond) = stmt.condition() {
            Self::check_condition(cx, cond);
        }
    }

    fn compatible(&self, store: &AnnotationStore<'_>, dest: TypeId, src: TypeId) -> bool {
        let types = store.types();
        // Binding a reference: the referent must agree with the value.
        if types.is_reference(dest)
            && !types.is_reference(src)
            && let Some(referent) = types.pointee(dest)
        {
            return tainted(store, referent) == tainted(store, src);
        }
        if tainted(store, src) && !tainted(store, dest) {
            return false;
        }
        if types.peel_pointer_pair(dest, src).is_some() {
            return deep_positional_match(store, dest, src, false);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quala_frontend::{LabelTable, TypeArena};

    #[test]
    fn taint_lattice() {
        let mut labels = LabelTable::new();
        let t = labels.intern(TAINTED);
        let mut arena = TypeArena::new();
        let tainted_int = arena.annotated(TypeId::INT, t);
        let store = AnnotationStore::new(&mut arena, &labels, &TaintPolicy);

        assert!(!TaintPolicy.compatible(&store, TypeId::INT, tainted_int));
        assert!(TaintPolicy.compatible(&store, tainted_int, TypeId::INT));
        assert!(TaintPolicy.compatible(&store, tainted_int, tainted_int));
    }

    #[test]
    fn pointers_are_invariant_in_both_directions() {
        let mut labels = LabelTable::new();
        let t = labels.intern(TAINTED);
        let mut arena = TypeArena::new();
        let tainted_int = arena.annotated(TypeId::INT, t);
        let tainted_int_p = arena.pointer(tainted_int);
        let int_p = arena.pointer(TypeId::INT);
        let store = AnnotationStore::new(&mut arena, &labels, &TaintPolicy);

        assert!(!TaintPolicy.compatible(&store, tainted_int_p, int_p));
        assert!(!TaintPolicy.compatible(&store, int_p, tainted_int_p));
        assert!(TaintPolicy.compatible(&store, int_p, int_p));
    }

    #[test]
    fn reference_binding_requires_matching_referent() {
        let mut labels = LabelTable::new();
        let t = labels.intern(TAINTED);
        let mut arena = TypeArena::new();
        let tainted_int = arena.annotated(TypeId::INT, t);
        let tainted_ref = arena.reference(tainted_int);
        let plain_ref = arena.reference(TypeId::INT);
        let store = AnnotationStore::new(&mut arena, &labels, &TaintPolicy);

        assert!(!TaintPolicy.compatible(&store, tainted_ref, TypeId::INT));
        assert!(TaintPolicy.compatible(&store, tainted_ref, tainted_int));
        assert!(TaintPolicy.compatible(&store, plain_ref, TypeId::INT));
    }
}
