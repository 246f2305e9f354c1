//! Nullness: pointers are non-null unless declared `nullable`.
//!
//! Null constants (`0`, `__null`, `nullptr`) are nullable. A nullable value
//! may only flow into a nullable pointer, and pointers-to-pointers must agree
//! on the nullability of every nested layer. Violations are warnings.

use quala_frontend::{Expr, ExprKind, Label, LabelTable, Span, TypeArena, TypeId, UnaryOp};
use quala_sema::{
    AnnotationStore, Checker, Policy, QualifierDiagnostic, Severity, deep_positional_match,
    one_directional,
};

pub const NULLABLE: &str = "nullable";

pub mod codes {
    /// A nullable value flows into a non-null location.
    pub const MAY_BECOME_NULL: &str = "N0001";
    /// `*p` where `p` may be null.
    pub const NULLABLE_DEREF: &str = "N0002";
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullnessPolicy;

impl NullnessPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for NullnessPolicy {
    fn name(&self) -> &str {
        "nullness"
    }

    fn labels(&self) -> &[&'static str] {
        &[NULLABLE]
    }

    /// `nullptr_t` is always nullable.
    fn implicit_annotation(&self, _types: &TypeArena, labels: &LabelTable, ty: TypeId) -> Option<Label> {
        if ty == TypeId::NULLPTR {
            labels.lookup(NULLABLE)
        } else {
            None
        }
    }

    fn infer_expr(&self, cx: &mut Checker<'_>, expr: &Expr) -> Option<Label> {
        match &expr.kind {
            ExprKind::IntLiteral(0) | ExprKind::GnuNull => cx.label(NULLABLE),
            ExprKind::Unary(unary) => {
                if unary.op == UnaryOp::Deref && cx.expr_has_label(&unary.operand, NULLABLE) {
                    cx.report(
                        QualifierDiagnostic::warning(
                            codes::NULLABLE_DEREF,
                            "dereferencing nullable pointer",
                        )
                        .at(expr.span)
                        .with_label("pointer may be null here"),
                    );
                }
                // Address-of is never null; other operators carry no label.
                None
            }
            _ => cx.default_infer_expr(expr),
        }
    }

    fn compatible(&self, store: &AnnotationStore<'_>, dest: TypeId, src: TypeId) -> bool {
        if store.types().is_pointer(dest) && !one_directional(store, dest, src, NULLABLE) {
            return false;
        }
        deep_positional_match(store, dest, src, false)
    }

    fn incompatible_severity(&self) -> Severity {
        Severity::Warning
    }

    fn emit_incompatible_error(&self, cx: &mut Checker<'_>, site: Span, dest: TypeId, _src: TypeId) {
        let dest_ty = cx.types().display(dest, cx.labels());
        cx.report(
            QualifierDiagnostic::new(
                self.incompatible_severity(),
                codes::MAY_BECOME_NULL,
                "non-null pointer may become null",
            )
            .at(site)
            .with_label(format!("`{dest_ty}` is not nullable"))
            .with_help("declare the destination `nullable` or check for null first"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quala_frontend::LabelTable;

    struct Types {
        arena: TypeArena,
        labels: LabelTable,
        int_p: TypeId,
        nullable_int_p: TypeId,
        int_pp: TypeId,
        nullable_int_p_p: TypeId,
    }

    fn types() -> Types {
        let mut labels = LabelTable::new();
        let nullable = labels.intern(NULLABLE);
        let mut arena = TypeArena::new();
        let int_p = arena.pointer(TypeId::INT);
        let nullable_int_p = arena.annotated(int_p, nullable);
        let int_pp = arena.pointer(int_p);
        let nullable_int_p_p = arena.pointer(nullable_int_p);
        Types {
            arena,
            labels,
            int_p,
            nullable_int_p,
            int_pp,
            nullable_int_p_p,
        }
    }

    #[test]
    fn nullable_into_non_null_pointer_fails() {
        let mut t = types();
        let (int_p, nullable_int_p) = (t.int_p, t.nullable_int_p);
        let store = AnnotationStore::new(&mut t.arena, &t.labels, &NullnessPolicy);

        assert!(!NullnessPolicy.compatible(&store, int_p, nullable_int_p));
        assert!(NullnessPolicy.compatible(&store, nullable_int_p, int_p));
        assert!(NullnessPolicy.compatible(&store, nullable_int_p, nullable_int_p));
    }

    #[test]
    fn nested_nullability_is_invariant() {
        let mut t = types();
        let (int_pp, nullable_int_p_p) = (t.int_pp, t.nullable_int_p_p);
        let store = AnnotationStore::new(&mut t.arena, &t.labels, &NullnessPolicy);

        assert!(!NullnessPolicy.compatible(&store, int_pp, nullable_int_p_p));
        assert!(!NullnessPolicy.compatible(&store, nullable_int_p_p, int_pp));
    }

    #[test]
    fn nullptr_type_is_implicitly_nullable() {
        let mut t = types();
        let int_p = t.int_p;
        let store = AnnotationStore::new(&mut t.arena, &t.labels, &NullnessPolicy);

        assert!(store.has_label(TypeId::NULLPTR, NULLABLE));
        assert!(!NullnessPolicy.compatible(&store, int_p, TypeId::NULLPTR));
    }

    #[test]
    fn null_constant_into_integer_is_fine() {
        let mut t = types();
        let nullable_int = {
            let nullable = t.labels.intern(NULLABLE);
            t.arena.annotated(TypeId::INT, nullable)
        };
        let store = AnnotationStore::new(&mut t.arena, &t.labels, &NullnessPolicy);

        assert!(NullnessPolicy.compatible(&store, TypeId::INT, nullable_int));
    }
}
