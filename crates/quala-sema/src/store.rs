//! Annotation store: desugaring-aware label lookup and per-node label
//! attachment.
//!
//! Labels attached during a run live in a side table keyed by `NodeId`. The
//! host's expression types are never rewritten; `type_of` consults the side
//! table first and falls back to the type the host assigned.

use quala_frontend::{Expr, Label, LabelTable, NodeId, TypeArena, TypeId};
use rustc_hash::FxHashMap;

use crate::compatibility;
use crate::policy::Policy;

pub struct AnnotationStore<'u> {
    types: &'u mut TypeArena,
    labels: &'u LabelTable,
    policy: &'u dyn Policy,
    /// Effective type of every expression whose label changed during the run.
    node_types: FxHashMap<NodeId, TypeId>,
}

impl<'u> AnnotationStore<'u> {
    pub fn new(types: &'u mut TypeArena, labels: &'u LabelTable, policy: &'u dyn Policy) -> Self {
        Self {
            types,
            labels,
            policy,
            node_types: FxHashMap::default(),
        }
    }

    pub fn types(&self) -> &TypeArena {
        &*self.types
    }

    pub fn labels(&self) -> &LabelTable {
        self.labels
    }

    /// Look up an interned label by name.
    pub fn label(&self, name: &str) -> Option<Label> {
        self.labels.lookup(name)
    }

    /// Current type of `expr`, including labels attached so far.
    pub fn type_of(&self, expr: &Expr) -> TypeId {
        self.node_types.get(&expr.id).copied().unwrap_or(expr.ty)
    }

    /// Find the label of `ty`.
    ///
    /// Asks the policy for an implicit label first, then checks for a
    /// qualifier wrapper, then strips one alias layer and repeats. Returns
    /// None once the type has no sugar left.
    pub fn annotation_of_type(&self, ty: TypeId) -> Option<Label> {
        let mut current = ty;
        loop {
            if let Some(label) = self
                .policy
                .implicit_annotation(&*self.types, self.labels, current)
            {
                return Some(label);
            }
            if let Some(label) = self.types.own_label(current) {
                return Some(label);
            }
            current = self.types.desugar_once(current)?;
        }
    }

    pub fn annotation_of(&self, expr: &Expr) -> Option<Label> {
        self.annotation_of_type(self.type_of(expr))
    }

    /// True when `ty` carries the label spelled `name`.
    pub fn has_label(&self, ty: TypeId, name: &str) -> bool {
        self.labels.is(self.annotation_of_type(ty), name)
    }

    /// Wrap the expression's current type in `label`. No-op for None.
    pub fn attach_label(&mut self, expr: &Expr, label: Option<Label>) {
        let Some(label) = label else {
            return;
        };
        let current = self.type_of(expr);
        let wrapped = self.types.annotated(current, label);
        self.node_types.insert(expr.id, wrapped);
    }

    /// Drop the outermost qualifier wrapper of the expression's type, if any.
    ///
    /// Only one layer is removed. A label buried under an alias survives, so
    /// callers downgrading a label must follow up with `attach_label`.
    pub fn remove_outermost_label(&mut self, expr: &Expr) {
        let current = self.type_of(expr);
        if let Some(inner) = self.types.strip_annotation(current) {
            self.node_types.insert(expr.id, inner);
        }
    }

    /// See [`compatibility::deep_positional_match`].
    pub fn deep_positional_match(&self, t1: TypeId, t2: TypeId, check_outermost: bool) -> bool {
        compatibility::deep_positional_match(self, t1, t2, check_outermost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::BasePolicy;
    use quala_frontend::{ExprKind, Span};

    fn expr(id: u32, ty: TypeId) -> Expr {
        Expr {
            id: NodeId::new_for_test(id),
            kind: ExprKind::IntLiteral(0),
            ty,
            span: Span::default(),
        }
    }

    struct NullptrIsNullable;

    impl Policy for NullptrIsNullable {
        fn name(&self) -> &str {
            "nullptr-test"
        }

        fn implicit_annotation(
            &self,
            _types: &TypeArena,
            labels: &LabelTable,
            ty: TypeId,
        ) -> Option<Label> {
            if ty == TypeId::NULLPTR {
                labels.lookup("nullable")
            } else {
                None
            }
        }
    }

    #[test]
    fn unlabeled_alias_chain_is_absent() {
        let mut types = TypeArena::new();
        let a = types.alias("a", TypeId::INT);
        let b = types.alias("b", a);
        let labels = LabelTable::new();
        let store = AnnotationStore::new(&mut types, &labels, &BasePolicy);

        assert_eq!(store.annotation_of_type(b), None);
        assert_eq!(store.annotation_of_type(TypeId::INT), None);
    }

    #[test]
    fn label_found_at_every_alias_depth() {
        let mut labels = LabelTable::new();
        let tainted = labels.intern("tainted");
        let mut types = TypeArena::new();
        let mut ty = types.annotated(TypeId::INT, tainted);
        let mut chain = vec![ty];
        for depth in 0..6 {
            ty = types.alias(&format!("t{depth}"), ty);
            chain.push(ty);
        }
        let store = AnnotationStore::new(&mut types, &labels, &BasePolicy);

        for ty in chain {
            assert_eq!(store.annotation_of_type(ty), Some(tainted));
            // Repeated lookups agree.
            assert_eq!(store.annotation_of_type(ty), Some(tainted));
        }
    }

    #[test]
    fn label_under_pointer_is_not_outermost() {
        let mut labels = LabelTable::new();
        let tainted = labels.intern("tainted");
        let mut types = TypeArena::new();
        let ti = types.annotated(TypeId::INT, tainted);
        let pti = types.pointer(ti);
        let store = AnnotationStore::new(&mut types, &labels, &BasePolicy);

        assert_eq!(store.annotation_of_type(pti), None);
    }

    #[test]
    fn attach_then_lookup_round_trips() {
        let mut labels = LabelTable::new();
        let nullable = labels.intern("nullable");
        let mut types = TypeArena::new();
        let e = expr(0, TypeId::INT);
        let other = expr(1, TypeId::INT);
        let mut store = AnnotationStore::new(&mut types, &labels, &BasePolicy);

        store.attach_label(&e, Some(nullable));
        assert_eq!(store.annotation_of(&e), Some(nullable));
        // The host type is shared; only `e` sees the label.
        assert_eq!(store.annotation_of(&other), None);
    }

    #[test]
    fn attach_none_is_noop() {
        let labels = LabelTable::new();
        let mut types = TypeArena::new();
        let e = expr(0, TypeId::INT);
        let mut store = AnnotationStore::new(&mut types, &labels, &BasePolicy);

        store.attach_label(&e, None);
        assert_eq!(store.type_of(&e), TypeId::INT);
    }

    #[test]
    fn latest_attached_label_wins() {
        let mut labels = LabelTable::new();
        let tainted = labels.intern("tainted");
        let untainted = labels.intern("untainted");
        let mut types = TypeArena::new();
        let e = expr(0, TypeId::INT);
        let mut store = AnnotationStore::new(&mut types, &labels, &BasePolicy);

        store.attach_label(&e, Some(tainted));
        store.attach_label(&e, Some(untainted));
        assert_eq!(store.annotation_of(&e), Some(untainted));
    }

    #[test]
    fn remove_outermost_only_strips_one_layer() {
        let mut labels = LabelTable::new();
        let tainted = labels.intern("tainted");
        let untainted = labels.intern("untainted");
        let mut types = TypeArena::new();
        let inner = types.annotated(TypeId::INT, tainted);
        let outer = types.annotated(inner, untainted);
        let e = expr(0, outer);
        let mut store = AnnotationStore::new(&mut types, &labels, &BasePolicy);

        store.remove_outermost_label(&e);
        assert_eq!(store.annotation_of(&e), Some(tainted));
    }

    #[test]
    fn endorsement_masks_label_under_alias() {
        let mut labels = LabelTable::new();
        let tainted = labels.intern("tainted");
        let untainted = labels.intern("untainted");
        let mut types = TypeArena::new();
        let ti = types.annotated(TypeId::INT, tainted);
        let alias = types.alias("tint", ti);
        let e = expr(0, alias);
        let mut store = AnnotationStore::new(&mut types, &labels, &BasePolicy);

        // The alias is not a wrapper, so removal alone changes nothing.
        store.remove_outermost_label(&e);
        assert_eq!(store.annotation_of(&e), Some(tainted));

        store.attach_label(&e, Some(untainted));
        assert_eq!(store.annotation_of(&e), Some(untainted));
        assert_eq!(store.types().canonical(store.type_of(&e)), TypeId::INT);
    }

    #[test]
    fn implicit_annotation_takes_priority() {
        let mut labels = LabelTable::new();
        let nullable = labels.intern("nullable");
        let other = labels.intern("other");
        let mut types = TypeArena::new();
        let wrapped = types.annotated(TypeId::NULLPTR, other);
        let store = AnnotationStore::new(&mut types, &labels, &NullptrIsNullable);

        assert_eq!(store.annotation_of_type(TypeId::NULLPTR), Some(nullable));
        assert_eq!(store.annotation_of_type(wrapped), Some(other));
        assert!(store.has_label(TypeId::NULLPTR, "nullable"));
        assert!(!store.has_label(TypeId::INT, "nullable"));
    }
}
