//! Building blocks for `Policy::compatible`.
//!
//! Pure functions over the annotation store; none of them report anything.

use quala_frontend::TypeId;

use crate::store::AnnotationStore;

/// Compare labels layer by layer under matching pointer/reference nesting.
///
/// Peels one pointer (or reference) layer off both types at a time and
/// requires the labels of the peeled types to be equal. When
/// `check_outermost` is set the labels of `t1` and `t2` themselves must match
/// too. If the nesting depths differ, only the common prefix is compared.
pub fn deep_positional_match(
    store: &AnnotationStore<'_>,
    t1: TypeId,
    t2: TypeId,
    check_outermost: bool,
) -> bool {
    if check_outermost && store.annotation_of_type(t1) != store.annotation_of_type(t2) {
        return false;
    }
    let types = store.types();
    let (mut a, mut b) = (t1, t2);
    while let Some((pa, pb)) = types.peel_pointer_pair(a, b) {
        if store.annotation_of_type(pa) != store.annotation_of_type(pb) {
            return false;
        }
        a = pa;
        b = pb;
    }
    true
}

/// One-directional lattice: a source carrying `label` only flows into a
/// destination that carries it as well.
pub fn one_directional(store: &AnnotationStore<'_>, dest: TypeId, src: TypeId, label: &str) -> bool {
    store.has_label(dest, label) || !store.has_label(src, label)
}

/// Invariant lattice: labels equal at the top and at every nested layer.
pub fn invariant(store: &AnnotationStore<'_>, dest: TypeId, src: TypeId) -> bool {
    deep_positional_match(store, dest, src, true)
}
