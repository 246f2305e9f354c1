// label.rs
//
// Interned qualifier labels ("nullable", "tainted", ...).
//
// A label is a u32 handle into the `LabelTable` of the translation unit being
// checked. "No qualifier" is not a label value; callers use `Option<Label>`.

use rustc_hash::FxBuildHasher;

/// Interned qualifier label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    pub fn index(self) -> u32 {
        self.0
    }

    /// Create a Label with an arbitrary index in test code.
    #[doc(hidden)]
    pub fn new_for_test(index: u32) -> Self {
        Self(index)
    }
}

/// Interns label names to `Label` handles for one translation unit.
#[derive(Debug, Clone)]
pub struct LabelTable {
    map: hashbrown::HashMap<String, Label, FxBuildHasher>,
    names: Vec<String>,
}

impl Default for LabelTable {
    fn default() -> Self {
        Self {
            map: hashbrown::HashMap::with_hasher(FxBuildHasher),
            names: Vec::new(),
        }
    }
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> Label {
        let names = &mut self.names;
        *self.map.entry_ref(name).or_insert_with(|| {
            let label = Label(names.len() as u32);
            names.push(name.to_string());
            label
        })
    }

    /// Look up a label by name without interning it.
    pub fn lookup(&self, name: &str) -> Option<Label> {
        self.map.get(name).copied()
    }

    pub fn resolve(&self, label: Label) -> &str {
        &self.names[label.0 as usize]
    }

    /// Resolve an optional label, rendering absence as "unannotated".
    pub fn display(&self, label: Option<Label>) -> &str {
        label.map_or("unannotated", |l| self.resolve(l))
    }

    /// True when `label` is present and spelled `name`.
    pub fn is(&self, label: Option<Label>, name: &str) -> bool {
        label.is_some_and(|l| self.resolve(l) == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
