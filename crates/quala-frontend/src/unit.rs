// src/unit.rs
//
// One translation unit: the program plus the type arena and label table its
// types refer to.

use quala_identity::LabelTable;

use crate::ast::Program;
use crate::types::TypeArena;

#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub name: String,
    /// Source text, when the host has it; used only for rendering diagnostics.
    pub source: Option<String>,
    pub program: Program,
    pub types: TypeArena,
    pub labels: LabelTable,
}

impl TranslationUnit {
    pub fn new(name: impl Into<String>, program: Program, types: TypeArena, labels: LabelTable) -> Self {
        Self {
            name: name.into(),
            source: None,
            program,
            types,
            labels,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
