//! Finalized label table handed to downstream consumers (instrumentation
//! passes and the like).
//!
//! Every entry lists the labels found on a declaration's or expression's
//! type together with their pointer level: level 0 is the value itself,
//! level 1 the pointee, and so on.

use quala_frontend::{DeclId, Expr, NodeId, Span, TypeId, VarDecl};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::store::AnnotationStore;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize annotation table: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse annotation table: {0}")]
    Parse(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLabel {
    pub label: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclEntry {
    pub decl: u32,
    pub name: String,
    pub span: Span,
    pub labels: Vec<LevelLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprEntry {
    pub node: u32,
    pub span: Span,
    pub labels: Vec<LevelLabel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationTable {
    pub unit: String,
    pub policy: String,
    pub declarations: Vec<DeclEntry>,
    pub expressions: Vec<ExprEntry>,
}

impl AnnotationTable {
    pub fn new(unit: impl Into<String>, policy: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            policy: policy.into(),
            declarations: Vec::new(),
            expressions: Vec::new(),
        }
    }

    pub(crate) fn record_decl(&mut self, store: &AnnotationStore<'_>, decl: &VarDecl) {
        let labels = labels_by_level(store, decl.ty);
        if labels.is_empty() {
            return;
        }
        self.declarations.push(DeclEntry {
            decl: decl.id.index(),
            name: decl.name.clone(),
            span: decl.span,
            labels: labels.into_vec(),
        });
    }

    pub(crate) fn record_expr(&mut self, store: &AnnotationStore<'_>, expr: &Expr) {
        let labels = labels_by_level(store, store.type_of(expr));
        if labels.is_empty() {
            return;
        }
        self.expressions.push(ExprEntry {
            node: expr.id.index(),
            span: expr.span,
            labels: labels.into_vec(),
        });
    }

    pub fn declaration(&self, decl: DeclId) -> Option<&DeclEntry> {
        self.declarations.iter().find(|d| d.decl == decl.index())
    }

    pub fn expression(&self, node: NodeId) -> Option<&ExprEntry> {
        self.expressions.iter().find(|e| e.node == node.index())
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.expressions.is_empty()
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(ExportError::Serialize)
    }

    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        serde_json::from_str(json).map_err(ExportError::Parse)
    }
}

/// Labels of `ty` and of each pointee layer below it.
fn labels_by_level(store: &AnnotationStore<'_>, ty: TypeId) -> SmallVec<[LevelLabel; 2]> {
    let mut found = SmallVec::new();
    let mut current = Some(ty);
    let mut level = 0;
    while let Some(ty) = current {
        if let Some(label) = store.annotation_of_type(ty) {
            found.push(LevelLabel {
                label: store.labels().resolve(label).to_string(),
                level,
            });
        }
        current = store.types().pointee(ty);
        level += 1;
    }
    found
}
