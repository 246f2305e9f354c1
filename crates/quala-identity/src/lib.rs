// quala-identity/src/lib.rs
//
// Foundational value types shared by every quala crate: source spans and
// interned qualifier labels.

mod label;
mod span;

pub use label::{Label, LabelTable};
pub use span::Span;
