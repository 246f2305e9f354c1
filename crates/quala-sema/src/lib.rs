//! quala semantic core: label storage, the postorder traversal engine, the
//! default flow-point checks, and the `Policy` seam that qualifier systems
//! plug into.

pub mod checker;
pub mod compatibility;
pub mod errors;
pub mod export;
pub mod options;
pub mod policy;
pub mod store;

pub use checker::{CheckOutput, CheckStats, Checker, run};
pub use compatibility::{deep_positional_match, invariant, one_directional};
pub use errors::{DiagnosticSink, QualifierDiagnostic, Severity};
pub use export::{AnnotationTable, DeclEntry, ExportError, ExprEntry, LevelLabel};
pub use options::{CheckOptions, CheckOptionsBuilder};
pub use policy::{BasePolicy, Policy};
pub use store::AnnotationStore;
