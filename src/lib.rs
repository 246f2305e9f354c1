//! quala: pluggable, flow-sensitive qualifier type systems.
//!
//! The engine lives in [`quala_sema`]; this crate ships two qualifier
//! systems built on it ([`NullnessPolicy`], [`TaintPolicy`]) and the host
//! integration layer ([`Pipeline`]) that runs a policy over each translation
//! unit before any stage that consumes its labels.

pub mod checkers;
pub mod logging;
pub mod pipeline;

pub use checkers::nullness::NullnessPolicy;
pub use checkers::taint::TaintPolicy;
pub use pipeline::{
    JsonTableWriter, LabelConsumer, PassOrder, Pipeline, PipelineError, PipelineOutput,
};

pub use quala_frontend as frontend;
pub use quala_sema as sema;
pub use quala_sema::{
    AnnotationStore, CheckOptions, Checker, DiagnosticSink, Policy, QualifierDiagnostic, Severity,
    run,
};
