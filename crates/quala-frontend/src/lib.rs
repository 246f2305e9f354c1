//! Host view for quala: the syntax tree and type arena a host compiler hands
//! to the checker.
//!
//! quala does not parse source. A host lowers its own AST into these types
//! (or builds them directly with [`ProgramBuilder`]), seeding any source-level
//! qualifier attributes as [`HostType::Annotated`] layers on declared types.

pub mod ast;
pub mod builder;
pub mod types;
pub mod unit;

pub use ast::{
    AssignExpr, BinaryExpr, BinaryOp, CallExpr, CompoundAssignExpr, ConditionalExpr, DeclId,
    DeclRef, DoWhileStmt, Expr, ExprKind, ForStmt, FuncDecl, FuncId, IfStmt, Item, NodeId,
    Origin, Program, Stmt, StmtKind, UnaryExpr, UnaryOp, VarDecl, WhileStmt,
};
pub use builder::ProgramBuilder;
pub use quala_identity::{Label, LabelTable, Span};
pub use types::{FunctionType, HostType, PrimitiveType, TypeArena, TypeId};
pub use unit::TranslationUnit;
