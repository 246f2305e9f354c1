// src/ast.rs
//
// Host syntax tree consumed by the checker. Expressions and statements carry
// a `NodeId` (unique within a translation unit) and declarations a `DeclId`.

use quala_identity::Span;

use crate::types::TypeId;

/// Unique identifier for an expression or statement node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a NodeId from a raw index. Only hosts lowering their AST should use this.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the underlying index.
    pub fn index(self) -> u32 {
        self.0
    }

    /// Create a NodeId with an arbitrary index in test code.
    #[cfg(any(test, feature = "testing"))]
    pub fn new_for_test(index: u32) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Identity of a variable or parameter declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(u32);

impl DeclId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Index of a function in [`Program::functions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(u32);

impl FuncId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Where a declaration came from. System declarations (library headers) are
/// skipped by the checker unless the host asks otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    #[default]
    Project,
    System,
}

impl Origin {
    pub fn is_system(self) -> bool {
        self == Origin::System
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    /// Type the host assigned to this expression.
    pub ty: TypeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    /// C++ `nullptr`.
    NullPtr,
    /// GNU `__null`.
    GnuNull,
    DeclRef(DeclRef),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    Assign(Box<AssignExpr>),
    CompoundAssign(Box<CompoundAssignExpr>),
    /// Conversion inserted by the host (lvalue-to-rvalue, decay, null-to-pointer, ...).
    ImplicitCast(Box<Expr>),
    /// Cast written in source.
    ExplicitCast(Box<Expr>),
    Paren(Box<Expr>),
    MaterializeTemporary(Box<Expr>),
    Call(Box<CallExpr>),
    Conditional(Box<ConditionalExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclRef {
    Var(DeclId),
    Function(FuncId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Deref,
    AddrOf,
    Neg,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Comma,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone)]
pub struct CompoundAssignExpr {
    pub op: BinaryOp,
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub cond: Expr,
    pub then_expr: Expr,
    pub else_expr: Expr,
}

impl Expr {
    /// Strip parentheses and implicit casts.
    pub fn ignore_paren_imp_casts(&self) -> &Expr {
        let mut expr = self;
        loop {
            match &expr.kind {
                ExprKind::Paren(inner) | ExprKind::ImplicitCast(inner) => expr = inner,
                _ => return expr,
            }
        }
    }

    /// Children in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::IntLiteral(_)
            | ExprKind::FloatLiteral(_)
            | ExprKind::StringLiteral(_)
            | ExprKind::NullPtr
            | ExprKind::GnuNull
            | ExprKind::DeclRef(_) => Vec::new(),
            ExprKind::Unary(u) => vec![&u.operand],
            ExprKind::Binary(b) => vec![&b.lhs, &b.rhs],
            ExprKind::Assign(a) => vec![&a.lhs, &a.rhs],
            ExprKind::CompoundAssign(a) => vec![&a.lhs, &a.rhs],
            ExprKind::ImplicitCast(inner)
            | ExprKind::ExplicitCast(inner)
            | ExprKind::Paren(inner)
            | ExprKind::MaterializeTemporary(inner) => vec![inner],
            ExprKind::Call(call) => {
                let mut children = Vec::with_capacity(call.args.len() + 1);
                children.push(&call.callee);
                children.extend(call.args.iter());
                children
            }
            ExprKind::Conditional(c) => vec![&c.cond, &c.then_expr, &c.else_expr],
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Decl(Vec<VarDecl>),
    Expr(Expr),
    Return(Option<Expr>),
    If(Box<IfStmt>),
    While(Box<WhileStmt>),
    DoWhile(Box<DoWhileStmt>),
    For(Box<ForStmt>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Stmt,
    pub else_branch: Option<Stmt>,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Stmt,
}

#[derive(Debug, Clone)]
pub struct DoWhileStmt {
    pub body: Stmt,
    pub cond: Expr,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<Stmt>,
    pub cond: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Stmt,
}

impl Stmt {
    /// The controlling condition of `if`/`while`/`do`/`for`, if any.
    pub fn condition(&self) -> Option<&Expr> {
        match &self.kind {
            StmtKind::If(s) => Some(&s.cond),
            StmtKind::While(s) => Some(&s.cond),
            StmtKind::DoWhile(s) => Some(&s.cond),
            StmtKind::For(s) => s.cond.as_ref(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// A variable, parameter, or global declaration.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub id: DeclId,
    pub name: String,
    /// Declared type, including any qualifier attributes the host resolved.
    pub ty: TypeId,
    pub init: Option<Expr>,
    pub origin: Origin,
    pub span: Span,
}

impl VarDecl {
    pub fn is_excluded(&self) -> bool {
        self.origin.is_system()
    }
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub id: FuncId,
    pub name: String,
    pub params: Vec<VarDecl>,
    pub ret: TypeId,
    pub variadic: bool,
    /// Pointer-to-function type used when the name decays in a call.
    pub fn_ptr_ty: TypeId,
    pub body: Option<Stmt>,
    pub origin: Origin,
    pub span: Span,
}

impl FuncDecl {
    pub fn is_excluded(&self) -> bool {
        self.origin.is_system()
    }
}

/// Top-level declaration, in source order.
#[derive(Debug, Clone)]
pub enum Item {
    Function(FuncId),
    Var(VarDecl),
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub items: Vec<Item>,
    pub functions: Vec<FuncDecl>,
}

impl Program {
    pub fn function(&self, id: FuncId) -> Option<&FuncDecl> {
        self.functions.get(id.index() as usize)
    }

    pub fn function_by_name(&self, name: &str) -> Option<&FuncDecl> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Resolve the statically known target of a call, looking through
    /// parentheses and the function-to-pointer decay.
    pub fn direct_callee(&self, call: &CallExpr) -> Option<&FuncDecl> {
        match call.callee.ignore_paren_imp_casts().kind {
            ExprKind::DeclRef(DeclRef::Function(id)) => self.function(id),
            _ => None,
        }
    }
}
