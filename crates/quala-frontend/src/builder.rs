// src/builder.rs
//
// Programmatic construction of a translation unit.
//
// Hosts without an AST of their own, and the test suites, assemble programs
// here. Node and declaration ids are allocated from interior counters so that
// expression constructors only need `&self` and can be nested freely:
//
//     let y_eq_x = b.expr_stmt(b.assign(b.var_ref(&y), b.rvalue(b.var_ref(&x))));
//
// Every node gets a synthetic span on the line set by `at`, which lets tests
// point at "the assignment on line 9" the way a source file would.

use std::cell::Cell;

use quala_identity::{LabelTable, Span};

use crate::ast::{
    AssignExpr, BinaryExpr, BinaryOp, CallExpr, CompoundAssignExpr, ConditionalExpr, DeclId,
    DeclRef, DoWhileStmt, Expr, ExprKind, ForStmt, FuncDecl, FuncId, IfStmt, Item, NodeId, Origin,
    Program, Stmt, StmtKind, UnaryExpr, UnaryOp, VarDecl, WhileStmt,
};
use crate::types::{TypeArena, TypeId};
use crate::unit::TranslationUnit;

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    types: TypeArena,
    labels: LabelTable,
    program: Program,
    origin: Origin,
    next_node: Cell<u32>,
    next_decl: Cell<u32>,
    line: Cell<u32>,
    offset: Cell<usize>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        let builder = Self::default();
        builder.line.set(1);
        builder
    }

    /// Set the line used for the spans of subsequently built nodes.
    pub fn at(&self, line: u32) -> &Self {
        self.line.set(line);
        self
    }

    /// Origin recorded on subsequently declared variables and functions.
    pub fn set_origin(&mut self, origin: Origin) {
        self.origin = origin;
    }

    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn finish(self, name: impl Into<String>) -> TranslationUnit {
        TranslationUnit::new(name, self.program, self.types, self.labels)
    }

    fn node_id(&self) -> NodeId {
        let id = self.next_node.get();
        self.next_node.set(id + 1);
        NodeId::new(id)
    }

    fn decl_id(&self) -> DeclId {
        let id = self.next_decl.get();
        self.next_decl.set(id + 1);
        DeclId::new(id)
    }

    fn span(&self) -> Span {
        let start = self.offset.get();
        self.offset.set(start + 1);
        Span::new(start, start + 1, self.line.get(), 1)
    }

    fn expr(&self, kind: ExprKind, ty: TypeId) -> Expr {
        Expr {
            id: self.node_id(),
            kind,
            ty,
            span: self.span(),
        }
    }

    fn stmt(&self, kind: StmtKind) -> Stmt {
        Stmt {
            id: self.node_id(),
            kind,
            span: self.span(),
        }
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        self.types.pointer(pointee)
    }

    pub fn reference(&mut self, referent: TypeId) -> TypeId {
        self.types.reference(referent)
    }

    pub fn alias(&mut self, name: &str, target: TypeId) -> TypeId {
        self.types.alias(name, target)
    }

    /// Wrap `ty` in the named qualifier, as a resolved source attribute would.
    pub fn annotate(&mut self, ty: TypeId, label: &str) -> TypeId {
        let label = self.labels.intern(label);
        self.types.annotated(ty, label)
    }

    pub fn function_type(&mut self, ret: TypeId, params: &[TypeId], variadic: bool) -> TypeId {
        self.types.function(ret, params, variadic)
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    pub fn int_lit(&self, value: i64) -> Expr {
        self.expr(ExprKind::IntLiteral(value), TypeId::INT)
    }

    pub fn float_lit(&self, value: f64) -> Expr {
        self.expr(ExprKind::FloatLiteral(value), TypeId::DOUBLE)
    }

    /// String literal typed as `ty` (usually `char *`).
    pub fn string_lit(&self, value: &str, ty: TypeId) -> Expr {
        self.expr(ExprKind::StringLiteral(value.to_string()), ty)
    }

    pub fn nullptr(&self) -> Expr {
        self.expr(ExprKind::NullPtr, TypeId::NULLPTR)
    }

    pub fn gnu_null(&self) -> Expr {
        self.expr(ExprKind::GnuNull, TypeId::LONG)
    }

    pub fn var_ref(&self, decl: &VarDecl) -> Expr {
        self.expr(ExprKind::DeclRef(DeclRef::Var(decl.id)), decl.ty)
    }

    /// Lvalue-to-rvalue conversion: an implicit cast that keeps the type.
    pub fn rvalue(&self, expr: Expr) -> Expr {
        let ty = expr.ty;
        self.implicit_cast(expr, ty)
    }

    pub fn implicit_cast(&self, expr: Expr, ty: TypeId) -> Expr {
        self.expr(ExprKind::ImplicitCast(Box::new(expr)), ty)
    }

    pub fn explicit_cast(&self, expr: Expr, ty: TypeId) -> Expr {
        self.expr(ExprKind::ExplicitCast(Box::new(expr)), ty)
    }

    pub fn paren(&self, expr: Expr) -> Expr {
        let ty = expr.ty;
        self.expr(ExprKind::Paren(Box::new(expr)), ty)
    }

    pub fn materialize(&self, expr: Expr) -> Expr {
        let ty = expr.ty;
        self.expr(ExprKind::MaterializeTemporary(Box::new(expr)), ty)
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr, ty: TypeId) -> Expr {
        self.expr(ExprKind::Unary(Box::new(UnaryExpr { op, operand })), ty)
    }

    /// `*operand`, typed as the operand's pointee.
    pub fn deref(&self, operand: Expr) -> Expr {
        let ty = self.types.pointee(operand.ty).unwrap_or(TypeId::INT);
        self.unary(UnaryOp::Deref, operand, ty)
    }

    pub fn binary(&self, op: BinaryOp, lhs: Expr, rhs: Expr, ty: TypeId) -> Expr {
        self.expr(ExprKind::Binary(Box::new(BinaryExpr { op, lhs, rhs })), ty)
    }

    pub fn assign(&self, lhs: Expr, rhs: Expr) -> Expr {
        let ty = lhs.ty;
        self.expr(ExprKind::Assign(Box::new(AssignExpr { lhs, rhs })), ty)
    }

    pub fn compound_assign(&self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        let ty = lhs.ty;
        self.expr(
            ExprKind::CompoundAssign(Box::new(CompoundAssignExpr { op, lhs, rhs })),
            ty,
        )
    }

    pub fn conditional(&self, cond: Expr, then_expr: Expr, else_expr: Expr, ty: TypeId) -> Expr {
        self.expr(
            ExprKind::Conditional(Box::new(ConditionalExpr {
                cond,
                then_expr,
                else_expr,
            })),
            ty,
        )
    }

    /// Direct call to a declared function; typed as its return type.
    ///
    /// # Panics
    /// If `func` was not declared by this builder.
    pub fn call(&self, func: FuncId, args: Vec<Expr>) -> Expr {
        let ret = self.function_decl(func).ret;
        self.call_typed(func, args, ret)
    }

    /// Direct call whose result type the host computes itself, as for
    /// builtins that return the type of their first argument.
    pub fn call_typed(&self, func: FuncId, args: Vec<Expr>, ty: TypeId) -> Expr {
        let fn_ptr_ty = self.function_decl(func).fn_ptr_ty;
        let name = self.expr(ExprKind::DeclRef(DeclRef::Function(func)), fn_ptr_ty);
        let callee = self.implicit_cast(name, fn_ptr_ty);
        self.expr(ExprKind::Call(Box::new(CallExpr { callee, args })), ty)
    }

    /// Call through an arbitrary callee expression (e.g. a function pointer).
    pub fn call_indirect(&self, callee: Expr, args: Vec<Expr>, ty: TypeId) -> Expr {
        self.expr(ExprKind::Call(Box::new(CallExpr { callee, args })), ty)
    }

    fn function_decl(&self, func: FuncId) -> &FuncDecl {
        &self.program.functions[func.index() as usize]
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    pub fn expr_stmt(&self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn decl_stmt(&self, decls: Vec<VarDecl>) -> Stmt {
        self.stmt(StmtKind::Decl(decls))
    }

    pub fn ret(&self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    pub fn block(&self, stmts: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::Block(stmts))
    }

    pub fn if_stmt(&self, cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        self.stmt(StmtKind::If(Box::new(IfStmt {
            cond,
            then_branch,
            else_branch,
        })))
    }

    pub fn while_stmt(&self, cond: Expr, body: Stmt) -> Stmt {
        self.stmt(StmtKind::While(Box::new(WhileStmt { cond, body })))
    }

    pub fn do_while(&self, body: Stmt, cond: Expr) -> Stmt {
        self.stmt(StmtKind::DoWhile(Box::new(DoWhileStmt { body, cond })))
    }

    pub fn for_stmt(
        &self,
        init: Option<Stmt>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Stmt,
    ) -> Stmt {
        self.stmt(StmtKind::For(Box::new(ForStmt {
            init,
            cond,
            step,
            body,
        })))
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    pub fn var(&self, name: &str, ty: TypeId) -> VarDecl {
        self.var_decl(name, ty, None)
    }

    pub fn var_init(&self, name: &str, ty: TypeId, init: Expr) -> VarDecl {
        self.var_decl(name, ty, Some(init))
    }

    fn var_decl(&self, name: &str, ty: TypeId, init: Option<Expr>) -> VarDecl {
        VarDecl {
            id: self.decl_id(),
            name: name.to_string(),
            ty,
            init,
            origin: self.origin,
            span: self.span(),
        }
    }

    /// Add a global variable.
    pub fn global(&mut self, decl: VarDecl) {
        self.program.items.push(Item::Var(decl));
    }

    /// Declare a function; give it a body later with `define`.
    pub fn function(&mut self, name: &str, params: Vec<VarDecl>, ret: TypeId) -> FuncId {
        self.declare(name, params, ret, false)
    }

    pub fn variadic_function(&mut self, name: &str, params: Vec<VarDecl>, ret: TypeId) -> FuncId {
        self.declare(name, params, ret, true)
    }

    fn declare(&mut self, name: &str, params: Vec<VarDecl>, ret: TypeId, variadic: bool) -> FuncId {
        let param_tys: Vec<TypeId> = params.iter().map(|p| p.ty).collect();
        let fn_ty = self.types.function(ret, &param_tys, variadic);
        let fn_ptr_ty = self.types.pointer(fn_ty);
        let id = FuncId::new(self.program.functions.len() as u32);
        let span = self.span();
        self.program.functions.push(FuncDecl {
            id,
            name: name.to_string(),
            params,
            ret,
            variadic,
            fn_ptr_ty,
            body: None,
            origin: self.origin,
            span,
        });
        self.program.items.push(Item::Function(id));
        id
    }

    /// Attach a body to a declared function.
    ///
    /// # Panics
    /// If `func` was not declared by this builder.
    pub fn define(&mut self, func: FuncId, body: Vec<Stmt>) {
        let block = self.block(body);
        self.program.functions[func.index() as usize].body = Some(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostType;

    #[test]
    fn node_ids_are_unique() {
        let b = ProgramBuilder::new();
        let x = b.var("x", TypeId::INT);
        let e = b.assign(b.var_ref(&x), b.int_lit(1));
        let mut ids: Vec<_> = e.children().iter().map(|c| c.id).collect();
        ids.push(e.id);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn spans_follow_current_line() {
        let b = ProgramBuilder::new();
        let first = b.at(3).int_lit(0);
        let second = b.at(7).int_lit(0);
        assert_eq!(first.span.line, 3);
        assert_eq!(second.span.line, 7);
        assert!(second.span.start > first.span.start);
    }

    #[test]
    fn annotate_interns_label() {
        let mut b = ProgramBuilder::new();
        let t = b.annotate(TypeId::INT, "tainted");
        let label = b.labels().lookup("tainted");
        assert!(label.is_some());
        assert!(matches!(b.types().get(t), HostType::Annotated { inner, .. } if *inner == TypeId::INT));
    }

    #[test]
    fn direct_call_resolves_callee() {
        let mut b = ProgramBuilder::new();
        let p = b.var("p", TypeId::INT);
        let f = b.function("f", vec![p], TypeId::VOID);
        let call = b.call(f, vec![b.int_lit(1)]);
        let unit = b.finish("t.c");

        let ExprKind::Call(call) = &call.kind else {
            panic!("expected call");
        };
        let callee = unit.program.direct_callee(call).map(|f| f.name.as_str());
        assert_eq!(callee, Some("f"));
    }
}
