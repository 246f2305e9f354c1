//! Postorder walk over declarations, statements, and expressions.

use quala_frontend::{Expr, FuncDecl, Item, Stmt, StmtKind, VarDecl};

use super::Checker;

impl<'u> Checker<'u> {
    pub(super) fn check_program(&mut self) {
        let program = self.program;
        for item in &program.items {
            match item {
                Item::Var(decl) => self.check_global(decl),
                Item::Function(id) => {
                    if let Some(func) = program.function(*id) {
                        self.check_function(func);
                    }
                }
            }
        }
    }

    fn check_global(&mut self, decl: &'u VarDecl) {
        if self.options.skip_excluded && decl.is_excluded() {
            tracing::trace!(name = %decl.name, "skipping excluded global");
            self.stats.declarations_skipped += 1;
            return;
        }
        self.visit_var_decl(decl);
    }

    fn check_function(&mut self, func: &'u FuncDecl) {
        if self.options.skip_excluded && func.is_excluded() {
            tracing::trace!(name = %func.name, "skipping excluded function");
            self.stats.declarations_skipped += 1;
            return;
        }
        let Some(body) = &func.body else {
            return;
        };
        let _span = tracing::debug_span!("function", name = %func.name).entered();
        self.stats.functions_checked += 1;

        for param in &func.params {
            self.export_decl(param);
        }
        self.function_stack.push(func);
        self.visit_stmt(body);
        self.function_stack.pop();
    }

    fn visit_var_decl(&mut self, decl: &'u VarDecl) {
        if let Some(init) = &decl.init {
            self.visit_expr(init);
            let src = self.store.type_of(init);
            self.check_flow(init.span, decl.ty, src);
        }
        self.export_decl(decl);
    }

    fn visit_stmt(&mut self, stmt: &'u Stmt) {
        match &stmt.kind {
            StmtKind::Decl(decls) => {
                for decl in decls {
                    self.visit_var_decl(decl);
                }
            }
            StmtKind::Expr(expr) => self.visit_expr(expr),
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.visit_expr(value);
                }
                self.check_return(stmt, value.as_ref());
            }
            StmtKind::If(s) => {
                self.visit_expr(&s.cond);
                self.visit_stmt(&s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    self.visit_stmt(else_branch);
                }
            }
            StmtKind::While(s) => {
                self.visit_expr(&s.cond);
                self.visit_stmt(&s.body);
            }
            StmtKind::DoWhile(s) => {
                self.visit_stmt(&s.body);
                self.visit_expr(&s.cond);
            }
            StmtKind::For(s) => {
                if let Some(init) = &s.init {
                    self.visit_stmt(init);
                }
                if let Some(cond) = &s.cond {
                    self.visit_expr(cond);
                }
                if let Some(step) = &s.step {
                    self.visit_expr(step);
                }
                self.visit_stmt(&s.body);
            }
            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    self.visit_stmt(stmt);
                }
            }
        }

        self.stats.statements_visited += 1;
        let policy = self.policy;
        policy.check_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'u Expr) {
        for child in expr.children() {
            self.visit_expr(child);
        }

        self.check_flow_points(expr);

        let policy = self.policy;
        let label = policy.infer_expr(self, expr);
        if let Some(label) = label {
            tracing::trace!(node = %expr.id, label = self.labels().resolve(label), "inferred");
        }
        self.store.attach_label(expr, label);
        self.stats.expressions_visited += 1;
        self.export_expr(expr);
    }

    fn export_decl(&mut self, decl: &VarDecl) {
        if let Some(table) = self.exports.as_mut() {
            table.record_decl(&self.store, decl);
        }
    }

    fn export_expr(&mut self, expr: &Expr) {
        if let Some(table) = self.exports.as_mut() {
            table.record_expr(&self.store, expr);
        }
    }
}
