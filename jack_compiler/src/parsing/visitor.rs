use super::{
    class::{Class, ClassVarDec},
    expr::{Expr, Term},
    func::SubroutineDec,
    stmts::{DoStmt, IfStmt, LetStmt, ReturnStmt, Stmt, WhileStmt},
    unit::CompilationUnit,
};

/// Walks the tree. Statement dispatch is provided, everything
/// else is up to the implementor.
pub trait AstVisitor {
    type Output;
    fn class(&mut self, class: &Class) -> Self::Output;
    fn class_var_dec(&mut self, dec: &ClassVarDec) -> Self::Output;
    fn subroutine_dec(&mut self, dec: &SubroutineDec) -> Self::Output;
    fn let_stmt(&mut self, stmt: &LetStmt) -> Self::Output;
    fn if_stmt(&mut self, stmt: &IfStmt) -> Self::Output;
    fn while_stmt(&mut self, stmt: &WhileStmt) -> Self::Output;
    fn do_stmt(&mut self, stmt: &DoStmt) -> Self::Output;
    fn return_stmt(&mut self, stmt: &ReturnStmt) -> Self::Output;
    fn expr(&mut self, expr: &Expr) -> Self::Output;
    fn term(&mut self, term: &Term) -> Self::Output;

    #[inline]
    fn comp_unit(&mut self, unit: &CompilationUnit) -> Self::Output {
        self.class(&unit.class)
    }

    #[inline]
    fn stmt(&mut self, stmt: &Stmt) -> Self::Output {
        match stmt {
            Stmt::Let(stmt) => self.let_stmt(stmt),
            Stmt::If(stmt) => self.if_stmt(stmt),
            Stmt::While(stmt) => self.while_stmt(stmt),
            Stmt::Do(stmt) => self.do_stmt(stmt),
            Stmt::Return(stmt) => self.return_stmt(stmt),
        }
    }
}
