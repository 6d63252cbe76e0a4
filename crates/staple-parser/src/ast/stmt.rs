//! Statements.

use staple_core::{NodeId, Span};

use super::{Expr, Ident, TypeExpr};

#[derive(Debug, Clone, Copy)]
pub enum Stmt<'ast> {
    Block(&'ast Block<'ast>),
    VarDecl(VarDeclStmt<'ast>),
    If(IfStmt<'ast>),
    Return(ReturnStmt<'ast>),
    Expr(ExprStmt<'ast>),
}

impl Stmt<'_> {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(b) => b.span,
            Stmt::VarDecl(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

/// `{ stmts }`; every block opens a scope.
#[derive(Debug, Clone, Copy)]
pub struct Block<'ast> {
    pub id: NodeId,
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// `Type name = init;`
#[derive(Debug, Clone, Copy)]
pub struct VarDeclStmt<'ast> {
    pub id: NodeId,
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub init: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// `if (condition) then_stmt else else_stmt`
#[derive(Debug, Clone, Copy)]
pub struct IfStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_stmt: &'ast Stmt<'ast>,
    pub else_stmt: Option<&'ast Stmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy)]
pub struct ExprStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}
