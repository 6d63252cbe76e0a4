//! Expressions.

use staple_core::{NodeId, Span};

use super::{BinaryOp, Ident};

#[derive(Debug, Clone, Copy)]
pub enum Expr<'ast> {
    Literal(LiteralExpr<'ast>),
    /// A bare name: local, argument, field of the enclosing class, or `self`.
    Ident(IdentExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    Assign(&'ast AssignExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    /// `object.member`
    Member(&'ast MemberExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Literal(e) => e.id,
            Expr::Ident(e) => e.id,
            Expr::Binary(e) => e.id,
            Expr::Assign(e) => e.id,
            Expr::Call(e) => e.id,
            Expr::Member(e) => e.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Ident(e) => e.ident.span,
            Expr::Binary(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Member(e) => e.span,
        }
    }

    /// Whether this expression denotes storage that can be assigned to.
    pub fn is_place(&self) -> bool {
        matches!(self, Expr::Ident(_) | Expr::Member(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LiteralExpr<'ast> {
    pub id: NodeId,
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    Int(i64),
    Bool(bool),
    /// Decoded text, without quotes.
    String(&'ast str),
}

#[derive(Debug, Clone, Copy)]
pub struct IdentExpr<'ast> {
    pub id: NodeId,
    pub ident: Ident<'ast>,
}

#[derive(Debug, Clone, Copy)]
pub struct BinaryExpr<'ast> {
    pub id: NodeId,
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy)]
pub struct AssignExpr<'ast> {
    pub id: NodeId,
    pub target: &'ast Expr<'ast>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// `callee(args)` or `receiver.callee(args)`.
#[derive(Debug, Clone, Copy)]
pub struct CallExpr<'ast> {
    pub id: NodeId,
    pub receiver: Option<&'ast Expr<'ast>>,
    pub callee: Ident<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy)]
pub struct MemberExpr<'ast> {
    pub id: NodeId,
    pub object: &'ast Expr<'ast>,
    pub member: Ident<'ast>,
    pub span: Span,
}
