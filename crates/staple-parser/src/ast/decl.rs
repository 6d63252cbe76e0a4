//! Top-level and member declarations.

use staple_core::{NodeId, Span};

use super::{Block, Ident, TypeExpr};

/// A top-level item.
#[derive(Debug, Clone, Copy)]
pub enum Item<'ast> {
    Class(ClassDecl<'ast>),
    Struct(StructDecl<'ast>),
    /// A function definition or an `extern` declaration.
    Function(FunctionDecl<'ast>),
}

impl Item<'_> {
    pub fn span(&self) -> staple_core::Span {
        match self {
            Item::Class(c) => c.span,
            Item::Struct(s) => s.span,
            Item::Function(f) => f.span,
        }
    }
}

/// `class Name extends Parent { members }`
#[derive(Debug, Clone, Copy)]
pub struct ClassDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub extends: Option<Ident<'ast>>,
    pub members: &'ast [ClassMember<'ast>],
    pub span: Span,
}

impl<'ast> ClassDecl<'ast> {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl<'ast>> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Field(f) => Some(f),
            ClassMember::Method(_) => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &FunctionDecl<'ast>> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Method(f) => Some(f),
            ClassMember::Field(_) => None,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ClassMember<'ast> {
    Field(FieldDecl<'ast>),
    Method(FunctionDecl<'ast>),
}

/// `struct Name { fields }`
#[derive(Debug, Clone, Copy)]
pub struct StructDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub fields: &'ast [FieldDecl<'ast>],
    pub span: Span,
}

/// `Type name;` inside a class or struct.
#[derive(Debug, Clone, Copy)]
pub struct FieldDecl<'ast> {
    pub id: NodeId,
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}

/// A function: free, member, or `extern`.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDecl<'ast> {
    pub id: NodeId,
    pub return_type: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    /// Trailing `...` (external functions only).
    pub variadic: bool,
    pub is_extern: bool,
    /// `None` for `extern` declarations.
    pub body: Option<&'ast Block<'ast>>,
    pub span: Span,
}

/// One declared parameter.
#[derive(Debug, Clone, Copy)]
pub struct Param<'ast> {
    pub id: NodeId,
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}
