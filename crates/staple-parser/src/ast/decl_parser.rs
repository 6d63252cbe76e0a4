//! Declaration parsing: classes, structs, functions and externs.

use bumpalo::collections::Vec as BVec;
use staple_core::{ParseError, ParseErrorKind};

use super::parser::{Parser, describe};
use super::{
    ClassDecl, ClassMember, FieldDecl, FunctionDecl, Ident, Item, Param, StructDecl, TypeExpr,
};
use crate::lexer::TokenKind;

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse one top-level item.
    pub fn parse_item(&mut self) -> Result<Item<'ast>, ParseError> {
        match self.peek().kind {
            TokenKind::Class => self.parse_class().map(Item::Class),
            TokenKind::Struct => self.parse_struct().map(Item::Struct),
            TokenKind::Extern => self.parse_extern().map(Item::Function),
            _ => {
                let ty = self.parse_type()?;
                let name = self.parse_ident()?;
                if !self.check(TokenKind::LeftParen) {
                    return Err(ParseError::new(
                        ParseErrorKind::ExpectedDeclaration,
                        name.span,
                        format!(
                            "expected '(' after '{}': global variables are not supported",
                            name.name
                        ),
                    ));
                }
                self.parse_function_rest(ty, name, false).map(Item::Function)
            }
        }
    }

    /// Parse a class declaration.
    ///
    /// Grammar: `'class' IDENT ('extends' IDENT)? '{' (FIELD | FUNCTION)* '}'`
    pub fn parse_class(&mut self) -> Result<ClassDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Class)?.span;
        let id = self.node_id();
        let name = self.parse_ident()?;
        let extends = if self.eat(TokenKind::Extends).is_some() {
            Some(self.parse_ident()?)
        } else {
            None
        };

        self.expect(TokenKind::LeftBrace)?;
        let mut members = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            match self.parse_class_member() {
                Ok(member) => members.push(member),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize_stmt();
                }
            }
        }
        let end = self.expect(TokenKind::RightBrace)?.span;

        Ok(ClassDecl {
            id,
            name,
            extends,
            members: members.into_bump_slice(),
            span: start.merge(end),
        })
    }

    fn parse_class_member(&mut self) -> Result<ClassMember<'ast>, ParseError> {
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;
        if self.check(TokenKind::LeftParen) {
            return self.parse_function_rest(ty, name, false).map(ClassMember::Method);
        }
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(ClassMember::Field(FieldDecl {
            id: self.node_id(),
            ty,
            name,
            span: ty.span.merge(end),
        }))
    }

    /// Parse a struct declaration.
    ///
    /// Grammar: `'struct' IDENT '{' (TYPE IDENT ';')* '}'`
    pub fn parse_struct(&mut self) -> Result<StructDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Struct)?.span;
        let id = self.node_id();
        let name = self.parse_ident()?;

        self.expect(TokenKind::LeftBrace)?;
        let mut fields = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            let ty = self.parse_type()?;
            let field_name = self.parse_ident()?;
            let end = self.expect(TokenKind::Semicolon)?.span;
            fields.push(FieldDecl {
                id: self.node_id(),
                ty,
                name: field_name,
                span: ty.span.merge(end),
            });
        }
        let end = self.expect(TokenKind::RightBrace)?.span;

        Ok(StructDecl {
            id,
            name,
            fields: fields.into_bump_slice(),
            span: start.merge(end),
        })
    }

    /// Parse an external function declaration.
    ///
    /// Grammar: `'extern' TYPE IDENT '(' PARAMS? ')' ';'`
    pub fn parse_extern(&mut self) -> Result<FunctionDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Extern)?.span;
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;
        let mut decl = self.parse_function_rest(ty, name, true)?;
        decl.span = start.merge(decl.span);
        Ok(decl)
    }

    /// Parse the parameter list and body of a function whose return type and
    /// name have been consumed.
    fn parse_function_rest(
        &mut self,
        return_type: TypeExpr<'ast>,
        name: Ident<'ast>,
        is_extern: bool,
    ) -> Result<FunctionDecl<'ast>, ParseError> {
        let id = self.node_id();
        let (params, variadic) = self.parse_params(is_extern)?;

        let (body, end) = if is_extern {
            (None, self.expect(TokenKind::Semicolon)?.span)
        } else {
            let block = self.parse_block()?;
            (Some(&*self.arena.alloc(block)), block.span)
        };

        Ok(FunctionDecl {
            id,
            return_type,
            name,
            params,
            variadic,
            is_extern,
            body,
            span: return_type.span.merge(end),
        })
    }

    /// Grammar: `'(' (PARAM (',' PARAM)* (',' '...')?)? ')'`
    fn parse_params(&mut self, is_extern: bool) -> Result<(&'ast [Param<'ast>], bool), ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut params = BVec::new_in(self.arena);
        let mut variadic = false;

        if !self.check(TokenKind::RightParen) {
            loop {
                if let Some(ellipsis) = self.eat(TokenKind::Ellipsis) {
                    if !is_extern {
                        return Err(ParseError::new(
                            ParseErrorKind::MisplacedVariadic,
                            ellipsis.span,
                            "only external functions may take '...'",
                        ));
                    }
                    if !self.check(TokenKind::RightParen) {
                        let found = self.peek();
                        return Err(ParseError::new(
                            ParseErrorKind::MisplacedVariadic,
                            found.span,
                            format!("'...' must be the last parameter, found {}", describe(&found)),
                        ));
                    }
                    variadic = true;
                    break;
                }

                let ty = self.parse_type()?;
                let name = self.parse_ident()?;
                params.push(Param {
                    id: self.node_id(),
                    ty,
                    name,
                    span: ty.span.merge(name.span),
                });

                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen)?;
        Ok((params.into_bump_slice(), variadic))
    }
}
