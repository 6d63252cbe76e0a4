//! Statement parsing.

use bumpalo::collections::Vec as BVec;
use staple_core::ParseError;

use super::parser::Parser;
use super::{Block, ExprStmt, IfStmt, ReturnStmt, Stmt, VarDeclStmt};
use crate::lexer::TokenKind;

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse a statement, dispatching on the current token.
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        match self.peek().kind {
            TokenKind::If => self.parse_if(),
            TokenKind::Return => self.parse_return(),
            TokenKind::LeftBrace => {
                let block = self.parse_block()?;
                Ok(Stmt::Block(self.arena.alloc(block)))
            }
            _ if self.is_var_decl() => self.parse_var_decl(),
            _ => self.parse_expr_stmt(),
        }
    }

    /// Whether the upcoming tokens start a variable declaration.
    ///
    /// A primitive type keyword always does. A name does when it is followed
    /// by any number of `*` and then another name (`Node* next`).
    fn is_var_decl(&mut self) -> bool {
        let first = self.peek().kind;
        if first.is_primitive_type() {
            return true;
        }
        if first != TokenKind::Identifier {
            return false;
        }
        let mut n = 1;
        while self.peek_nth(n).kind == TokenKind::Star {
            n += 1;
        }
        self.peek_nth(n).kind == TokenKind::Identifier
    }

    /// Grammar: `TYPE IDENT ('=' EXPR)? ';'`
    pub fn parse_var_decl(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;
        let init = if self.eat(TokenKind::Equal).is_some() {
            Some(self.parse_expr(0)?)
        } else {
            None
        };
        let end = self.expect(TokenKind::Semicolon)?.span;

        Ok(Stmt::VarDecl(VarDeclStmt {
            id: self.node_id(),
            ty,
            name,
            init,
            span: ty.span.merge(end),
        }))
    }

    /// Grammar: `EXPR ';'`
    pub fn parse_expr_stmt(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let expr = self.parse_expr(0)?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::Expr(ExprStmt {
            expr,
            span: expr.span().merge(end),
        }))
    }

    /// Grammar: `'return' EXPR? ';'`
    pub fn parse_return(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::Return)?.span;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::Return(ReturnStmt {
            value,
            span: start.merge(end),
        }))
    }

    /// Grammar: `'{' STMT* '}'`
    pub fn parse_block(&mut self) -> Result<Block<'ast>, ParseError> {
        let start = self.expect(TokenKind::LeftBrace)?.span;
        let id = self.node_id();
        let mut stmts = BVec::new_in(self.arena);

        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize_stmt();
                }
            }
        }

        let end = self.expect(TokenKind::RightBrace)?.span;
        Ok(Block {
            id,
            stmts: stmts.into_bump_slice(),
            span: start.merge(end),
        })
    }

    /// Grammar: `'if' '(' EXPR ')' STMT ('else' STMT)?`
    pub fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.expect(TokenKind::If)?.span;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(TokenKind::RightParen)?;

        let then_stmt = self.parse_statement()?;
        let then_stmt: &'ast Stmt<'ast> = self.arena.alloc(then_stmt);
        let else_stmt = if self.eat(TokenKind::Else).is_some() {
            let stmt = self.parse_statement()?;
            Some(&*self.arena.alloc(stmt))
        } else {
            None
        };

        let end = else_stmt.map_or(then_stmt.span(), |s| s.span());
        Ok(Stmt::If(IfStmt {
            condition,
            then_stmt,
            else_stmt,
            span: start.merge(end),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use bumpalo::Bump;

    fn parse_stmt<'ast>(source: &str, arena: &'ast Bump) -> Stmt<'ast> {
        let mut parser = Parser::new(source, arena);
        parser.parse_statement().unwrap()
    }

    #[test]
    fn pointer_declaration_is_not_multiplication() {
        let arena = Bump::new();
        let stmt = parse_stmt("Node* next = head;", &arena);
        match stmt {
            Stmt::VarDecl(decl) => {
                assert_eq!(decl.name.name, "next");
                assert_eq!(decl.ty.pointer_depth, 1);
                assert!(decl.init.is_some());
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn assignment_is_an_expression_statement() {
        let arena = Bump::new();
        let stmt = parse_stmt("total = total + 1;", &arena);
        assert!(matches!(stmt, Stmt::Expr(ExprStmt { expr: Expr::Assign(_), .. })));
    }

    #[test]
    fn if_with_else() {
        let arena = Bump::new();
        let stmt = parse_stmt("if (a) { return 1; } else return 2;", &arena);
        match stmt {
            Stmt::If(if_stmt) => {
                assert!(matches!(if_stmt.then_stmt, Stmt::Block(_)));
                assert!(matches!(if_stmt.else_stmt, Some(Stmt::Return(_))));
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn dangling_else_binds_to_nearest_if() {
        let arena = Bump::new();
        let stmt = parse_stmt("if (a) if (b) x = 1; else x = 2;", &arena);
        let Stmt::If(outer) = stmt else { panic!("expected if") };
        assert!(outer.else_stmt.is_none());
        assert!(matches!(outer.then_stmt, Stmt::If(inner) if inner.else_stmt.is_some()));
    }

    #[test]
    fn bare_return() {
        let arena = Bump::new();
        assert!(matches!(parse_stmt("return;", &arena), Stmt::Return(ReturnStmt { value: None, .. })));
    }

    #[test]
    fn nested_blocks_get_distinct_ids() {
        let arena = Bump::new();
        let Stmt::Block(outer) = parse_stmt("{ { int x; } }", &arena) else {
            panic!("expected block")
        };
        let Stmt::Block(inner) = outer.stmts[0] else { panic!("expected block") };
        assert_ne!(outer.id, inner.id);
    }
}
