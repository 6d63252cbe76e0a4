//! Expression parsing using Pratt parsing (precedence climbing).

use bumpalo::collections::Vec as BVec;
use staple_core::{ParseError, ParseErrorKind};

use super::parser::{Parser, describe};
use super::{
    AssignExpr, BinaryExpr, BinaryOp, CallExpr, Expr, Ident, IdentExpr, LiteralExpr, LiteralKind,
    MemberExpr,
};
use crate::lexer::{TokenKind, decode_string_literal};

/// Binding power of `=`; right-associative and weaker than every operator.
const ASSIGN_BP: (u8, u8) = (2, 1);

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse an expression whose operators bind at least as tightly as `min_bp`.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut lhs = self.parse_postfix()?;

        loop {
            let token = self.peek();

            if token.kind == TokenKind::Equal {
                let (l_bp, r_bp) = ASSIGN_BP;
                if l_bp < min_bp {
                    break;
                }
                if !lhs.is_place() {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidAssignTarget,
                        lhs.span(),
                        "only variables and members can be assigned to",
                    ));
                }
                self.advance();
                let value = self.parse_expr(r_bp)?;
                let span = lhs.span().merge(value.span());
                let id = self.node_id();
                lhs = self.arena.alloc(Expr::Assign(self.arena.alloc(AssignExpr {
                    id,
                    target: lhs,
                    value,
                    span,
                })));
                continue;
            }

            let Some(op) = BinaryOp::from_token(token.kind) else {
                break;
            };
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let right = self.parse_expr(r_bp)?;
            let span = lhs.span().merge(right.span());
            let id = self.node_id();
            lhs = self.arena.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
                id,
                left: lhs,
                op,
                right,
                span,
            })));
        }

        Ok(lhs)
    }

    /// A primary expression followed by any number of `.member` or
    /// `.method(args)` suffixes.
    fn parse_postfix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut expr = self.parse_primary()?;

        while self.eat(TokenKind::Dot).is_some() {
            let member = self.parse_ident()?;
            if self.check(TokenKind::LeftParen) {
                expr = self.parse_call(Some(expr), member)?;
            } else {
                let id = self.node_id();
                expr = self.arena.alloc(Expr::Member(self.arena.alloc(MemberExpr {
                    id,
                    object: expr,
                    member,
                    span: expr.span().merge(member.span),
                })));
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = self.peek();

        let kind = match token.kind {
            TokenKind::IntLiteral => {
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("integer literal {} does not fit in 64 bits", token.lexeme),
                    )
                })?;
                LiteralKind::Int(value)
            }
            TokenKind::True => LiteralKind::Bool(true),
            TokenKind::False => LiteralKind::Bool(false),
            TokenKind::StringLiteral => {
                let text = decode_string_literal(token.lexeme);
                LiteralKind::String(self.arena.alloc_str(&text))
            }
            TokenKind::Identifier => {
                self.advance();
                let ident = Ident::new(token.lexeme, token.span);
                if self.check(TokenKind::LeftParen) {
                    return self.parse_call(None, ident);
                }
                let id = self.node_id();
                return Ok(self.arena.alloc(Expr::Ident(IdentExpr { id, ident })));
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RightParen)?;
                return Ok(inner);
            }
            TokenKind::Eof => return Err(ParseError::unexpected_eof(token.span)),
            _ => return Err(ParseError::expected_expression(token.span, &describe(&token))),
        };

        self.advance();
        let id = self.node_id();
        Ok(self.arena.alloc(Expr::Literal(LiteralExpr {
            id,
            kind,
            span: token.span,
        })))
    }

    /// Parse `'(' (EXPR (',' EXPR)*)? ')'` after a callee name.
    fn parse_call(
        &mut self,
        receiver: Option<&'ast Expr<'ast>>,
        callee: Ident<'ast>,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expr(0)?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let end = self.expect(TokenKind::RightParen)?.span;

        let start = receiver.map_or(callee.span, |r| r.span());
        let id = self.node_id();
        Ok(self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr {
            id,
            receiver,
            callee,
            args: args.into_bump_slice(),
            span: start.merge(end),
        }))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArithmeticOp, CompareOp};
    use bumpalo::Bump;

    fn parse<'ast>(source: &str, arena: &'ast Bump) -> &'ast Expr<'ast> {
        let mut parser = Parser::new(source, arena);
        parser.parse_expr(0).unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let arena = Bump::new();
        let Expr::Binary(add) = parse("1 + 2 * 3", &arena) else { panic!("expected binary") };
        assert_eq!(add.op, BinaryOp::Arithmetic(ArithmeticOp::Add));
        assert!(matches!(add.right, Expr::Binary(mul) if mul.op == BinaryOp::Arithmetic(ArithmeticOp::Mul)));
    }

    #[test]
    fn or_is_weaker_than_and() {
        let arena = Bump::new();
        let Expr::Binary(or) = parse("a && b || c < d", &arena) else { panic!("expected binary") };
        assert_eq!(or.op, BinaryOp::LogicalOr);
        assert!(matches!(or.left, Expr::Binary(and) if and.op == BinaryOp::LogicalAnd));
        assert!(matches!(or.right, Expr::Binary(lt) if lt.op == BinaryOp::Compare(CompareOp::Lt)));
    }

    #[test]
    fn subtraction_is_left_associative() {
        let arena = Bump::new();
        let Expr::Binary(outer) = parse("a - b - c", &arena) else { panic!("expected binary") };
        assert!(matches!(outer.left, Expr::Binary(_)));
        assert!(matches!(outer.right, Expr::Ident(_)));
    }

    #[test]
    fn assignment_is_right_associative() {
        let arena = Bump::new();
        let Expr::Assign(outer) = parse("a = b = 1", &arena) else { panic!("expected assign") };
        assert!(matches!(outer.value, Expr::Assign(_)));
    }

    #[test]
    fn member_access_and_method_call() {
        let arena = Bump::new();
        let Expr::Call(call) = parse("node.next.area(2, x)", &arena) else { panic!("expected call") };
        assert_eq!(call.callee.name, "area");
        assert_eq!(call.args.len(), 2);
        assert!(matches!(call.receiver, Some(Expr::Member(m)) if m.member.name == "next"));
    }

    #[test]
    fn free_call() {
        let arena = Bump::new();
        let Expr::Call(call) = parse("f()", &arena) else { panic!("expected call") };
        assert!(call.receiver.is_none());
        assert!(call.args.is_empty());
    }

    #[test]
    fn string_literal_is_decoded() {
        let arena = Bump::new();
        let Expr::Literal(lit) = parse(r#""a\tb""#, &arena) else { panic!("expected literal") };
        assert_eq!(lit.kind, LiteralKind::String("a\tb"));
    }

    #[test]
    fn rejects_assignment_to_call() {
        let arena = Bump::new();
        let mut parser = Parser::new("f() = 1", &arena);
        let err = parser.parse_expr(0).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidAssignTarget);
    }

    #[test]
    fn rejects_oversized_literal() {
        let arena = Bump::new();
        let mut parser = Parser::new("99999999999999999999", &arena);
        assert_eq!(parser.parse_expr(0).unwrap_err().kind, ParseErrorKind::InvalidLiteral);
    }
}
