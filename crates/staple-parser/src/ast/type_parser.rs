//! Type expression parsing.

use staple_core::{ParseError, PrimitiveKind};

use super::parser::{Parser, describe};
use super::{Ident, TypeBase, TypeExpr};
use crate::lexer::TokenKind;

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse a type reference.
    ///
    /// Grammar: `(PRIMITIVE | IDENTIFIER) '*'*`
    pub fn parse_type(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        let token = self.peek();
        let base = if token.kind.is_primitive_type() {
            let kind = PrimitiveKind::from_name(token.lexeme)
                .ok_or_else(|| ParseError::expected_type(token.span, &describe(&token)))?;
            TypeBase::Primitive(kind)
        } else if token.kind == TokenKind::Identifier {
            TypeBase::Named(Ident::new(token.lexeme, token.span))
        } else if token.kind == TokenKind::Eof {
            return Err(ParseError::unexpected_eof(token.span));
        } else {
            return Err(ParseError::expected_type(token.span, &describe(&token)));
        };
        self.advance();

        let mut span = token.span;
        let mut pointer_depth = 0;
        while let Some(star) = self.eat(TokenKind::Star) {
            pointer_depth += 1;
            span = span.merge(star.span);
        }

        Ok(TypeExpr {
            base,
            pointer_depth,
            span,
        })
    }

    /// Parse an identifier.
    pub(crate) fn parse_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier => {
                self.advance();
                Ok(Ident::new(token.lexeme, token.span))
            }
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            _ => Err(ParseError::expected_identifier(token.span, &describe(&token))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    fn parse(source: &str) -> String {
        let arena = Bump::new();
        let mut parser = Parser::new(source, &arena);
        parser.parse_type().unwrap().to_string()
    }

    #[test]
    fn primitives_use_canonical_names() {
        assert_eq!(parse("int"), "int32");
        assert_eq!(parse("uint8*"), "uint8*");
    }

    #[test]
    fn named_pointer_depth() {
        assert_eq!(parse("Node**"), "Node**");
    }

    #[test]
    fn rejects_non_types() {
        let arena = Bump::new();
        let mut parser = Parser::new("return", &arena);
        assert!(parser.parse_type().is_err());
    }
}
