//! Parser state and token-level helpers.
//!
//! The grammar itself is split across `decl_parser`, `stmt_parser`,
//! `expr_parser` and `type_parser`, each adding methods to [`Parser`].

use bumpalo::Bump;
use bumpalo::collections::Vec as BVec;
use staple_core::{NodeId, ParseError, ParseErrors};

use super::Script;
use crate::lexer::{Lexer, Token, TokenKind};

/// Recursive-descent parser producing an arena-allocated [`Script`].
///
/// Errors are collected; after an error the parser skips to the next
/// statement or declaration boundary and keeps going, so one run reports as
/// many problems as possible.
pub struct Parser<'src, 'ast> {
    lexer: Lexer<'src, 'ast>,
    pub(crate) arena: &'ast Bump,
    pub(crate) errors: ParseErrors,
    next_node: u32,
}

impl<'src, 'ast> Parser<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            lexer: Lexer::new(source, arena),
            arena,
            errors: ParseErrors::new(),
            next_node: 0,
        }
    }

    /// Parse a complete compile unit.
    ///
    /// Returns every lexical and syntax error, ordered by position, if any
    /// were found.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &'src str, arena: &'ast Bump) -> Result<Script<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena);
        let script = parser.parse_script();

        let mut errors: Vec<ParseError> = parser.errors.into_vec();
        errors.extend(parser.lexer.take_errors().into_iter().map(ParseError::from));
        if errors.is_empty() {
            return Ok(script);
        }
        errors.sort_by_key(|e| (e.span.line, e.span.col));
        let mut collected = ParseErrors::new();
        for error in errors {
            collected.push(error);
        }
        Err(collected)
    }

    /// Parse items until end of input.
    pub fn parse_script(&mut self) -> Script<'ast> {
        let start = self.peek().span;
        let mut items = BVec::new_in(self.arena);

        while !self.check(TokenKind::Eof) {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize_item();
                }
            }
        }

        let end = self.peek().span;
        Script {
            items: items.into_bump_slice(),
            span: start.merge(end),
            node_count: self.next_node,
        }
    }

    // =========================================
    // Token helpers
    // =========================================

    pub(crate) fn peek(&mut self) -> Token<'ast> {
        *self.lexer.peek()
    }

    pub(crate) fn peek_nth(&mut self, n: usize) -> Token<'ast> {
        *self.lexer.peek_nth(n)
    }

    pub(crate) fn check(&mut self, kind: TokenKind) -> bool {
        self.lexer.peek().kind == kind
    }

    pub(crate) fn advance(&mut self) -> Token<'ast> {
        self.lexer.next_token()
    }

    /// Consume the next token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of the given kind or report what was found instead.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        let token = self.peek();
        if token.kind == kind {
            return Ok(self.advance());
        }
        if token.kind == TokenKind::Eof {
            return Err(ParseError::unexpected_eof(token.span));
        }
        Err(ParseError::expected_token(
            token.span,
            kind.description(),
            &describe(&token),
        ))
    }

    /// Issue a fresh node identity.
    pub(crate) fn node_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node);
        self.next_node += 1;
        id
    }

    // =========================================
    // Error recovery
    // =========================================

    /// Skip to the start of the next top-level declaration.
    fn synchronize_item(&mut self) {
        let mut depth = 0u32;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::Class | TokenKind::Struct | TokenKind::Extern if depth == 0 => return,
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => {
                    if depth <= 1 {
                        self.advance();
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip past the current statement, stopping before a closing `}`.
    pub(crate) fn synchronize_stmt(&mut self) {
        let mut depth = 0u32;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }
}

/// How a token is named in "found X" messages.
pub(crate) fn describe(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::Eof => "end of file".to_string(),
        TokenKind::Identifier | TokenKind::IntLiteral | TokenKind::StringLiteral => {
            format!("'{}'", token.lexeme)
        }
        kind => kind.description().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staple_core::ParseErrorKind;

    #[test]
    fn empty_source_is_an_empty_script() {
        let arena = Bump::new();
        let script = Parser::parse("  // nothing here\n", &arena).unwrap();
        assert!(script.items.is_empty());
    }

    #[test]
    fn reports_several_errors_in_one_run() {
        let arena = Bump::new();
        let source = "int f() { int x = ; return 1 }\nint g() { return 2; }\nint h( {";
        let errors = Parser::parse(source, &arena).unwrap_err();
        assert!(errors.len() >= 2);
        let lines: Vec<u32> = errors.iter().map(|e| e.span.line).collect();
        assert!(lines.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn lexical_errors_are_included() {
        let arena = Bump::new();
        let errors = Parser::parse("int main() { return 1 # 2; }", &arena).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ParseErrorKind::Lexical));
    }

    #[test]
    fn global_variables_are_rejected() {
        let arena = Bump::new();
        let errors = Parser::parse("int counter;", &arena).unwrap_err();
        assert_eq!(errors.iter().next().map(|e| e.kind), Some(ParseErrorKind::ExpectedDeclaration));
    }
}
