//! The Staple lexer.
//!
//! [`Lexer`] turns source text into [`Token`]s, dispatching on the first
//! character of each token. Lexemes are copied into the arena. Malformed
//! input is recorded as a [`LexError`] and skipped, so the parser only ever
//! sees well-formed tokens.

use std::collections::VecDeque;

use bumpalo::Bump;
use staple_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer with arbitrary lookahead.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    lookahead: VecDeque<Token<'ast>>,
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            lookahead: VecDeque::with_capacity(4),
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'ast> {
        if let Some(token) = self.lookahead.pop_front() {
            return token;
        }
        self.scan_token()
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> &Token<'ast> {
        self.peek_nth(0)
    }

    /// Peek `n` tokens ahead (0 = next). Past the end this is `Eof`.
    pub fn peek_nth(&mut self, n: usize) -> &Token<'ast> {
        while self.lookahead.len() <= n {
            let token = self.scan_token();
            self.lookahead.push_back(token);
        }
        &self.lookahead[n]
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> Token<'ast> {
        loop {
            if let Err(error) = self.skip_trivia() {
                self.errors.push(error);
            }

            let Some(first) = self.cursor.peek() else {
                let span = Span::point(self.cursor.line(), self.cursor.column());
                return Token::new(TokenKind::Eof, "", span);
            };

            let line = self.cursor.line();
            let col = self.cursor.column();
            let start = self.cursor.offset();

            let scanned = match first {
                '"' => self.scan_string(line, col, start),
                c if c.is_ascii_digit() => Ok(self.scan_number(line, col, start)),
                c if is_ident_start(c) => Ok(self.scan_identifier(line, col, start)),
                _ => self.scan_operator(line, col, start),
            };

            match scanned {
                Ok(token) => return token,
                Err(error) => self.errors.push(error),
            }
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            self.cursor.eat_while(|c| c.is_whitespace());
            if self.cursor.check_str("//") {
                self.cursor.eat_while(|c| c != '\n');
            } else if self.cursor.check_str("/*") {
                let span = Span::point(self.cursor.line(), self.cursor.column());
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    if self.cursor.is_eof() {
                        return Err(LexError::UnterminatedComment { span });
                    }
                    if self.cursor.check_str("*/") {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    self.cursor.advance();
                }
            } else {
                return Ok(());
            }
        }
    }

    fn make_token(&self, kind: TokenKind, line: u32, col: u32, start: u32) -> Token<'ast> {
        let text = self.cursor.slice_from(start);
        let span = Span::new(line, col, text.len() as u32);
        Token::new(kind, self.arena.alloc_str(text), span)
    }

    // =========================================
    // Scanning: Literals
    // =========================================

    fn scan_string(&mut self, line: u32, col: u32, start: u32) -> Result<Token<'ast>, LexError> {
        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let len = self.cursor.offset() - start;
                    return Err(LexError::UnterminatedString {
                        span: Span::new(line, col, len),
                    });
                }
                Some('\\') => {
                    let escape_span = Span::new(self.cursor.line(), self.cursor.column(), 2);
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some('n' | 't' | 'r' | '0' | '\\' | '"') => {}
                        Some(ch) => {
                            // Keep scanning so the rest of the literal is not lexed as code.
                            self.cursor.eat_while(|c| c != '"' && c != '\n');
                            self.cursor.eat('"');
                            return Err(LexError::InvalidEscape { ch, span: escape_span });
                        }
                        None => {
                            return Err(LexError::UnterminatedString {
                                span: Span::new(line, col, self.cursor.offset() - start),
                            });
                        }
                    }
                }
                Some('"') => {
                    self.cursor.advance();
                    return Ok(self.make_token(TokenKind::StringLiteral, line, col, start));
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn scan_number(&mut self, line: u32, col: u32, start: u32) -> Token<'ast> {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        self.make_token(TokenKind::IntLiteral, line, col, start)
    }

    fn scan_identifier(&mut self, line: u32, col: u32, start: u32) -> Token<'ast> {
        self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(self.cursor.slice_from(start)).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, line, col, start)
    }

    // =========================================
    // Scanning: Operators
    // =========================================

    fn scan_operator(&mut self, line: u32, col: u32, start: u32) -> Result<Token<'ast>, LexError> {
        if self.cursor.check_str("...") {
            for _ in 0..3 {
                self.cursor.advance();
            }
            return Ok(self.make_token(TokenKind::Ellipsis, line, col, start));
        }

        let Some(c) = self.cursor.advance() else {
            return Err(LexError::UnexpectedChar { ch: '\0', span: Span::point(line, col) });
        };
        let next = self.cursor.peek();

        let kind = match (c, next) {
            ('(', _) => TokenKind::LeftParen,
            (')', _) => TokenKind::RightParen,
            ('{', _) => TokenKind::LeftBrace,
            ('}', _) => TokenKind::RightBrace,
            (';', _) => TokenKind::Semicolon,
            (',', _) => TokenKind::Comma,
            ('.', _) => TokenKind::Dot,
            ('+', _) => TokenKind::Plus,
            ('-', _) => TokenKind::Minus,
            ('*', _) => TokenKind::Star,
            ('/', _) => TokenKind::Slash,
            ('^', _) => TokenKind::Caret,

            ('&', Some('&')) => { self.cursor.advance(); TokenKind::AmpAmp }
            ('&', _) => TokenKind::Amp,
            ('|', Some('|')) => { self.cursor.advance(); TokenKind::PipePipe }
            ('|', _) => TokenKind::Pipe,
            ('=', Some('=')) => { self.cursor.advance(); TokenKind::EqualEqual }
            ('=', _) => TokenKind::Equal,
            ('!', Some('=')) => { self.cursor.advance(); TokenKind::BangEqual }
            ('<', Some('=')) => { self.cursor.advance(); TokenKind::LessEqual }
            ('<', _) => TokenKind::Less,
            ('>', Some('=')) => { self.cursor.advance(); TokenKind::GreaterEqual }
            ('>', _) => TokenKind::Greater,

            (ch, _) => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    span: Span::new(line, col, ch.len_utf8() as u32),
                });
            }
        };

        Ok(self.make_token(kind, line, col, start))
    }
}

/// Decode the text of a string literal lexeme (quotes included).
///
/// The lexer has already rejected unknown escapes, so decoding cannot fail.
pub fn decode_string_literal(lexeme: &str) -> String {
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> (Vec<TokenKind>, Vec<LexError>) {
        let arena = Bump::new();
        let mut lexer = Lexer::new(source, &arena);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            kinds.push(token.kind);
        }
        (kinds, lexer.take_errors())
    }

    #[test]
    fn class_header() {
        let (kinds, errors) = tokenize("class Circle extends Shape {");
        assert!(errors.is_empty());
        assert_eq!(
            kinds,
            vec![
                TokenKind::Class,
                TokenKind::Identifier,
                TokenKind::Extends,
                TokenKind::Identifier,
                TokenKind::LeftBrace,
            ]
        );
    }

    #[test]
    fn two_character_operators() {
        let (kinds, _) = tokenize("a || b && c == d != e <= f >= g");
        assert!(kinds.contains(&TokenKind::PipePipe));
        assert!(kinds.contains(&TokenKind::AmpAmp));
        assert!(kinds.contains(&TokenKind::EqualEqual));
        assert!(kinds.contains(&TokenKind::BangEqual));
        assert!(kinds.contains(&TokenKind::LessEqual));
        assert!(kinds.contains(&TokenKind::GreaterEqual));
    }

    #[test]
    fn variadic_marker() {
        let (kinds, _) = tokenize("(uint8* fmt, ...)");
        assert_eq!(kinds[kinds.len() - 2], TokenKind::Ellipsis);
    }

    #[test]
    fn comments_are_skipped() {
        let (kinds, errors) = tokenize("// line\nreturn /* block\n */ 1;");
        assert!(errors.is_empty());
        assert_eq!(kinds, vec![TokenKind::Return, TokenKind::IntLiteral, TokenKind::Semicolon]);
    }

    #[test]
    fn spans_track_lines() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("int\n  x", &arena);
        lexer.next_token();
        let x = lexer.next_token();
        assert_eq!(x.span, Span::new(2, 3, 1));
        assert_eq!(x.lexeme, "x");
    }

    #[test]
    fn peek_does_not_consume() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("a b", &arena);
        assert_eq!(lexer.peek_nth(1).lexeme, "b");
        assert_eq!(lexer.next_token().lexeme, "a");
        assert_eq!(lexer.next_token().lexeme, "b");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn bad_input_is_reported_and_skipped() {
        let (kinds, errors) = tokenize("x # y");
        assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::Identifier]);
        assert!(matches!(errors.as_slice(), [LexError::UnexpectedChar { ch: '#', .. }]));
    }

    #[test]
    fn unterminated_string() {
        let (_, errors) = tokenize("\"abc\nx");
        assert!(matches!(errors.as_slice(), [LexError::UnterminatedString { .. }]));
    }

    #[test]
    fn invalid_escape() {
        let (kinds, errors) = tokenize(r#""a\qb" x"#);
        assert_eq!(kinds, vec![TokenKind::Identifier]);
        assert!(matches!(errors.as_slice(), [LexError::InvalidEscape { ch: 'q', .. }]));
    }

    #[test]
    fn decode_escapes() {
        assert_eq!(decode_string_literal(r#""hi\n\"there\"""#), "hi\n\"there\"");
        assert_eq!(decode_string_literal(r#""tab\there""#), "tab\there");
    }
}
