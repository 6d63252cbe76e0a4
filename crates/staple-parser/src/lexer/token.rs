//! Token types for the Staple lexer.

use staple_core::Span;
use std::fmt;

/// A token from the source code.
///
/// The lexeme is copied into the parse arena so the source text can be
/// dropped once parsing finishes.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token kinds of the Staple language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// `42`
    IntLiteral,
    /// `"hello\n"`, lexeme keeps the quotes and escapes
    StringLiteral,

    /// User-defined identifier
    Identifier,

    // =========================================
    // Keywords - Types
    // =========================================
    Void,
    Bool,
    /// `int` or `int32`
    Int,
    Int8,
    Int16,
    Int64,
    /// `uint` or `uint32`
    UInt,
    UInt8,
    UInt16,
    UInt64,

    // =========================================
    // Keywords - Values and declarations
    // =========================================
    True,
    False,
    Class,
    Struct,
    Extends,
    Extern,

    // =========================================
    // Keywords - Control flow
    // =========================================
    If,
    Else,
    Return,

    // =========================================
    // Operators
    // =========================================
    Plus,
    Minus,
    Star,
    Slash,
    Amp,
    Pipe,
    Caret,
    AmpAmp,
    PipePipe,
    Equal,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // =========================================
    // Punctuation
    // =========================================
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,
    Dot,
    /// `...`
    Ellipsis,

    Eof,
}

impl TokenKind {
    /// Whether this keyword names a primitive type.
    pub fn is_primitive_type(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Void | Bool | Int | Int8 | Int16 | Int64 | UInt | UInt8 | UInt16 | UInt64
        )
    }

    /// Human-readable description used in "expected X, found Y" messages.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            StringLiteral => "string literal",
            Identifier => "identifier",
            Void => "'void'",
            Bool => "'bool'",
            Int => "'int'",
            Int8 => "'int8'",
            Int16 => "'int16'",
            Int64 => "'int64'",
            UInt => "'uint'",
            UInt8 => "'uint8'",
            UInt16 => "'uint16'",
            UInt64 => "'uint64'",
            True => "'true'",
            False => "'false'",
            Class => "'class'",
            Struct => "'struct'",
            Extends => "'extends'",
            Extern => "'extern'",
            If => "'if'",
            Else => "'else'",
            Return => "'return'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Amp => "'&'",
            Pipe => "'|'",
            Caret => "'^'",
            AmpAmp => "'&&'",
            PipePipe => "'||'",
            Equal => "'='",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Semicolon => "';'",
            Comma => "','",
            Dot => "'.'",
            Ellipsis => "'...'",
            Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Map an identifier-shaped lexeme to its keyword, if it is one.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "void" => Void,
        "bool" => Bool,
        "int" | "int32" => Int,
        "int8" => Int8,
        "int16" => Int16,
        "int64" => Int64,
        "uint" | "uint32" => UInt,
        "uint8" => UInt8,
        "uint16" => UInt16,
        "uint64" => UInt64,
        "true" => True,
        "false" => False,
        "class" => Class,
        "struct" => Struct,
        "extends" => Extends,
        "extern" => Extern,
        "if" => If,
        "else" => Else,
        "return" => Return,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_aliases() {
        assert_eq!(lookup_keyword("int32"), Some(TokenKind::Int));
        assert_eq!(lookup_keyword("extends"), Some(TokenKind::Extends));
        assert_eq!(lookup_keyword("self"), None);
        assert_eq!(lookup_keyword("Object"), None);
    }

    #[test]
    fn primitive_type_keywords() {
        assert!(TokenKind::UInt8.is_primitive_type());
        assert!(TokenKind::Void.is_primitive_type());
        assert!(!TokenKind::Class.is_primitive_type());
    }
}
