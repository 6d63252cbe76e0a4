//! Error types for every stage of the Staple pipeline.
//!
//! ## Error Hierarchy
//!
//! ```text
//! StapleError (top-level wrapper)
//! ├── LexError        - tokenization errors
//! ├── ParseError      - syntax errors (with ParseErrorKind)
//! ├── SemanticError   - unresolved names, type mismatches, redefinitions
//! ├── InternalError   - broken invariants inside code generation
//! └── Io              - reading the input or writing the output
//! ```
//!
//! Lexical, syntax and semantic errors are accumulated and reported as
//! [`Diagnostic`](crate::Diagnostic)s; they never abort a pass. Internal
//! errors abort the run.

use std::path::PathBuf;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur while tokenizing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    #[error("invalid escape '\\{ch}' at {span}")]
    InvalidEscape { ch: char, span: Span },

    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedComment { span }
            | LexError::InvalidEscape { span, .. }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The lexer rejected the input.
    Lexical,
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// Unexpected end of file.
    UnexpectedEof,
    ExpectedIdentifier,
    ExpectedExpression,
    ExpectedType,
    ExpectedStatement,
    /// A top-level or class-member declaration was expected.
    ExpectedDeclaration,
    /// `...` outside the last parameter of an external function.
    MisplacedVariadic,
    /// An integer literal that does not fit in 64 bits.
    InvalidLiteral,
    /// The left side of `=` cannot be assigned to.
    InvalidAssignTarget,
}

impl ParseErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "lexical error",
            Self::ExpectedToken => "expected token",
            Self::UnexpectedToken => "unexpected token",
            Self::UnexpectedEof => "unexpected end of file",
            Self::ExpectedIdentifier => "expected identifier",
            Self::ExpectedExpression => "expected expression",
            Self::ExpectedType => "expected type",
            Self::ExpectedStatement => "expected statement",
            Self::ExpectedDeclaration => "expected declaration",
            Self::MisplacedVariadic => "misplaced variadic marker",
            Self::InvalidLiteral => "invalid literal",
            Self::InvalidAssignTarget => "invalid assignment target",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A syntax error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, span, "unexpected end of file")
    }

    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("expected expression, found {found}"),
        )
    }

    pub fn expected_type(span: Span, found: &str) -> Self {
        Self::new(ParseErrorKind::ExpectedType, span, format!("expected type, found {found}"))
    }

    /// Render the error with the offending source line and a caret.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = format!("error at {}: {}\n  {}\n", self.span, self.kind, self.message);
        let line_text = source.lines().nth((self.span.line as usize).saturating_sub(1));
        if let Some(line_text) = line_text {
            let indent = " ".repeat((self.span.col as usize).saturating_sub(1));
            let marker = "^".repeat(self.span.len.max(1) as usize);
            output.push_str(&format!("{:>4} | {line_text}\n     | {indent}{marker}\n", self.span.line));
        }
        output
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError::new(ParseErrorKind::Lexical, error.span(), error.to_string())
    }
}

/// Parse errors collected while the parser recovers and continues.
#[derive(Debug, Clone, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self { errors: vec![error] }
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Semantic Errors
// ============================================================================

/// Problems found by the declaration and resolution passes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    /// A name that no enclosing scope binds.
    #[error("at {span}: unresolved symbol '{name}'")]
    UnresolvedSymbol { name: String, span: Span },

    /// A name or expression with the wrong kind or type for its use.
    #[error("at {span}: type mismatch: {message}")]
    TypeMismatch { message: String, span: Span },

    /// A second declaration of a name in the same scope.
    #[error("at {span}: '{name}' is already declared at {original}")]
    DuplicateDeclaration {
        name: String,
        original: Span,
        span: Span,
    },
}

impl SemanticError {
    pub fn span(&self) -> Span {
        match self {
            SemanticError::UnresolvedSymbol { span, .. }
            | SemanticError::TypeMismatch { span, .. }
            | SemanticError::DuplicateDeclaration { span, .. } => *span,
        }
    }

    pub fn unresolved(name: impl Into<String>, span: Span) -> Self {
        SemanticError::UnresolvedSymbol {
            name: name.into(),
            span,
        }
    }

    pub fn mismatch(message: impl Into<String>, span: Span) -> Self {
        SemanticError::TypeMismatch {
            message: message.into(),
            span,
        }
    }

    pub fn duplicate(name: impl Into<String>, original: Span, span: Span) -> Self {
        SemanticError::DuplicateDeclaration {
            name: name.into(),
            original,
            span,
        }
    }
}

// ============================================================================
// Internal Errors
// ============================================================================

/// A broken invariant inside code generation.
///
/// These cannot be caused by user input once both semantic passes succeed;
/// each variant carries enough state to diagnose the generator itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InternalError {
    #[error("no address recorded for '{symbol}' in function '{function}' (known locations: [{known}])")]
    MissingAddress {
        symbol: String,
        function: String,
        known: String,
    },

    #[error("syntax node at {span} has no bound {what}")]
    UnboundNode { what: &'static str, span: Span },

    #[error("instruction block stack underflow in function '{function}'")]
    BlockStackUnderflow { function: String },

    #[error("class '{class}' has no finalized layout")]
    MissingLayout { class: String },

    #[error("{message}")]
    Invariant { message: String },
}

impl InternalError {
    pub fn invariant(message: impl Into<String>) -> Self {
        InternalError::Invariant {
            message: message.into(),
        }
    }
}

// ============================================================================
// Unified Error
// ============================================================================

/// Any failure of a compile run.
#[derive(Debug, Error)]
pub enum StapleError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error("internal compiler error: {0}")]
    Internal(#[from] InternalError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StapleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StapleError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_error_messages() {
        let err = SemanticError::unresolved("counter", Span::new(4, 9, 7));
        assert_eq!(err.to_string(), "at 4:9: unresolved symbol 'counter'");

        let err = SemanticError::duplicate("x", Span::new(2, 5, 1), Span::new(3, 5, 1));
        assert_eq!(err.to_string(), "at 3:5: 'x' is already declared at 2:5");
        assert_eq!(err.span(), Span::new(3, 5, 1));
    }

    #[test]
    fn lex_errors_become_parse_errors() {
        let err: ParseError = LexError::UnterminatedString { span: Span::new(1, 3, 4) }.into();
        assert_eq!(err.kind, ParseErrorKind::Lexical);
        assert_eq!(err.span, Span::new(1, 3, 4));
    }

    #[test]
    fn display_with_source_points_at_column() {
        let err = ParseError::expected_token(Span::new(2, 7, 1), "';'", "'}'");
        let rendered = err.display_with_source("int main() {\n  int x }\n");
        assert!(rendered.contains("   2 |   int x }"));
        assert!(rendered.contains("|       ^"));
    }

    #[test]
    fn internal_errors_wrap_into_staple_error() {
        let err: StapleError = InternalError::invariant("phi without predecessors").into();
        assert_eq!(err.to_string(), "internal compiler error: phi without predecessors");
    }
}
