//! The diagnostic stream.
//!
//! Every stage appends to one [`Diagnostics`] value owned by the compile
//! unit. Nothing is ever removed; the driver prints the stream and decides
//! whether to continue based on [`Diagnostics::has_errors`].

use std::fmt;

use crate::{ParseError, SemanticError, Span};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Info => "info",
        })
    }
}

/// One reported problem.
///
/// Displays as `line:col: error: message`.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::Error,
            message: message.into(),
            span,
        }
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.span, self.kind, self.message)
    }
}

impl From<&SemanticError> for Diagnostic {
    fn from(error: &SemanticError) -> Self {
        let message = match error {
            SemanticError::UnresolvedSymbol { name, .. } => format!("unresolved symbol '{name}'"),
            SemanticError::TypeMismatch { message, .. } => format!("type mismatch: {message}"),
            SemanticError::DuplicateDeclaration { name, original, .. } => {
                format!("duplicate declaration of '{name}' (first declared at {original})")
            }
        };
        Diagnostic::error(message, error.span())
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        Diagnostic::error(format!("{}: {}", error.kind, error.message), error.span)
    }
}

/// Append-only collection of diagnostics, in report order.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    /// Semantic errors kept alongside their rendered form so tests and tools
    /// can match on the category.
    semantic: Vec<SemanticError>,
    error_count: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.kind == DiagnosticKind::Error {
            self.error_count += 1;
        }
        self.entries.push(diagnostic);
    }

    /// Record a semantic error.
    pub fn report(&mut self, error: SemanticError) {
        self.push(Diagnostic::from(&error));
        self.semantic.push(error);
    }

    /// Record a syntax error.
    pub fn report_parse(&mut self, error: &ParseError) {
        self.push(Diagnostic::from(error));
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Semantic errors in report order.
    pub fn semantic_errors(&self) -> &[SemanticError] {
        &self.semantic
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.entries {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_errors_count_as_errors() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning("unused", Span::point(1, 1)));
        assert!(!diagnostics.has_errors());

        diagnostics.report(SemanticError::unresolved("y", Span::new(2, 3, 1)));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn display_prints_one_line_per_diagnostic() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(SemanticError::mismatch("condition must be bool", Span::new(5, 9, 3)));
        diagnostics.report(SemanticError::unresolved("g", Span::new(6, 1, 1)));
        assert_eq!(
            diagnostics.to_string(),
            "5:9: error: type mismatch: condition must be bool\n6:1: error: unresolved symbol 'g'\n"
        );
    }

    #[test]
    fn semantic_errors_keep_their_category() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(SemanticError::duplicate("x", Span::new(1, 1, 1), Span::new(2, 1, 1)));
        assert!(matches!(
            diagnostics.semantic_errors(),
            [SemanticError::DuplicateDeclaration { name, .. }] if name == "x"
        ));
    }
}
