//! Source locations for diagnostics.
//!
//! Every syntax node and every diagnostic carries a [`Span`] so messages
//! can point back at the offending source text.

use std::fmt;

/// A region of source text, identified by where it starts.
///
/// Lines and columns are 1-indexed; columns count bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span covers no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extend this span so it also covers `other`.
    ///
    /// Spans on different lines keep the start of `self`; the length is only
    /// meaningful for single-line spans.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line != other.line {
            return Span::new(self.line, self.col, self.len + other.len);
        }
        let start = self.col.min(other.col);
        let end = (self.col + self.len).max(other.col + other.len);
        Span::new(self.line, start, end - start)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_is_empty() {
        assert!(Span::point(2, 4).is_empty());
        assert!(!Span::new(2, 4, 1).is_empty());
    }

    #[test]
    fn display_is_line_col() {
        assert_eq!(Span::new(7, 12, 3).to_string(), "7:12");
    }

    #[test]
    fn merge_on_one_line_covers_both() {
        let merged = Span::new(1, 10, 3).merge(Span::new(1, 4, 2));
        assert_eq!(merged, Span::new(1, 4, 9));
    }

    #[test]
    fn merge_across_lines_keeps_start() {
        let merged = Span::new(1, 5, 10).merge(Span::new(3, 1, 5));
        assert_eq!(merged.line, 1);
        assert_eq!(merged.col, 5);
        assert_eq!(merged.len, 15);
    }
}
