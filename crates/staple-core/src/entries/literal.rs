//! String literal entry.

use crate::Type;

/// A string literal materialized as compile-unit storage.
///
/// Identical literal texts share one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteralEntry {
    /// Decoded text, without the terminating NUL.
    pub text: String,
    /// Name of the global holding the bytes.
    pub global_name: String,
}

impl StringLiteralEntry {
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            global_name: format!(".str{index}"),
        }
    }

    /// Array type of the storage, including the terminator.
    pub fn storage_type(&self) -> Type {
        Type::string_storage(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_counts_bytes_plus_terminator() {
        let lit = StringLiteralEntry::new("héllo", 0);
        assert_eq!(lit.storage_type(), Type::string_storage(6));
        assert_eq!(lit.global_name, ".str0");
    }
}
