use staple_core::SymbolId;
use thiserror::Error;

/// Errors raised by symbol and scope bookkeeping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// The name is already bound in this exact scope.
    #[error("'{name}' is already defined in this scope")]
    AlreadyDefined { name: String, existing: SymbolId },

    /// Layout computation found a class that is its own ancestor.
    #[error("class '{class}' inherits from itself")]
    InheritanceCycle { class: String },

    /// An id that does not name a symbol of the expected kind.
    #[error("{id:?} is not a {expected}")]
    WrongKind { id: SymbolId, expected: &'static str },
}
