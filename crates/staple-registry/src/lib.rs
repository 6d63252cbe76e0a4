//! Symbol and scope storage for the Staple compiler.
//!
//! - [`SymbolTable`] owns every [`Symbol`](staple_core::Symbol) of a compile
//!   unit and computes class layouts once binding is complete.
//! - [`ScopeTree`] owns the lexical scopes and performs outward name lookup.

mod error;
mod layout;
mod scope_tree;
mod symbol_table;

pub use error::RegistryError;
pub use scope_tree::{Scope, ScopeKind, ScopeTree};
pub use symbol_table::SymbolTable;
