//! Core types shared by every stage of the Staple compiler.
//!
//! - [`Span`] and [`NodeId`] tie results back to source
//! - [`Type`] is the type system
//! - [`Symbol`] and its entries describe named program entities
//! - [`Diagnostics`] collects user-facing problems
//! - [`StapleError`] wraps every failure of a compile run

mod diagnostics;
pub mod entries;
mod error;
mod ids;
mod span;
pub mod types;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use entries::{
    ClassEntry, ClassLayout, FieldEntry, FunctionEntry, FunctionTraits, StringLiteralEntry,
    StructEntry, Symbol, VariableEntry,
};
pub use error::{
    InternalError, LexError, ParseError, ParseErrorKind, ParseErrors, SemanticError, StapleError,
};
pub use ids::{NodeId, ScopeId, SymbolId};
pub use span::Span;
pub use types::{PrimitiveKind, Type};

/// Name of the implicit root of every class hierarchy.
pub const ROOT_CLASS_NAME: &str = "Object";

/// Name of the construction entry point every class carries.
pub const INIT_FUNCTION_NAME: &str = "init";

/// Name bound to the receiver inside member functions.
pub const SELF_NAME: &str = "self";
