//! Semantic passes.
//!
//! - **Pass 1 (Declaration)**: register every top-level class, struct,
//!   function and external function by name, without resolving anything.
//! - **Pass 2 (Resolution)**: resolve types, bind inheritance, build scopes,
//!   resolve names and type-check bodies.
//!
//! Both passes report problems into the context's diagnostics and keep
//! going. The pipeline stops after a pass that reported anything.

mod declaration;
mod resolution;

pub use declaration::{DeclarationOutput, DeclarationPass};
pub use resolution::{ResolutionOutput, ResolutionPass};
