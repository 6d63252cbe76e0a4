//! Staple Compiler
//!
//! Semantic analysis and code generation for one Staple compile unit.
//!
//! ## Architecture
//!
//! - **Pass 1 (Declaration)**: bind every top-level name in the root scope
//! - **Pass 2 (Resolution)**: bind `extends` clauses, member and signature
//!   types, then resolve and type-check every function body
//! - **Layout**: flatten class fields and dispatch slots
//! - **Code generation**: lower the bound tree to an SSA-style instruction
//!   stream, which [`render`] turns into LLVM or C text
//!
//! Each pass runs only if every earlier one reported no diagnostics.
//!
//! ## Modules
//!
//! - [`bindings`]: node id side tables for symbols, types and scopes
//! - [`codegen`]: IR generation
//! - [`context`]: per-unit compilation state
//! - [`ir`]: instruction set, operands and per-function lowering state
//! - [`passes`]: the two semantic passes
//! - [`render`]: output templates
//! - [`type_resolver`]: type expressions to semantic types

pub mod bindings;
pub mod codegen;
pub mod context;
pub mod ir;
pub mod passes;
pub mod render;
pub mod type_resolver;

pub use bindings::Bindings;
pub use codegen::CodeGenerator;
pub use context::CompilationContext;
pub use ir::Instruction;
pub use passes::{DeclarationOutput, DeclarationPass, ResolutionOutput, ResolutionPass};
pub use render::{CTemplate, EmitProfile, LlvmTemplate, Template, render};
pub use type_resolver::TypeResolver;

use std::fmt;

use staple_core::{Diagnostics, InternalError};
use staple_parser::ast::Script;
use thiserror::Error;
use tracing::{debug, instrument};

/// The pipeline stage that stopped a compile run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Declaration,
    Resolution,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Parse => "parse",
            Stage::Declaration => "declaration",
            Stage::Resolution => "resolution",
        })
    }
}

/// Why a compile run produced no instructions.
#[derive(Debug, Error)]
pub enum CompileError {
    /// User-facing problems. Every diagnostic of the stopping stage (and of
    /// the stages before it) is included.
    #[error("{stage} reported {} error(s)", diagnostics.error_count())]
    Diagnostics {
        stage: Stage,
        diagnostics: Diagnostics,
    },

    #[error("internal compiler error: {0}")]
    Internal(#[from] InternalError),
}

/// Result of a successful compile run.
#[derive(Debug)]
pub struct CompileOutput {
    pub instructions: Vec<Instruction>,
    /// Symbols, scopes and bindings of the unit.
    pub context: CompilationContext,
}

impl CompileOutput {
    pub fn render(&self, profile: EmitProfile) -> String {
        render(&self.instructions, profile.template().as_ref())
    }
}

/// Analyze and lower a parsed unit.
#[instrument(skip_all, fields(items = script.items.len()))]
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile(script: &Script<'_>) -> Result<CompileOutput, CompileError> {
    let mut ctx = CompilationContext::new();

    let declared = DeclarationPass::new(&mut ctx).run(script);
    debug!(?declared, "pass 1 done");
    stop_on_errors(&mut ctx, Stage::Declaration)?;

    let resolved = ResolutionPass::new(&mut ctx).run(script);
    debug!(?resolved, "pass 2 done");
    stop_on_errors(&mut ctx, Stage::Resolution)?;

    ctx.symbols
        .finalize_layouts()
        .map_err(|err| InternalError::invariant(err.to_string()))?;

    let instructions = CodeGenerator::new(&mut ctx).generate(script)?;
    Ok(CompileOutput {
        instructions,
        context: ctx,
    })
}

fn stop_on_errors(ctx: &mut CompilationContext, stage: Stage) -> Result<(), CompileError> {
    if ctx.has_errors() {
        return Err(CompileError::Diagnostics {
            stage,
            diagnostics: std::mem::take(&mut ctx.diagnostics),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use staple_core::SemanticError;
    use staple_parser::Parser;

    fn compile_source(source: &str) -> Result<CompileOutput, CompileError> {
        let arena = Bump::new();
        let script = Parser::parse(source, &arena).expect("parses");
        compile(&script)
    }

    #[test]
    fn declaration_errors_stop_before_resolution() {
        // `missing` would be an unresolved name in Pass 2.
        let err = compile_source("int f() { return missing; } void f() {}").unwrap_err();
        match err {
            CompileError::Diagnostics { stage, diagnostics } => {
                assert_eq!(stage, Stage::Declaration);
                assert_eq!(diagnostics.error_count(), 1);
                assert!(matches!(
                    diagnostics.semantic_errors(),
                    [SemanticError::DuplicateDeclaration { .. }]
                ));
            }
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }

    #[test]
    fn resolution_errors_stop_before_codegen() {
        let err = compile_source("int main() { return nothing; }").unwrap_err();
        assert!(matches!(
            err,
            CompileError::Diagnostics {
                stage: Stage::Resolution,
                ..
            }
        ));
    }

    #[test]
    fn clean_unit_produces_instructions() {
        let output = compile_source("int main() { return 0; }").unwrap();
        assert!(
            output
                .instructions
                .iter()
                .any(|i| matches!(i, Instruction::DeclareFunction(f) if f.name == "main"))
        );
        assert!(output.render(EmitProfile::Llvm).contains("define i32 @main()"));
    }
}
