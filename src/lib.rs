//! Staple: semantic analysis and SSA code generation for the Staple language.
//!
//! The crate ties the pipeline together for the command line:
//!
//! ```text
//! source ─► parse ─► Pass 1 ─► Pass 2 ─► layout ─► IR ─► LLVM / C text
//! ```
//!
//! Each stage runs only if the stages before it reported no diagnostics.
//!
//! # Example
//!
//! ```ignore
//! let output = staple::compile_source("int main() { return 0; }")?;
//! print!("{}", output.render(staple::EmitProfile::Llvm));
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bumpalo::Bump;
use staple_core::{Diagnostics, StapleError};
use staple_parser::Parser;
use tracing::{debug, info, instrument};

pub use staple_compiler::{CompileError, CompileOutput, EmitProfile, Stage};

/// Exit status of [`compile`] when output was produced.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status when the source has errors; diagnostics were printed.
pub const EXIT_DIAGNOSTICS: i32 = 1;
/// Exit status for I/O failures and internal compiler errors.
pub const EXIT_FAILURE: i32 = 2;

/// What to produce and where.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub emit: EmitProfile,
    /// Output file; standard output when unset.
    pub output: Option<PathBuf>,
}

/// Parse and compile a source text.
///
/// Parse errors are returned as diagnostics of [`Stage::Parse`].
pub fn compile_source(source: &str) -> Result<CompileOutput, CompileError> {
    let arena = Bump::new();
    let script = Parser::parse(source, &arena).map_err(|errors| {
        let mut diagnostics = Diagnostics::new();
        for error in errors.iter() {
            diagnostics.report_parse(error);
        }
        CompileError::Diagnostics {
            stage: Stage::Parse,
            diagnostics,
        }
    })?;
    staple_compiler::compile(&script)
}

/// Compile `path` to LLVM text on standard output.
///
/// Returns [`EXIT_SUCCESS`], [`EXIT_DIAGNOSTICS`] or [`EXIT_FAILURE`].
pub fn compile(path: impl AsRef<Path>) -> i32 {
    compile_with(path, &CompileOptions::default())
}

/// Compile `path` with explicit options. See [`compile`].
#[instrument(skip_all, fields(path = %path.as_ref().display(), emit = %options.emit))]
pub fn compile_with(path: impl AsRef<Path>, options: &CompileOptions) -> i32 {
    let path = path.as_ref();
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => return fail(StapleError::io(path, err)),
    };
    debug!(bytes = source.len(), "read source");

    match compile_source(&source) {
        Ok(output) => {
            let text = output.render(options.emit);
            match write_output(&text, options.output.as_deref()) {
                Ok(()) => {
                    info!(
                        instructions = output.instructions.len(),
                        "compiled {}",
                        path.display()
                    );
                    EXIT_SUCCESS
                }
                Err(err) => fail(err),
            }
        }
        Err(CompileError::Diagnostics { stage, diagnostics }) => {
            print!("{diagnostics}");
            info!(%stage, errors = diagnostics.error_count(), "compilation stopped");
            EXIT_DIAGNOSTICS
        }
        Err(CompileError::Internal(err)) => fail(StapleError::from(err)),
    }
}

fn write_output(text: &str, output: Option<&Path>) -> Result<(), StapleError> {
    match output {
        Some(file) => fs::write(file, text).map_err(|err| StapleError::io(file, err)),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|err| StapleError::io("<stdout>", err))
        }
    }
}

fn fail(err: StapleError) -> i32 {
    eprintln!("error: {err}");
    EXIT_FAILURE
}
