//! Test harness for pipeline integration tests.
//!
//! Loads Staple sources from `tests/test_scripts/` and runs them through the
//! full pipeline.

use std::fs;
use std::path::PathBuf;

use staple::{CompileError, CompileOutput, compile_source};

pub struct TestHarness {
    test_scripts_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let test_scripts_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("test_scripts");
        Self { test_scripts_dir }
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.test_scripts_dir.join(filename)
    }

    pub fn load(&self, filename: &str) -> String {
        let path = self.path(filename);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    pub fn compile(&self, filename: &str) -> Result<CompileOutput, CompileError> {
        compile_source(&self.load(filename))
    }

    /// Compile a script that must succeed.
    pub fn compile_ok(&self, filename: &str) -> CompileOutput {
        match self.compile(filename) {
            Ok(output) => output,
            Err(CompileError::Diagnostics { stage, diagnostics }) => {
                panic!("{filename}: {stage} failed:\n{diagnostics}")
            }
            Err(err) => panic!("{filename}: {err}"),
        }
    }

    /// A scratch output path unique to one test.
    pub fn scratch(&self, name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("staple-{}-{name}", std::process::id()))
    }
}
