//! `staple <input> [-o FILE] [--emit llvm|c]`
//!
//! Exits with 0 on success, 1 when the source has errors and 2 on I/O or
//! internal failures.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use staple::{CompileOptions, EmitProfile};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "staple")]
#[command(about = "Compile a Staple source file to LLVM IR or C")]
struct Args {
    /// Source file to compile
    input: PathBuf,

    /// Write output here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output language
    #[arg(long, value_enum, default_value_t = Emit::Llvm)]
    emit: Emit,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Emit {
    Llvm,
    C,
}

impl From<Emit> for EmitProfile {
    fn from(emit: Emit) -> Self {
        match emit {
            Emit::Llvm => EmitProfile::Llvm,
            Emit::C => EmitProfile::C,
        }
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,staple=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let args = Args::parse();

    let options = CompileOptions {
        emit: args.emit.into(),
        output: args.output,
    };
    process::exit(staple::compile_with(&args.input, &options));
}
