//! Performance benchmarks for the Staple pipeline.
//!
//! - Parsing alone
//! - Parse through IR generation
//! - Rendering a finished unit in each profile

use bumpalo::Bump;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use staple::{EmitProfile, compile_source};
use staple_parser::Parser;
use std::hint::black_box;

const HELLO: &str = include_str!("../tests/test_scripts/hello.stp");
const SHAPES: &str = include_str!("../tests/test_scripts/shapes.stp");

fn parse_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/parse");

    group.throughput(Throughput::Bytes(SHAPES.len() as u64));
    group.bench_function("shapes", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let script = Parser::parse(black_box(SHAPES), &arena);
            black_box(script.map(|s| s.items.len()).unwrap_or(0))
        });
    });

    group.finish();
}

fn compile_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/compile");

    for (name, source) in [("hello", HELLO), ("shapes", SHAPES)] {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let output = compile_source(black_box(source));
                black_box(output.map(|o| o.instructions.len()).unwrap_or(0))
            });
        });
    }

    group.finish();
}

fn render_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/render");
    let Ok(output) = compile_source(SHAPES) else {
        return;
    };

    group.bench_function("llvm", |b| {
        b.iter(|| black_box(output.render(EmitProfile::Llvm).len()));
    });
    group.bench_function("c", |b| {
        b.iter(|| black_box(output.render(EmitProfile::C).len()));
    });

    group.finish();
}

criterion_group!(
    benches,
    parse_benchmarks,
    compile_benchmarks,
    render_benchmarks
);
criterion_main!(benches);
