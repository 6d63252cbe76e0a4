//! Integration tests for the full pipeline: source text or file in, exit
//! code and rendered output out.

mod test_harness;

use staple::{CompileError, CompileOptions, EmitProfile, Stage, compile_source, compile_with};
use staple_compiler::ir::{Instruction, IrType, Operand};
use staple_core::SemanticError;
use test_harness::TestHarness;

fn function<'a>(instructions: &'a [Instruction], name: &str) -> &'a [Instruction] {
    instructions
        .iter()
        .find_map(|i| match i {
            Instruction::DeclareFunction(f) if f.name == name => Some(f.body.as_slice()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no function '{name}'"))
}

fn diagnostics_of(result: Result<staple::CompileOutput, CompileError>) -> (Stage, Vec<SemanticError>, usize) {
    match result {
        Err(CompileError::Diagnostics { stage, diagnostics }) => (
            stage,
            diagnostics.semantic_errors().to_vec(),
            diagnostics.error_count(),
        ),
        Err(err) => panic!("expected diagnostics, got {err}"),
        Ok(_) => panic!("expected diagnostics, compile succeeded"),
    }
}

#[test]
fn test_hello_compiles_to_llvm() {
    let harness = TestHarness::new();
    let output = harness.compile_ok("hello.stp");
    let text = output.render(EmitProfile::Llvm);

    assert!(text.contains("declare i32 @printf(i8*, ...)"));
    assert!(text.contains("@.str0 = private unnamed_addr constant [11 x i8] c\"hello, %s\\0A\\00\""));
    assert!(text.contains("@.str1 = private unnamed_addr constant [6 x i8] c\"world\\00\""));
    assert!(text.contains("define i32 @main() {"));
    assert!(text.contains("ret i32 0"));
}

#[test]
fn test_shapes_compiles_to_both_profiles() {
    let harness = TestHarness::new();
    let output = harness.compile_ok("shapes.stp");

    let llvm = output.render(EmitProfile::Llvm);
    assert!(llvm.contains("%Point = type { i32, i32 }"));
    assert!(llvm.contains("@SquareClassObj = global %SquareClass"));
    assert!(llvm.contains("i8* bitcast (%ShapeClass* @ShapeClassObj to i8*)"));
    assert!(llvm.contains("define i32 @Square_area(%Square* %self) {"));

    let c = output.render(EmitProfile::C);
    assert!(c.starts_with("#include <stdbool.h>\n#include <stdint.h>\n"));
    assert!(c.contains("struct Point {\n    int32_t m0; /* x */\n    int32_t m1; /* y */\n};"));
    assert!(c.contains("int32_t describe(struct Square* s, bool verbose) {"));
    assert!(c.contains("int stp_pred = -1, stp_block = -1;"));
}

#[test]
fn test_shapes_dispatch_order() {
    let harness = TestHarness::new();
    let output = harness.compile_ok("shapes.stp");

    let square = output
        .instructions
        .iter()
        .find_map(|i| match i {
            Instruction::DeclareClass(class) if class.name == "Square" => Some(class),
            _ => None,
        })
        .expect("Square is declared");
    let slots: Vec<&str> = square
        .dispatch
        .slots
        .iter()
        .map(|s| s.function.as_str())
        .collect();
    assert_eq!(
        slots,
        vec![
            "Square_init",
            "Object_dest",
            "Shape_count",
            "Shape_is_polygon",
            "Square_area"
        ]
    );
    let fields: Vec<&str> = square.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["classType", "refCount", "origin", "sides", "size"]);
}

#[test]
fn test_nested_struct_field_is_addressed_in_place() {
    let harness = TestHarness::new();
    let output = harness.compile_ok("shapes.stp");
    let body = function(&output.instructions, "describe");

    // s.origin.x: the struct field is not loaded, its address is extended.
    let point = IrType::pointer_to(IrType::Record("Point".into()));
    let origin = body
        .iter()
        .find_map(|i| match i {
            Instruction::GetElementPtr { dest, indices, .. }
                if dest.ty() == &point && indices == &[0, 2] =>
            {
                Some(dest.clone())
            }
            _ => None,
        })
        .expect("address of s.origin");
    assert!(body.iter().any(|i| matches!(
        i,
        Instruction::GetElementPtr { base, indices, .. } if base == &origin && indices == &[0, 0]
    )));
}

#[test]
fn test_inner_declaration_shadows_outer() {
    let output = compile_source(
        r#"
        int32 f() {
            int32 x = 1;
            {
                int32 x = 2;
                x = 3;
            }
            return x;
        }
        "#,
    )
    .expect("compiles");
    let body = function(&output.instructions, "f");
    let outer = Operand::Temp {
        id: 0,
        ty: IrType::pointer_to(IrType::I32),
    };
    let inner = Operand::Temp {
        id: 1,
        ty: IrType::pointer_to(IrType::I32),
    };

    assert_eq!(
        body[4],
        Instruction::Store {
            value: Operand::int(3, IrType::I32),
            address: inner,
        }
    );
    assert_eq!(
        body[5],
        Instruction::Load {
            dest: Operand::Temp {
                id: 2,
                ty: IrType::I32
            },
            address: outer,
        }
    );
}

#[test]
fn test_redefinition_in_one_block_is_reported_once() {
    let (stage, errors, count) =
        diagnostics_of(compile_source("void f() { int32 a = 1; int32 a = 2; }"));
    assert_eq!(stage, Stage::Resolution);
    assert_eq!(count, 1);
    assert!(matches!(
        &errors[..],
        [SemanticError::DuplicateDeclaration { name, .. }] if name == "a"
    ));
}

#[test]
fn test_declaration_errors_skip_later_passes() {
    let harness = TestHarness::new();
    let (stage, errors, count) = diagnostics_of(harness.compile("duplicate.stp"));

    // `undefined()` would be reported by Pass 2.
    assert_eq!(stage, Stage::Declaration);
    assert_eq!(count, 1);
    assert!(matches!(&errors[..], [SemanticError::DuplicateDeclaration { .. }]));
}

#[test]
fn test_unresolved_name() {
    let harness = TestHarness::new();
    let (stage, errors, _) = diagnostics_of(harness.compile("unresolved.stp"));
    assert_eq!(stage, Stage::Resolution);
    assert!(matches!(
        &errors[..],
        [SemanticError::UnresolvedSymbol { name, .. }] if name == "b"
    ));
}

#[test]
fn test_parse_errors_are_diagnostics() {
    let (stage, errors, count) = diagnostics_of(compile_source("int32 main( { }"));
    assert_eq!(stage, Stage::Parse);
    assert!(errors.is_empty());
    assert!(count >= 1);
}

#[test]
fn test_exit_codes() {
    let harness = TestHarness::new();

    let output = harness.scratch("hello.c");
    let options = CompileOptions {
        emit: EmitProfile::C,
        output: Some(output.clone()),
    };
    assert_eq!(compile_with(harness.path("hello.stp"), &options), 0);
    let text = std::fs::read_to_string(&output).expect("output written");
    assert!(text.contains("int32_t main(void) {"));
    let _ = std::fs::remove_file(&output);

    let quiet = CompileOptions {
        emit: EmitProfile::Llvm,
        output: Some(harness.scratch("unused.ll")),
    };
    assert_eq!(compile_with(harness.path("unresolved.stp"), &quiet), 1);
    assert_eq!(compile_with(harness.path("duplicate.stp"), &quiet), 1);
    assert_eq!(compile_with(harness.path("missing.stp"), &quiet), 2);
}
