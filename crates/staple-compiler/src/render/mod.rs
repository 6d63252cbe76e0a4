//! Renderers: instruction stream to output text.
//!
//! [`Instruction::render`] dispatches on the instruction kind to one method
//! of a [`Template`]. A template is a profile for one output language; both
//! profiles consume the same instruction stream.
//!
//! - [`LlvmTemplate`]: LLVM-style SSA text (typed-pointer syntax)
//! - [`CTemplate`]: C source, with phi merges lowered through a
//!   predecessor-block variable

mod c;
mod llvm;

pub use c::CTemplate;
pub use llvm::LlvmTemplate;

use std::fmt;

use staple_parser::ast::{ArithmeticOp, CompareOp};

use crate::ir::{
    ClassRecord, ExternalDecl, FunctionDef, Instruction, IrType, Label, Operand, RecordField,
    Signature,
};

/// One output language. Each method renders one instruction kind.
pub trait Template {
    /// Text placed before the first instruction.
    fn prologue(&self, _unit: &[Instruction]) -> String {
        String::new()
    }

    fn string_literal(&self, name: &str, text: &str) -> String;
    fn struct_decl(&self, name: &str, fields: &[RecordField]) -> String;
    fn class_decl(&self, class: &ClassRecord) -> String;
    fn external(&self, decl: &ExternalDecl) -> String;
    /// `body` holds the already rendered body instructions, in order.
    fn function(&self, function: &FunctionDef, body: &[String]) -> String;

    fn label(&self, label: Label) -> String;
    fn alloca(&self, dest: &Operand, ty: &IrType, count: u32) -> String;
    fn load(&self, dest: &Operand, address: &Operand) -> String;
    fn store(&self, value: &Operand, address: &Operand) -> String;
    fn get_element_ptr(&self, dest: &Operand, base: &Operand, indices: &[u32]) -> String;
    fn cast(&self, dest: &Operand, value: &Operand) -> String;
    fn arithmetic(
        &self,
        op: ArithmeticOp,
        dest: &Operand,
        left: &Operand,
        right: &Operand,
    ) -> String;
    fn compare(&self, op: CompareOp, dest: &Operand, left: &Operand, right: &Operand) -> String;
    fn jump(&self, label: Label) -> String;
    fn branch(&self, condition: &Operand, on_true: Label, on_false: Label) -> String;
    fn phi(&self, dest: &Operand, incoming: &[(Operand, Label)]) -> String;
    fn call(
        &self,
        dest: Option<&Operand>,
        callee: &str,
        signature: &Signature,
        args: &[Operand],
    ) -> String;
    fn ret(&self, value: Option<&Operand>) -> String;
}

/// Output profile selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmitProfile {
    #[default]
    Llvm,
    C,
}

impl EmitProfile {
    pub fn template(self) -> Box<dyn Template> {
        match self {
            EmitProfile::Llvm => Box::new(LlvmTemplate),
            EmitProfile::C => Box::new(CTemplate),
        }
    }
}

impl fmt::Display for EmitProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmitProfile::Llvm => "llvm",
            EmitProfile::C => "c",
        })
    }
}

/// Render a whole compile unit.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn render(unit: &[Instruction], template: &dyn Template) -> String {
    let mut out = template.prologue(unit);
    for instruction in unit {
        out.push_str(&instruction.render(template));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_names() {
        assert_eq!(EmitProfile::default().to_string(), "llvm");
        assert_eq!(EmitProfile::C.to_string(), "c");
    }
}
