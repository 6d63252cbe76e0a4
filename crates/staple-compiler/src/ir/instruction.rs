//! The instruction set.

use staple_parser::ast::{ArithmeticOp, CompareOp};

use super::{IrType, Label, Operand, Signature};
use crate::render::Template;

/// One IR instruction.
///
/// Each instruction owns its operands. Instructions that define a value
/// store its temporary in `dest`.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    // =========================================
    // Compile-unit declarations
    // =========================================
    /// NUL-terminated byte storage for a string literal.
    DeclareStringLiteral {
        name: String,
        text: String,
    },
    DeclareStruct {
        name: String,
        fields: Vec<RecordField>,
    },
    DeclareClass(ClassRecord),
    DeclareExternal(ExternalDecl),
    DeclareFunction(FunctionDef),

    // =========================================
    // Function body
    // =========================================
    Label(Label),
    /// Stack storage for `count` values of `ty`; `dest` points at it.
    Alloca {
        dest: Operand,
        ty: IrType,
        count: u32,
    },
    Load {
        dest: Operand,
        address: Operand,
    },
    Store {
        value: Operand,
        address: Operand,
    },
    /// Address arithmetic: `dest` points at the element of `base` selected
    /// by `indices`.
    GetElementPtr {
        dest: Operand,
        base: Operand,
        indices: Vec<u32>,
    },
    /// Reinterpret a pointer as another pointer type.
    Cast {
        dest: Operand,
        value: Operand,
    },
    Arithmetic {
        op: ArithmeticOp,
        dest: Operand,
        left: Operand,
        right: Operand,
    },
    Compare {
        op: CompareOp,
        dest: Operand,
        left: Operand,
        right: Operand,
    },
    Jump(Label),
    Branch {
        condition: Operand,
        on_true: Label,
        on_false: Label,
    },
    /// Merge: `dest` takes the value paired with the block control came from.
    Phi {
        dest: Operand,
        incoming: Vec<(Operand, Label)>,
    },
    Call {
        dest: Option<Operand>,
        callee: String,
        signature: Signature,
        args: Vec<Operand>,
    },
    Return(Option<Operand>),
}

impl Instruction {
    /// The temporary this instruction defines, if any.
    pub fn dest(&self) -> Option<&Operand> {
        match self {
            Instruction::Alloca { dest, .. }
            | Instruction::Load { dest, .. }
            | Instruction::GetElementPtr { dest, .. }
            | Instruction::Cast { dest, .. }
            | Instruction::Arithmetic { dest, .. }
            | Instruction::Compare { dest, .. }
            | Instruction::Phi { dest, .. } => Some(dest),
            Instruction::Call { dest, .. } => dest.as_ref(),
            _ => None,
        }
    }

    /// Whether control never falls through to the next instruction.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Jump(_) | Instruction::Branch { .. } | Instruction::Return(_)
        )
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Instruction::Return(_))
    }

    /// Render through a template profile.
    pub fn render(&self, template: &dyn Template) -> String {
        match self {
            Instruction::DeclareStringLiteral { name, text } => {
                template.string_literal(name, text)
            }
            Instruction::DeclareStruct { name, fields } => template.struct_decl(name, fields),
            Instruction::DeclareClass(class) => template.class_decl(class),
            Instruction::DeclareExternal(decl) => template.external(decl),
            Instruction::DeclareFunction(function) => {
                let body: Vec<String> = function
                    .body
                    .iter()
                    .map(|instruction| instruction.render(template))
                    .collect();
                template.function(function, &body)
            }
            Instruction::Label(label) => template.label(*label),
            Instruction::Alloca { dest, ty, count } => template.alloca(dest, ty, *count),
            Instruction::Load { dest, address } => template.load(dest, address),
            Instruction::Store { value, address } => template.store(value, address),
            Instruction::GetElementPtr {
                dest,
                base,
                indices,
            } => template.get_element_ptr(dest, base, indices),
            Instruction::Cast { dest, value } => template.cast(dest, value),
            Instruction::Arithmetic {
                op,
                dest,
                left,
                right,
            } => template.arithmetic(*op, dest, left, right),
            Instruction::Compare {
                op,
                dest,
                left,
                right,
            } => template.compare(*op, dest, left, right),
            Instruction::Jump(label) => template.jump(*label),
            Instruction::Branch {
                condition,
                on_true,
                on_false,
            } => template.branch(condition, *on_true, *on_false),
            Instruction::Phi { dest, incoming } => template.phi(dest, incoming),
            Instruction::Call {
                dest,
                callee,
                signature,
                args,
            } => template.call(dest.as_ref(), callee, signature, args),
            Instruction::Return(value) => template.ret(value.as_ref()),
        }
    }
}

/// A named, typed member of a struct or class record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub ty: IrType,
}

/// Instance layout and dispatch record of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRecord {
    pub name: String,
    /// Flattened fields: inherited first, then own.
    pub fields: Vec<RecordField>,
    pub dispatch: DispatchRecord,
    /// Defined by the runtime; only declared here.
    pub external: bool,
}

/// The `<Class>Class` metadata record: class name, parent record, and one
/// function pointer per dispatch slot.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    /// Record type name, e.g. `ShapeClass`.
    pub name: String,
    /// Global instance name, e.g. `ShapeClassObj`.
    pub instance: String,
    /// Instance name of the parent's dispatch record.
    pub parent_instance: Option<String>,
    pub parent_record: Option<String>,
    /// Global holding the class name text.
    pub name_global: String,
    pub slots: Vec<DispatchSlot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSlot {
    /// Link name of the function filling the slot.
    pub function: String,
    pub signature: Signature,
}

/// A function defined outside the compile unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDecl {
    pub name: String,
    pub signature: Signature,
}

/// A function defined in the compile unit.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub signature: Signature,
    /// Names of the incoming arguments, receiver first.
    pub param_names: Vec<String>,
    pub body: Vec<Instruction>,
}

impl FunctionDef {
    pub fn params(&self) -> impl Iterator<Item = (&str, &IrType)> {
        self.param_names
            .iter()
            .map(String::as_str)
            .zip(self.signature.params.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations_and_terminators() {
        let dest = Operand::Temp {
            id: 0,
            ty: IrType::Bool,
        };
        let compare = Instruction::Compare {
            op: CompareOp::Lt,
            dest: dest.clone(),
            left: Operand::int(1, IrType::I32),
            right: Operand::int(2, IrType::I32),
        };
        assert_eq!(compare.dest(), Some(&dest));
        assert!(!compare.is_terminator());

        let call = Instruction::Call {
            dest: None,
            callee: "tick".into(),
            signature: Signature {
                return_type: IrType::Void,
                params: vec![],
                variadic: false,
            },
            args: vec![],
        };
        assert_eq!(call.dest(), None);
        assert!(Instruction::Jump(Label(1)).is_terminator());
        assert!(Instruction::Return(None).is_return());
    }
}
