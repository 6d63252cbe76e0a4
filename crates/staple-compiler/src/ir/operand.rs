//! Operands: the values and locations instructions refer to.

use std::fmt;

use super::IrType;

/// A basic-block entry point, unique within one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label{}", self.0)
    }
}

/// Something an instruction reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A compile-time integer or boolean constant.
    Const { value: i64, ty: IrType },
    /// A temporary produced by exactly one instruction.
    Temp { id: u32, ty: IrType },
    /// An incoming argument value, such as `self`.
    Named { name: String, ty: IrType },
    /// A compile-unit global. `ty` is the pointer type of its address.
    Global { name: String, ty: IrType },
    Label(Label),
}

impl Operand {
    pub fn int(value: i64, ty: IrType) -> Self {
        Operand::Const { value, ty }
    }

    pub fn bool(value: bool) -> Self {
        Operand::Const {
            value: value as i64,
            ty: IrType::Bool,
        }
    }

    pub fn ty(&self) -> &IrType {
        match self {
            Operand::Const { ty, .. }
            | Operand::Temp { ty, .. }
            | Operand::Named { ty, .. }
            | Operand::Global { ty, .. } => ty,
            Operand::Label(_) => &IrType::Void,
        }
    }

    pub fn is_temp(&self) -> bool {
        matches!(self, Operand::Temp { .. })
    }

    pub fn temp_id(&self) -> Option<u32> {
        match self {
            Operand::Temp { id, .. } => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Const { value, ty: IrType::Bool } => write!(f, "{}", *value != 0),
            Operand::Const { value, .. } => write!(f, "{value}"),
            Operand::Temp { id, .. } => write!(f, "t{id}"),
            Operand::Named { name, .. } => f.write_str(name),
            Operand::Global { name, .. } => write!(f, "@{name}"),
            Operand::Label(label) => write!(f, "{label}"),
        }
    }
}
