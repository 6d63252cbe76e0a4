//! IR types.

use std::fmt;

/// The storage type of an IR value.
///
/// Unlike [`staple_core::Type`], records are referred to by name so the IR
/// can be rendered without the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    Bool,
    Int { bits: u32, signed: bool },
    Pointer(Box<IrType>),
    Array(Box<IrType>, u32),
    /// A named struct or class instance record.
    Record(String),
}

impl IrType {
    pub const I8: IrType = IrType::Int {
        bits: 8,
        signed: true,
    };
    pub const I32: IrType = IrType::Int {
        bits: 32,
        signed: true,
    };

    pub fn pointer_to(base: IrType) -> IrType {
        IrType::Pointer(Box::new(base))
    }

    pub fn pointee(&self) -> Option<&IrType> {
        match self {
            IrType::Pointer(base) => Some(base),
            _ => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, IrType::Int { signed: true, .. })
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => f.write_str("void"),
            IrType::Bool => f.write_str("bool"),
            IrType::Int { bits, signed: true } => write!(f, "int{bits}"),
            IrType::Int { bits, signed: false } => write!(f, "uint{bits}"),
            IrType::Pointer(base) => write!(f, "{base}*"),
            IrType::Array(base, len) => write!(f, "{base}[{len}]"),
            IrType::Record(name) => f.write_str(name),
        }
    }
}

/// Type of a callable: what it returns and what it takes.
///
/// Member functions list their receiver as the first parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub return_type: IrType,
    pub params: Vec<IrType>,
    pub variadic: bool,
}
