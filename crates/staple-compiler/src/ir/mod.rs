//! SSA-style intermediate representation.
//!
//! An instruction stream is a flat list of [`Instruction`]s. Compile-unit
//! declarations come first; each function declaration owns its body, which
//! is split into basic blocks by [`Instruction::Label`]s.
//!
//! IR values are self-describing: every operand carries its [`IrType`] and
//! every declaration carries the names it needs, so renderers work from the
//! instruction stream alone.

mod address;
mod block_stack;
mod factory;
mod instruction;
mod operand;
mod types;

pub use address::AddressDescriptor;
pub use block_stack::BlockStack;
pub use factory::IdFactory;
pub use instruction::{
    ClassRecord, DispatchRecord, DispatchSlot, ExternalDecl, FunctionDef, Instruction, RecordField,
};
pub use operand::{Label, Operand};
pub use types::{IrType, Signature};
