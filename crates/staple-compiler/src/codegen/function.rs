//! Lowering of one function body.
//!
//! A [`FunctionBuilder`] owns everything scoped to one function: the
//! instruction list stack, the address descriptor and the temporary and
//! label counters. Nothing carries over between functions.

use staple_core::{InternalError, NodeId, SELF_NAME, Span, SymbolId, Type};
use staple_parser::ast::Block;
use tracing::trace;

use super::lower::{self, lower_type};
use crate::context::CompilationContext;
use crate::ir::{
    AddressDescriptor, BlockStack, FunctionDef, IdFactory, Instruction, IrType, Label, Operand,
};

pub(super) struct FunctionBuilder<'a> {
    pub(super) ctx: &'a CompilationContext,
    pub(super) name: String,
    /// Declaring class of a member function.
    pub(super) owner: Option<SymbolId>,
    pub(super) blocks: BlockStack,
    pub(super) addresses: AddressDescriptor,
    pub(super) ids: IdFactory,
    /// Label of the basic block being filled.
    pub(super) current_label: Option<Label>,
}

impl<'a> FunctionBuilder<'a> {
    pub(super) fn new(ctx: &'a CompilationContext, function: SymbolId) -> Self {
        let (name, owner) = match ctx.symbols.function(function) {
            Some(entry) => (entry.link_name.clone(), entry.owner),
            None => (ctx.symbols.name(function).to_string(), None),
        };
        Self {
            ctx,
            blocks: BlockStack::new(name.clone()),
            addresses: AddressDescriptor::new(name.clone()),
            ids: IdFactory::new(),
            current_label: None,
            name,
            owner,
        }
    }

    /// Lower `function`. Implicit functions have no body and only return.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn build(
        mut self,
        function: SymbolId,
        body: Option<&Block<'_>>,
    ) -> Result<FunctionDef, InternalError> {
        let (signature, param_names) = lower::signature(&self.ctx.symbols, function)?;

        if let Some(body) = body {
            self.bind_arguments(function)?;
            self.lower_block(body)?;
        }
        if !self.terminated() {
            if !signature.return_type.is_void() {
                return Err(InternalError::invariant(format!(
                    "function '{}' falls off its end without a return value",
                    self.name
                )));
            }
            self.emit(Instruction::Return(None));
        }

        trace!(
            function = %self.name,
            temps = self.ids.temps_issued(),
            "lowered function"
        );
        let name = self.name;
        Ok(FunctionDef {
            name,
            signature,
            param_names,
            body: self.blocks.finish()?,
        })
    }

    /// Give every value-typed argument a stack slot holding its incoming
    /// value. Pointer-typed arguments are read directly.
    fn bind_arguments(&mut self, function: SymbolId) -> Result<(), InternalError> {
        for arg in lower::arguments(&self.ctx.symbols, function) {
            let ty = self.ctx.symbols.symbol_type(arg);
            if ty.is_pointer() {
                continue;
            }
            let ty = self.lower(&ty)?;
            let incoming = Operand::Named {
                name: self.ctx.symbols.name(arg).to_string(),
                ty: ty.clone(),
            };
            let slot = self.allocate(arg, ty);
            self.emit(Instruction::Store {
                value: incoming,
                address: slot,
            });
        }
        Ok(())
    }

    // =========================================
    // Emission helpers
    // =========================================

    pub(super) fn emit(&mut self, instruction: Instruction) {
        if let Instruction::Label(label) = instruction {
            self.current_label = Some(label);
        }
        self.blocks.emit(instruction);
    }

    /// Whether the list being filled ends in a terminator, making anything
    /// emitted after it unreachable.
    pub(super) fn terminated(&self) -> bool {
        self.blocks.last().is_some_and(Instruction::is_terminator)
    }

    pub(super) fn lower(&self, ty: &Type) -> Result<IrType, InternalError> {
        lower_type(&self.ctx.symbols, ty)
    }

    /// Stack storage for one value of `ty`, recorded as `symbol`'s address.
    pub(super) fn allocate(&mut self, symbol: SymbolId, ty: IrType) -> Operand {
        let dest = self.ids.temp(IrType::pointer_to(ty.clone()));
        self.emit(Instruction::Alloca {
            dest: dest.clone(),
            ty,
            count: 1,
        });
        self.addresses.record(symbol, dest.clone());
        dest
    }

    /// The incoming receiver of a member function.
    pub(super) fn receiver(&self, span: Span) -> Result<Operand, InternalError> {
        let owner = self.owner.ok_or(InternalError::UnboundNode {
            what: "receiver",
            span,
        })?;
        Ok(Operand::Named {
            name: SELF_NAME.to_string(),
            ty: lower::receiver_type(&self.ctx.symbols, owner),
        })
    }

    /// The symbol resolution bound to `node`.
    pub(super) fn bound_symbol(
        &self,
        node: NodeId,
        what: &'static str,
        span: Span,
    ) -> Result<SymbolId, InternalError> {
        self.ctx
            .bindings
            .symbol(node)
            .ok_or(InternalError::UnboundNode { what, span })
    }

    pub(super) fn current_label(&self) -> Result<Label, InternalError> {
        self.current_label.ok_or_else(|| {
            InternalError::invariant(format!(
                "no open basic block in function '{}'",
                self.name
            ))
        })
    }
}
