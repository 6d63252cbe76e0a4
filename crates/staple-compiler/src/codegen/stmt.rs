//! Statement lowering.

use staple_core::InternalError;
use staple_parser::ast::{Block, IfStmt, Stmt, VarDeclStmt};

use super::function::FunctionBuilder;
use crate::ir::Instruction;

impl FunctionBuilder<'_> {
    /// Lower the statements of `block` in order. Statements after one that
    /// ends every path are unreachable and are dropped.
    pub(super) fn lower_block(&mut self, block: &Block<'_>) -> Result<(), InternalError> {
        for stmt in block.stmts {
            if self.terminated() {
                break;
            }
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt<'_>) -> Result<(), InternalError> {
        match stmt {
            Stmt::Block(block) => self.lower_block(block),
            Stmt::VarDecl(decl) => self.lower_var_decl(decl),
            Stmt::If(if_stmt) => self.lower_if(if_stmt),
            Stmt::Return(ret) => {
                let value = match ret.value {
                    Some(value) => Some(self.value(value)?),
                    None => None,
                };
                self.emit(Instruction::Return(value));
                Ok(())
            }
            Stmt::Expr(expr_stmt) => self.lower_expr(expr_stmt.expr).map(drop),
        }
    }

    fn lower_var_decl(&mut self, decl: &VarDeclStmt<'_>) -> Result<(), InternalError> {
        let symbol = self.bound_symbol(decl.id, "variable", decl.name.span)?;
        let ty = self.lower(&self.ctx.symbols.symbol_type(symbol))?;
        let slot = self.allocate(symbol, ty);
        if let Some(init) = decl.init {
            let value = self.value(init)?;
            self.emit(Instruction::Store {
                value,
                address: slot,
            });
        }
        Ok(())
    }

    /// ```text
    ///     br cond, positive, negative
    /// positive:
    ///     [then]
    ///     jump end          ; unless [then] returned
    /// negative:
    ///     [else]
    ///     jump end          ; only with an else that falls through
    /// end:                  ; only with an else
    /// ```
    ///
    /// Without an else, `negative` is where execution continues.
    fn lower_if(&mut self, if_stmt: &IfStmt<'_>) -> Result<(), InternalError> {
        let condition = self.value(if_stmt.condition)?;
        let positive = self.ids.label();
        let negative = self.ids.label();
        let end = if_stmt.else_stmt.map(|_| self.ids.label());
        let continuation = end.unwrap_or(negative);

        self.blocks.push();
        self.emit(Instruction::Label(positive));
        self.lower_stmt(if_stmt.then_stmt)?;
        let positive_falls_through = !self.terminated();
        if positive_falls_through {
            self.emit(Instruction::Jump(continuation));
        }
        let positive_block = self.blocks.pop()?;

        self.blocks.push();
        self.emit(Instruction::Label(negative));
        let mut negative_falls_through = false;
        if let (Some(else_stmt), Some(end)) = (if_stmt.else_stmt, end) {
            self.lower_stmt(else_stmt)?;
            negative_falls_through = !self.terminated();
            if negative_falls_through {
                self.emit(Instruction::Jump(end));
            }
        }
        let negative_block = self.blocks.pop()?;

        self.emit(Instruction::Branch {
            condition,
            on_true: positive,
            on_false: negative,
        });
        self.blocks.splice(positive_block);
        self.blocks.splice(negative_block);

        if let Some(end) = end
            && (positive_falls_through || negative_falls_through)
        {
            self.emit(Instruction::Label(end));
        }
        Ok(())
    }
}
