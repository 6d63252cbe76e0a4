//! Stack of instruction lists used while lowering nested control flow.
//!
//! The bottom list is the function body. Lowering a control region pushes a
//! fresh list, fills it, pops it and splices it back where it belongs.

use staple_core::InternalError;

use super::Instruction;

#[derive(Debug)]
pub struct BlockStack {
    function: String,
    lists: Vec<Vec<Instruction>>,
}

impl BlockStack {
    /// A stack holding the (empty) body of `function`.
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            lists: vec![Vec::new()],
        }
    }

    pub fn push(&mut self) {
        self.lists.push(Vec::new());
    }

    /// Pop a nested list. The function body itself cannot be popped.
    pub fn pop(&mut self) -> Result<Vec<Instruction>, InternalError> {
        if self.lists.len() < 2 {
            return Err(self.underflow());
        }
        self.lists.pop().ok_or_else(|| self.underflow())
    }

    pub fn emit(&mut self, instruction: Instruction) {
        if let Some(list) = self.lists.last_mut() {
            list.push(instruction);
        }
    }

    pub fn splice(&mut self, instructions: Vec<Instruction>) {
        if let Some(list) = self.lists.last_mut() {
            list.extend(instructions);
        }
    }

    /// Last instruction of the list being filled.
    pub fn last(&self) -> Option<&Instruction> {
        self.lists.last().and_then(|list| list.last())
    }

    pub fn depth(&self) -> usize {
        self.lists.len()
    }

    /// The finished body. Fails if a nested list was left open.
    pub fn finish(mut self) -> Result<Vec<Instruction>, InternalError> {
        if self.lists.len() != 1 {
            return Err(InternalError::invariant(format!(
                "{} instruction lists left open in function '{}'",
                self.lists.len() - 1,
                self.function
            )));
        }
        self.lists.pop().ok_or_else(|| self.underflow())
    }

    fn underflow(&self) -> InternalError {
        InternalError::BlockStackUnderflow {
            function: self.function.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Label;

    #[test]
    fn nested_lists_splice_back_in_order() {
        let mut blocks = BlockStack::new("main");
        blocks.emit(Instruction::Label(Label(0)));
        blocks.push();
        blocks.emit(Instruction::Label(Label(1)));
        blocks.emit(Instruction::Return(None));
        assert_eq!(blocks.depth(), 2);
        assert!(blocks.last().is_some_and(Instruction::is_return));

        let nested = blocks.pop().unwrap();
        blocks.splice(nested);
        assert_eq!(
            blocks.finish().unwrap(),
            vec![
                Instruction::Label(Label(0)),
                Instruction::Label(Label(1)),
                Instruction::Return(None)
            ]
        );
    }

    #[test]
    fn body_cannot_be_popped() {
        let mut blocks = BlockStack::new("main");
        assert_eq!(
            blocks.pop().unwrap_err(),
            InternalError::BlockStackUnderflow {
                function: "main".into()
            }
        );
    }

    #[test]
    fn open_lists_fail_finish() {
        let mut blocks = BlockStack::new("main");
        blocks.push();
        assert!(blocks.finish().is_err());
    }
}
