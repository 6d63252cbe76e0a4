//! Per-function counters for temporaries and labels.

use super::{IrType, Label, Operand};

/// Issues fresh temporaries and labels. Create one per function so
/// numbering restarts at zero.
#[derive(Debug, Default)]
pub struct IdFactory {
    next_temp: u32,
    next_label: u32,
}

impl IdFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temp(&mut self, ty: IrType) -> Operand {
        let id = self.next_temp;
        self.next_temp += 1;
        Operand::Temp { id, ty }
    }

    pub fn label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    pub fn temps_issued(&self) -> u32 {
        self.next_temp
    }
}
