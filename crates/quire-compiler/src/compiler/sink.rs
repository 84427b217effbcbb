//! Instruction sinks.
//!
//! The code generator only ever talks to an [`InstructionSink`]: it appends
//! instructions, creates labels, binds them, and emits branches against them.
//! [`BytecodeBuilder`] is the backend that turns those calls into a resolved
//! [`Bytecode`] chunk. Other targets implement the same trait.

use crate::compiler::bytecode::{Bytecode, Instruction, Label, OpCode, Operand};
use crate::error::InternalError;

/// Destination for emitted instructions.
pub trait InstructionSink {
    /// The finalized output.
    type Output;

    /// Appends a non-branch instruction.
    fn append(&mut self, instruction: Instruction);

    /// Creates an unbound label.
    fn new_label(&mut self) -> Label;

    /// Binds `label` to the current position. Branches emitted before or
    /// after this call resolve to it.
    fn bind_label(&mut self, label: Label) -> Result<(), InternalError>;

    /// Emits a branch taken when the truth value on the stack is false.
    fn emit_branch_if_false(&mut self, label: Label);

    /// Emits an unconditional branch.
    fn emit_jump(&mut self, label: Label);

    /// Resolves every branch and returns the output. Fails if any label
    /// was never bound.
    fn finish(self, local_count: usize) -> Result<Self::Output, InternalError>;
}

/// Builds a [`Bytecode`] chunk, patching branch targets on finish.
#[derive(Debug, Default)]
pub struct BytecodeBuilder {
    bytecode: Bytecode,
    /// Bound position of each label, indexed by label id
    labels: Vec<Option<u32>>,
    /// Branch instructions awaiting their label's position
    fixups: Vec<(usize, Label)>,
}

impl BytecodeBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn emit_branch(&mut self, opcode: OpCode, label: Label) {
        // Placeholder target, patched in `finish`
        let index = self
            .bytecode
            .emit(Instruction::with_operand(opcode, Operand::Jump(0)));
        self.fixups.push((index, label));
    }
}

impl InstructionSink for BytecodeBuilder {
    type Output = Bytecode;

    fn append(&mut self, instruction: Instruction) {
        self.bytecode.emit(instruction);
    }

    fn new_label(&mut self) -> Label {
        let label = Label(self.labels.len() as u32);
        self.labels.push(None);
        label
    }

    fn bind_label(&mut self, label: Label) -> Result<(), InternalError> {
        let position = self.bytecode.len() as u32;
        let entry = self
            .labels
            .get_mut(label.0 as usize)
            .ok_or(InternalError::UnknownLabel(label))?;
        if entry.is_some() {
            return Err(InternalError::LabelRebound(label));
        }
        *entry = Some(position);
        tracing::trace!(%label, position, "bound label");
        Ok(())
    }

    fn emit_branch_if_false(&mut self, label: Label) {
        self.emit_branch(OpCode::JumpIfFalse, label);
    }

    fn emit_jump(&mut self, label: Label) {
        self.emit_branch(OpCode::Jump, label);
    }

    fn finish(mut self, local_count: usize) -> Result<Bytecode, InternalError> {
        if let Some(index) = self.labels.iter().position(Option::is_none) {
            return Err(InternalError::UnboundLabel(Label(index as u32)));
        }
        let patched = self.fixups.len();
        for (index, label) in self.fixups {
            let target = self
                .labels
                .get(label.0 as usize)
                .copied()
                .flatten()
                .ok_or(InternalError::UnknownLabel(label))?;
            self.bytecode.instructions[index].operand = Some(Operand::Jump(target));
        }
        self.bytecode.local_count = local_count;
        tracing::debug!(
            instructions = self.bytecode.len(),
            patched,
            "finished bytecode"
        );
        Ok(self.bytecode)
    }
}
