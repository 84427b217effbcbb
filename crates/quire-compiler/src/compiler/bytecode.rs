//! Bytecode definitions.

use std::fmt;

/// A storage location for one variable binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(pub u16);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A branch target created by an instruction sink, bound to a position
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// An exported runtime operation, as resolved through a runtime library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryPoint(pub u16);

/// A compiled bytecode chunk for one entry point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bytecode {
    /// The instructions
    pub instructions: Vec<Instruction>,
    /// Number of local slots the chunk uses
    pub local_count: usize,
}

impl Bytecode {
    /// Creates a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instruction and returns its index.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        let index = self.instructions.len();
        self.instructions.push(instruction);
        index
    }

    /// Returns the number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if there are no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the opcodes in order, dropping operands.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instructions.iter().map(|i| i.opcode).collect()
    }
}

impl fmt::Display for Bytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; locals: {}", self.local_count)?;
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{:04}  {}", index, instruction)?;
        }
        Ok(())
    }
}

/// A single bytecode instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The operation code
    pub opcode: OpCode,
    /// Optional operand
    pub operand: Option<Operand>,
}

impl Instruction {
    /// Creates a new instruction with no operand.
    pub fn simple(opcode: OpCode) -> Self {
        Self {
            opcode,
            operand: None,
        }
    }

    /// Creates a new instruction with an operand.
    pub fn with_operand(opcode: OpCode, operand: Operand) -> Self {
        Self {
            opcode,
            operand: Some(operand),
        }
    }

    /// Returns the jump target, if this is a resolved branch.
    pub fn jump_target(&self) -> Option<u32> {
        match self.operand {
            Some(Operand::Jump(target)) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.opcode)?;
        match &self.operand {
            None => Ok(()),
            Some(Operand::Int(n)) => write!(f, " {}", n),
            Some(Operand::Local(slot)) => write!(f, " {}", slot),
            Some(Operand::Builtin(index)) => write!(f, " builtin#{}", index),
            Some(Operand::Count(n)) => write!(f, " {}", n),
            Some(Operand::Index(n)) => write!(f, " [{}]", n),
            Some(Operand::Entry(entry)) => write!(f, " @{}", entry.0),
            Some(Operand::Jump(target)) => write!(f, " -> {:04}", target),
        }
    }
}

/// Instruction operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// Integer literal
    Int(i32),
    /// Local slot
    Local(Slot),
    /// Index into the builtin global table
    Builtin(u16),
    /// Number of arguments
    Count(u16),
    /// Argument position
    Index(u16),
    /// Runtime operation entry point
    Entry(EntryPoint),
    /// Absolute jump target
    Jump(u32),
}

/// Operation codes for the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    // Stack operations
    /// Push a raw 32-bit integer
    LoadInt,
    /// Box the raw integer on top of the stack into a dynamic value
    BoxInt,
    /// Pop the top value
    Pop,

    // Variable operations
    /// Load a local slot
    LoadLocal,
    /// Store to a local slot
    StoreLocal,
    /// Load a builtin global's default value
    LoadBuiltin,

    // Calls
    /// Push a fresh argument collection
    NewArgs,
    /// Pop a value into the argument collection beneath it
    StoreArg,
    /// Call a runtime operation
    CallRuntime,

    // Control flow
    /// Unconditional jump
    Jump,
    /// Pop a truth value and jump if it is false
    JumpIfFalse,
    /// Return from the entry point
    Return,
}
