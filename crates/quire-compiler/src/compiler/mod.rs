//! Bytecode compiler.
//!
//! Lowers a parsed program into a flat instruction stream for a stack VM.
//!
//! # Module Structure
//!
//! - `bytecode`: Bytecode definitions and instructions
//! - `sink`: The instruction sink abstraction and the bytecode backend
//! - `codegen`: Code generation from AST
//!   - `codegen::scope`: Scope management for variable resolution

pub mod bytecode;
pub mod codegen;
pub mod sink;

pub use bytecode::{Bytecode, EntryPoint, Instruction, Label, OpCode, Operand, Slot};
pub use codegen::Compiler;
pub use sink::{BytecodeBuilder, InstructionSink};
