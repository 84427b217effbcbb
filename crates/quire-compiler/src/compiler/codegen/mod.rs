//! Code generation from AST to bytecode.
//!
//! This module contains the `Compiler` which lowers a parsed program into a
//! flat instruction stream for the stack VM. Lowering is split by node
//! category:
//!
//! - `statements`: statements and control flow (`if`, `while`, `switch`)
//! - `expressions`: expressions, each leaving exactly one value on the stack
//! - `scope`: name-to-slot bindings with block shadowing
//! - `resolver`: runtime operation entry points

mod expressions;
mod resolver;
mod scope;
mod statements;

#[cfg(test)]
mod tests;

pub use resolver::RuntimeResolver;
pub use scope::Scope;

use crate::ast::Program;
use crate::builtins::Builtins;
use crate::compiler::bytecode::{Instruction, OpCode, Operand};
use crate::compiler::sink::{BytecodeBuilder, InstructionSink};
use crate::error::{InternalError, Result};
use crate::runtime::{RuntimeLibrary, RuntimeOp, StandardRuntime};

static STANDARD_RUNTIME: StandardRuntime = StandardRuntime;

/// Compiles one program.
///
/// A compiler is consumed by [`Compiler::compile`], so each instance lowers
/// exactly one program and no state leaks between compilations.
pub struct Compiler<'rt, S: InstructionSink = BytecodeBuilder> {
    /// Where instructions go
    sink: S,
    /// Variable bindings
    scope: Scope,
    /// Runtime operation entry points
    runtime: RuntimeResolver<'rt>,
    /// Builtin global names, in install order
    builtins: Vec<String>,
}

impl Compiler<'static, BytecodeBuilder> {
    /// Creates a compiler emitting bytecode, with the standard runtime and
    /// the standard builtins.
    pub fn new() -> Self {
        Self::with_sink(BytecodeBuilder::new())
    }
}

impl Default for Compiler<'static, BytecodeBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: InstructionSink> Compiler<'static, S> {
    /// Creates a compiler emitting into `sink`.
    pub fn with_sink(sink: S) -> Self {
        Self {
            sink,
            scope: Scope::new(),
            runtime: RuntimeResolver::new(&STANDARD_RUNTIME),
            builtins: Builtins::standard().names().map(str::to_string).collect(),
        }
    }
}

impl<'rt, S: InstructionSink> Compiler<'rt, S> {
    /// Replaces the builtin globals installed before user code.
    pub fn with_builtins(mut self, builtins: &Builtins) -> Self {
        self.builtins = builtins.names().map(str::to_string).collect();
        self
    }

    /// Resolves runtime operations against `library` instead of the
    /// standard runtime.
    pub fn with_runtime<'a>(self, library: &'a dyn RuntimeLibrary) -> Compiler<'a, S> {
        Compiler {
            sink: self.sink,
            scope: self.scope,
            runtime: RuntimeResolver::new(library),
            builtins: self.builtins,
        }
    }

    // ========================================================================
    // Main Compilation Entry Point
    // ========================================================================

    /// Compiles a program, returning the finalized sink output.
    ///
    /// The first error aborts compilation; no partial output is returned.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn compile(mut self, program: &Program) -> Result<S::Output> {
        self.install_builtins()?;

        for statement in &program.statements {
            self.compile_statement(statement)?;
        }

        self.emit(Instruction::simple(OpCode::Return));

        let local_count = self.scope.slot_count();
        let output = self.sink.finish(local_count)?;
        tracing::debug!(local_count, "compiled program");
        Ok(output)
    }

    /// Declares every builtin in a fresh slot and loads its default value.
    fn install_builtins(&mut self) -> Result<()> {
        let names = std::mem::take(&mut self.builtins);
        for (index, name) in names.iter().enumerate() {
            let index = operand_index(index, "builtins", names.len())?;
            let slot = self.scope.declare(name)?;
            self.emit(Instruction::with_operand(
                OpCode::LoadBuiltin,
                Operand::Builtin(index),
            ));
            self.emit(Instruction::with_operand(OpCode::StoreLocal, Operand::Local(slot)));
        }
        self.builtins = names;
        Ok(())
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    fn emit(&mut self, instruction: Instruction) {
        self.sink.append(instruction);
    }

    fn emit_runtime_call(&mut self, op: RuntimeOp) -> Result<()> {
        let entry = self.runtime.resolve(op)?;
        self.emit(Instruction::with_operand(OpCode::CallRuntime, Operand::Entry(entry)));
        Ok(())
    }
}

/// Narrows an index into a 16-bit operand. `count` is the size of the
/// collection being indexed, for the error.
pub(super) fn operand_index(index: usize, what: &'static str, count: usize) -> Result<u16, InternalError> {
    u16::try_from(index).map_err(|_| InternalError::TooManyOperands { what, count })
}
