//! Statement compilation.
//!
//! | Statement | Key Operations | Notes |
//! |-----------|----------------|-------|
//! | `var` | `StoreLocal` | Initializer compiled before the new binding exists |
//! | assignment | `StoreLocal` | Target must already be declared |
//! | `if` | `ToBool`, `JumpIfFalse` | No else arm |
//! | `while` | `ToBool`, `JumpIfFalse`, `Jump` (back) | |
//! | `switch` | `Eq`, `ToBool`, `JumpIfFalse`, `Jump` | Scrutinee evaluated once |
//!
//! ## Control Flow Compilation
//!
//! ### While Loop
//!
//! ```text
//! while (condition) { body }
//!
//! loop:
//!   [condition]
//!   CallRuntime ToBool
//!   JumpIfFalse -> after
//!   [body]
//!   Jump -> loop
//! after:
//! ```
//!
//! ### Switch
//!
//! ```text
//! switch (c) { case v1: { b1 } default: { b2 } }
//!
//!   [c]
//!   StoreLocal tmp
//!   [v1]
//!   LoadLocal tmp
//!   CallRuntime Eq
//!   CallRuntime ToBool
//!   JumpIfFalse -> skip1
//!   [b1]
//!   Jump -> end
//! skip1:
//!   [b2]
//!   Jump -> end
//! end:
//! ```
//!
//! A default arm jumps to `end` unconditionally, so arms written after it
//! are never reached.

use super::Compiler;
use crate::ast::*;
use crate::compiler::bytecode::{Instruction, OpCode, Operand};
use crate::compiler::sink::InstructionSink;
use crate::error::{Diagnostic, ErrorKind, Result};
use crate::runtime::RuntimeOp;

impl<S: InstructionSink> Compiler<'_, S> {
    pub(super) fn compile_statement(&mut self, stmt: &Statement) -> Result<()> {
        match stmt {
            Statement::Expression(stmt) => {
                self.compile_expression(&stmt.expr)?;
                self.emit(Instruction::simple(OpCode::Pop));
            }
            Statement::VariableDeclaration(decl) => self.compile_variable_declaration(decl)?,
            Statement::VariableAssignment(assign) => self.compile_variable_assignment(assign)?,
            Statement::If(if_stmt) => self.compile_if_statement(if_stmt)?,
            Statement::While(while_stmt) => self.compile_while_statement(while_stmt)?,
            Statement::Switch(switch_stmt) => self.compile_switch_statement(switch_stmt)?,
        }
        Ok(())
    }

    /// Compiles a block inside its own scope frame.
    fn compile_block(&mut self, block: &Block) -> Result<()> {
        self.scope.enter_block();
        tracing::trace!(depth = self.scope.depth(), "enter block");
        for stmt in &block.statements {
            self.compile_statement(stmt)?;
        }
        self.scope.exit_block();
        tracing::trace!(depth = self.scope.depth(), "exit block");
        Ok(())
    }

    fn compile_variable_declaration(&mut self, decl: &VariableDeclaration) -> Result<()> {
        // The initializer still sees any binding the declaration shadows
        self.compile_expression(&decl.expr)?;
        let slot = self.scope.declare(&decl.name)?;
        self.emit(Instruction::with_operand(OpCode::StoreLocal, Operand::Local(slot)));
        Ok(())
    }

    fn compile_variable_assignment(&mut self, assign: &VariableAssignment) -> Result<()> {
        let slot = self.scope.resolve(&assign.name).ok_or_else(|| {
            Diagnostic::new(
                assign.position,
                ErrorKind::UnknownVariable(assign.name.clone()),
            )
        })?;
        self.compile_expression(&assign.expr)?;
        self.emit(Instruction::with_operand(OpCode::StoreLocal, Operand::Local(slot)));
        Ok(())
    }

    fn compile_if_statement(&mut self, if_stmt: &IfStatement) -> Result<()> {
        self.compile_expression(&if_stmt.condition)?;
        self.emit_runtime_call(RuntimeOp::ToBool)?;

        let after = self.sink.new_label();
        self.sink.emit_branch_if_false(after);
        self.compile_block(&if_stmt.body)?;
        self.sink.bind_label(after)?;

        Ok(())
    }

    fn compile_while_statement(&mut self, while_stmt: &WhileStatement) -> Result<()> {
        let loop_start = self.sink.new_label();
        let after = self.sink.new_label();

        self.sink.bind_label(loop_start)?;
        self.compile_expression(&while_stmt.condition)?;
        self.emit_runtime_call(RuntimeOp::ToBool)?;
        self.sink.emit_branch_if_false(after);

        self.compile_block(&while_stmt.body)?;

        self.sink.emit_jump(loop_start);
        self.sink.bind_label(after)?;

        Ok(())
    }

    fn compile_switch_statement(&mut self, switch_stmt: &SwitchStatement) -> Result<()> {
        self.compile_expression(&switch_stmt.condition)?;
        let scrutinee = self.scope.fresh_slot()?;
        self.emit(Instruction::with_operand(
            OpCode::StoreLocal,
            Operand::Local(scrutinee),
        ));

        let end = self.sink.new_label();

        for body in &switch_stmt.bodies {
            match &body.case_value {
                Some(case_value) => {
                    self.compile_expression(case_value)?;
                    self.emit(Instruction::with_operand(
                        OpCode::LoadLocal,
                        Operand::Local(scrutinee),
                    ));
                    self.emit_runtime_call(RuntimeOp::Eq)?;
                    self.emit_runtime_call(RuntimeOp::ToBool)?;

                    let skip = self.sink.new_label();
                    self.sink.emit_branch_if_false(skip);
                    self.compile_block(&body.block)?;
                    self.sink.emit_jump(end);
                    self.sink.bind_label(skip)?;
                }
                None => {
                    self.compile_block(&body.block)?;
                    self.sink.emit_jump(end);
                }
            }
        }

        self.sink.bind_label(end)?;

        Ok(())
    }
}
