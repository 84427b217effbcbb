//! Expression compilation.
//!
//! Every expression leaves exactly one boxed value on the stack. Operands and
//! arguments are evaluated left to right and all of them are always
//! evaluated; there is no short-circuiting.

use super::{Compiler, operand_index};
use crate::ast::*;
use crate::compiler::bytecode::{Instruction, OpCode, Operand};
use crate::compiler::sink::InstructionSink;
use crate::error::{Diagnostic, ErrorKind, InternalError, Result};
use crate::runtime::RuntimeOp;

impl<S: InstructionSink> Compiler<'_, S> {
    pub(super) fn compile_expression(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Binary(bin) => self.compile_binary(bin),
            Expression::Call(call) => self.compile_call(call),
            Expression::Parentheses(parens) => self.compile_expression(&parens.inner),
            Expression::Number(lit) => self.compile_number(lit),
            Expression::Identifier(id) => self.compile_identifier(id),
            Expression::MemberAccess(member) => Err(Diagnostic::new(
                member.position,
                ErrorKind::UnsupportedFeature("member access"),
            )
            .into()),
        }
    }

    fn compile_binary(&mut self, bin: &BinaryExpression) -> Result<()> {
        self.compile_expression(&bin.left)?;
        self.compile_expression(&bin.right)?;

        let op = RuntimeOp::from_operator(&bin.operator).ok_or_else(|| {
            Diagnostic::new(bin.position, ErrorKind::UnknownOperator(bin.operator.clone()))
        })?;
        self.emit_runtime_call(op)
    }

    fn compile_call(&mut self, call: &CallExpression) -> Result<()> {
        self.compile_expression(&call.callee)?;

        let count = call.arguments.len();
        let count_operand = u16::try_from(count).map_err(|_| InternalError::TooManyOperands {
            what: "arguments",
            count,
        })?;
        self.emit(Instruction::with_operand(
            OpCode::NewArgs,
            Operand::Count(count_operand),
        ));
        for (index, arg) in call.arguments.iter().enumerate() {
            let index = operand_index(index, "arguments", count)?;
            self.compile_expression(arg)?;
            self.emit(Instruction::with_operand(OpCode::StoreArg, Operand::Index(index)));
        }

        self.emit_runtime_call(RuntimeOp::Call)
    }

    fn compile_number(&mut self, lit: &NumberLiteral) -> Result<()> {
        let value = parse_int_literal(&lit.literal).ok_or_else(|| {
            Diagnostic::new(lit.position, ErrorKind::NumberFormat(lit.literal.clone()))
        })?;
        self.emit(Instruction::with_operand(OpCode::LoadInt, Operand::Int(value)));
        self.emit(Instruction::simple(OpCode::BoxInt));
        Ok(())
    }

    fn compile_identifier(&mut self, id: &Identifier) -> Result<()> {
        let slot = self.scope.resolve(&id.name).ok_or_else(|| {
            Diagnostic::new(id.position, ErrorKind::UnknownVariable(id.name.clone()))
        })?;
        self.emit(Instruction::with_operand(OpCode::LoadLocal, Operand::Local(slot)));
        Ok(())
    }
}

/// Parses a sign-less decimal literal into the `i32` range.
fn parse_int_literal(literal: &str) -> Option<i32> {
    if literal.is_empty() || !literal.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    literal.parse().ok()
}
