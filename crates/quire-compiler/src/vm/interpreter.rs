//! Bytecode interpreter.

use crate::builtins::Builtins;
use crate::compiler::bytecode::{Bytecode, EntryPoint, Instruction, OpCode, Operand};
use crate::error::RuntimeError;
use crate::runtime::function::CallContext;
use crate::runtime::value::Value;
use crate::runtime::{RuntimeLibrary, RuntimeOp, StandardRuntime, ops};

static STANDARD_RUNTIME: StandardRuntime = StandardRuntime;

/// An evaluation stack entry.
#[derive(Debug, Clone)]
enum StackValue {
    /// Unboxed integer from `LoadInt`
    Raw(i32),
    /// Boxed dynamic value
    Boxed(Value),
    /// Primitive truth value from `ToBool`
    Truth(bool),
    /// Argument collection from `NewArgs`
    Args(Vec<Value>),
}

/// The virtual machine.
pub struct VM<'a> {
    runtime: &'a dyn RuntimeLibrary,
    builtins: &'a Builtins,
    stack: Vec<StackValue>,
    locals: Vec<Value>,
    ip: usize,
    step_limit: Option<u64>,
    context: CallContext,
}

impl<'a> VM<'a> {
    /// Creates a VM over the standard runtime and the given builtin values.
    pub fn new(builtins: &'a Builtins) -> Self {
        Self {
            runtime: &STANDARD_RUNTIME,
            builtins,
            stack: Vec::new(),
            locals: Vec::new(),
            ip: 0,
            step_limit: None,
            context: CallContext::new(),
        }
    }

    /// Dispatches runtime calls through `runtime`.
    pub fn with_runtime(mut self, runtime: &'a dyn RuntimeLibrary) -> Self {
        self.runtime = runtime;
        self
    }

    /// Aborts execution after `limit` instructions.
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Also print native output to stdout.
    pub fn echo(mut self, echo: bool) -> Self {
        self.context.echo = echo;
        self
    }

    /// Output written by natives so far.
    pub fn output(&self) -> &[String] {
        &self.context.output
    }

    /// Current value of a local slot.
    pub fn local(&self, index: usize) -> Option<&Value> {
        self.locals.get(index)
    }

    /// Executes bytecode until `Return` or the end of the stream.
    pub fn execute(&mut self, bytecode: &Bytecode) -> Result<(), RuntimeError> {
        self.ip = 0;
        self.stack.clear();
        self.locals = vec![Value::Null; bytecode.local_count];
        let mut steps: u64 = 0;

        while let Some(instruction) = bytecode.instructions.get(self.ip) {
            if let Some(limit) = self.step_limit {
                if steps >= limit {
                    return Err(RuntimeError::StepLimit(limit));
                }
            }
            steps += 1;
            self.ip += 1;

            match instruction.opcode {
                OpCode::Return => break,

                OpCode::LoadInt => {
                    let value = match instruction.operand {
                        Some(Operand::Int(n)) => n,
                        _ => return Err(bad_operand(instruction)),
                    };
                    self.stack.push(StackValue::Raw(value));
                }

                OpCode::BoxInt => match self.pop()? {
                    StackValue::Raw(n) => self.push(Value::Int(n)),
                    other => return Err(unexpected("raw integer", &other)),
                },

                OpCode::Pop => {
                    self.pop()?;
                }

                OpCode::LoadLocal => {
                    let index = local_index(instruction)?;
                    let value = self
                        .locals
                        .get(index)
                        .cloned()
                        .ok_or_else(|| RuntimeError::Malformed(format!("no local {}", index)))?;
                    self.push(value);
                }

                OpCode::StoreLocal => {
                    let index = local_index(instruction)?;
                    let value = self.pop_value()?;
                    let local = self
                        .locals
                        .get_mut(index)
                        .ok_or_else(|| RuntimeError::Malformed(format!("no local {}", index)))?;
                    *local = value;
                }

                OpCode::LoadBuiltin => {
                    let index = match instruction.operand {
                        Some(Operand::Builtin(index)) => index as usize,
                        _ => return Err(bad_operand(instruction)),
                    };
                    let builtin = self.builtins.get(index).ok_or_else(|| {
                        RuntimeError::Malformed(format!("no builtin {}", index))
                    })?;
                    self.push(builtin.value.clone());
                }

                OpCode::NewArgs => {
                    let count = match instruction.operand {
                        Some(Operand::Count(n)) => n as usize,
                        _ => return Err(bad_operand(instruction)),
                    };
                    self.stack
                        .push(StackValue::Args(vec![Value::Null; count]));
                }

                OpCode::StoreArg => {
                    let index = match instruction.operand {
                        Some(Operand::Index(n)) => n as usize,
                        _ => return Err(bad_operand(instruction)),
                    };
                    let value = self.pop_value()?;
                    match self.stack.last_mut() {
                        Some(StackValue::Args(args)) if index < args.len() => args[index] = value,
                        _ => {
                            return Err(RuntimeError::Malformed(format!(
                                "StoreArg [{}] without argument collection",
                                index
                            )));
                        }
                    }
                }

                OpCode::CallRuntime => {
                    let entry = match instruction.operand {
                        Some(Operand::Entry(entry)) => entry,
                        _ => return Err(bad_operand(instruction)),
                    };
                    self.call_runtime(entry)?;
                }

                OpCode::Jump => {
                    self.ip = jump_target(instruction)?;
                }

                OpCode::JumpIfFalse => {
                    let target = jump_target(instruction)?;
                    match self.pop()? {
                        StackValue::Truth(false) => self.ip = target,
                        StackValue::Truth(true) => {}
                        other => return Err(unexpected("truth value", &other)),
                    }
                }
            }
        }

        Ok(())
    }

    fn call_runtime(&mut self, entry: EntryPoint) -> Result<(), RuntimeError> {
        let op = self
            .runtime
            .operation(entry)
            .ok_or(RuntimeError::UnknownEntryPoint(entry.0))?;

        match op {
            RuntimeOp::ToBool => {
                let value = self.pop_value()?;
                self.stack.push(StackValue::Truth(ops::to_bool(&value)));
            }
            RuntimeOp::Call => {
                let args = match self.pop()? {
                    StackValue::Args(args) => args,
                    other => return Err(unexpected("argument collection", &other)),
                };
                let callee = self.pop_value()?;
                let result = ops::call(&mut self.context, &callee, &args)?;
                self.push(result);
            }
            op => {
                let right = self.pop_value()?;
                let left = self.pop_value()?;
                let result = ops::binary(op, &left, &right)?;
                self.push(result);
            }
        }
        Ok(())
    }

    fn push(&mut self, value: Value) {
        self.stack.push(StackValue::Boxed(value));
    }

    fn pop(&mut self) -> Result<StackValue, RuntimeError> {
        self.stack
            .pop()
            .ok_or_else(|| RuntimeError::Malformed("stack underflow".into()))
    }

    fn pop_value(&mut self) -> Result<Value, RuntimeError> {
        match self.pop()? {
            StackValue::Boxed(value) => Ok(value),
            other => Err(unexpected("boxed value", &other)),
        }
    }
}

fn local_index(instruction: &Instruction) -> Result<usize, RuntimeError> {
    match instruction.operand {
        Some(Operand::Local(slot)) => Ok(slot.0 as usize),
        _ => Err(bad_operand(instruction)),
    }
}

fn jump_target(instruction: &Instruction) -> Result<usize, RuntimeError> {
    instruction
        .jump_target()
        .map(|target| target as usize)
        .ok_or_else(|| bad_operand(instruction))
}

fn bad_operand(instruction: &Instruction) -> RuntimeError {
    RuntimeError::Malformed(format!("bad operand for {:?}", instruction.opcode))
}

fn unexpected(expected: &str, found: &StackValue) -> RuntimeError {
    RuntimeError::Malformed(format!("expected {} on stack, found {:?}", expected, found))
}
