//! The runtime operation ABI.
//!
//! Compiled code never implements arithmetic, comparison, truthiness or
//! invocation itself. It calls named entry points exported by a
//! [`RuntimeLibrary`], resolved by name at compile time.

use crate::compiler::bytecode::EntryPoint;
use std::fmt;

/// The closed set of runtime operations compiled code may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
    /// `a % b`
    Rem,
    /// `a < b`
    Lt,
    /// `a == b`
    Eq,
    /// Coerce a value to a primitive truth value for branching
    ToBool,
    /// Invoke a callable with an argument collection
    Call,
}

impl RuntimeOp {
    /// Every operation, in export order.
    pub const ALL: [RuntimeOp; 9] = [
        RuntimeOp::Add,
        RuntimeOp::Sub,
        RuntimeOp::Mul,
        RuntimeOp::Div,
        RuntimeOp::Rem,
        RuntimeOp::Lt,
        RuntimeOp::Eq,
        RuntimeOp::ToBool,
        RuntimeOp::Call,
    ];

    /// The exported entry point name.
    pub fn name(self) -> &'static str {
        match self {
            RuntimeOp::Add => "Add",
            RuntimeOp::Sub => "Sub",
            RuntimeOp::Mul => "Mul",
            RuntimeOp::Div => "Div",
            RuntimeOp::Rem => "Rem",
            RuntimeOp::Lt => "Lt",
            RuntimeOp::Eq => "Eq",
            RuntimeOp::ToBool => "ToBool",
            RuntimeOp::Call => "Call",
        }
    }

    /// Maps binary operator text to its operation.
    pub fn from_operator(operator: &str) -> Option<RuntimeOp> {
        match operator {
            "+" => Some(RuntimeOp::Add),
            "-" => Some(RuntimeOp::Sub),
            "*" => Some(RuntimeOp::Mul),
            "/" => Some(RuntimeOp::Div),
            "%" => Some(RuntimeOp::Rem),
            "<" => Some(RuntimeOp::Lt),
            "==" => Some(RuntimeOp::Eq),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A library exporting runtime operation entry points.
pub trait RuntimeLibrary: Send + Sync {
    /// Looks up an exported entry point by name.
    fn lookup(&self, name: &str) -> Option<EntryPoint>;

    /// Returns the operation behind an entry point.
    fn operation(&self, entry: EntryPoint) -> Option<RuntimeOp>;
}

/// The standard library, exporting every [`RuntimeOp`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRuntime;

impl RuntimeLibrary for StandardRuntime {
    fn lookup(&self, name: &str) -> Option<EntryPoint> {
        RuntimeOp::ALL
            .iter()
            .position(|op| op.name() == name)
            .map(|index| EntryPoint(index as u16))
    }

    fn operation(&self, entry: EntryPoint) -> Option<RuntimeOp> {
        RuntimeOp::ALL.get(entry.0 as usize).copied()
    }
}
