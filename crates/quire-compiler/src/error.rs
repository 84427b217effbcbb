//! Error types for compilation and execution.

use crate::ast::Position;
use crate::compiler::bytecode::Label;
use thiserror::Error;

/// Result type for compiler operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A user-facing compile error, raised at the offending node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reference or assignment to a name with no live binding
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// Binary operator outside the supported set
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Literal that is not a sign-less 32-bit decimal integer
    #[error("cannot convert '{0}' to a 32-bit integer")]
    NumberFormat(String),

    /// Syntax the code generator has no lowering for
    #[error("{0} is not supported")]
    UnsupportedFeature(&'static str),
}

/// A compile error tied to a source position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{position}: {kind}")]
pub struct Diagnostic {
    /// Where the error was raised
    pub position: Position,
    /// What went wrong
    pub kind: ErrorKind,
}

impl Diagnostic {
    /// Creates a diagnostic at `position`.
    pub fn new(position: Position, kind: ErrorKind) -> Self {
        Self { position, kind }
    }
}

/// A broken collaborator or code generator bug. Never attributable to the
/// compiled program, so it carries no source position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    /// The runtime library does not export a required operation
    #[error("runtime operation '{0}' could not be resolved")]
    UnresolvedRuntimeOp(&'static str),

    /// A label was branched to but never bound
    #[error("label {0} was never bound")]
    UnboundLabel(Label),

    /// A label was bound a second time
    #[error("label {0} is already bound")]
    LabelRebound(Label),

    /// A label did not come from this sink
    #[error("label {0} was not created by this sink")]
    UnknownLabel(Label),

    /// The program declares more locals than a slot operand can address
    #[error("more than 65536 local slots are required")]
    TooManyLocals,

    /// An operand count or index does not fit its operand width
    #[error("{count} {what} do not fit a 16-bit operand")]
    TooManyOperands {
        /// What was being counted
        what: &'static str,
        /// How many there were
        count: usize,
    },
}

/// Errors returned by [`Compiler::compile`](crate::compiler::Compiler::compile).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The program is invalid
    #[error(transparent)]
    Compile(#[from] Diagnostic),

    /// The compiler or its environment is broken
    #[error("internal compiler error: {0}")]
    Internal(#[from] InternalError),
}

impl Error {
    /// Returns the diagnostic if this is a user-facing error.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Error::Compile(diagnostic) => Some(diagnostic),
            Error::Internal(_) => None,
        }
    }

    /// Returns the user-facing error kind, if any.
    pub fn kind(&self) -> Option<&ErrorKind> {
        self.diagnostic().map(|d| &d.kind)
    }
}

/// Errors raised while executing bytecode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Operand types not accepted by an operation
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Called value is not callable
    #[error("TypeError: {0} is not callable")]
    NotCallable(String),

    /// Integer overflow in arithmetic
    #[error("RangeError: integer overflow in {0}")]
    Overflow(&'static str),

    /// Division or remainder by zero
    #[error("RangeError: division by zero")]
    DivisionByZero,

    /// A native function failed
    #[error("{name}: {message}")]
    Native {
        /// The native function name
        name: String,
        /// The failure message
        message: String,
    },

    /// The VM popped from an empty stack or found the wrong kind of entry
    #[error("InternalError: malformed bytecode: {0}")]
    Malformed(String),

    /// The runtime library does not implement an entry point
    #[error("InternalError: unknown runtime entry point {0}")]
    UnknownEntryPoint(u16),

    /// Execution exceeded the configured step limit
    #[error("execution exceeded {0} steps")]
    StepLimit(u64),
}
