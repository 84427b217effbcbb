//! The bytecode virtual machine.
//!
//! A reference executor for compiled chunks. It dispatches every
//! `CallRuntime` through a [`RuntimeLibrary`](crate::runtime::RuntimeLibrary)
//! and takes builtin values from a [`Builtins`](crate::builtins::Builtins)
//! table, so it runs exactly what the compiler emitted.

mod interpreter;

pub use interpreter::VM;
