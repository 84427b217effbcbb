// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # quire-compiler
//!
//! A code generator for a small dynamically-typed scripting language,
//! lowering a parsed syntax tree to bytecode for a stack VM.
//!
//! ## Overview
//!
//! This crate provides:
//! - AST definitions, exchangeable as JSON with an external parser
//! - The code generator, with block scoping and control-flow lowering
//! - An instruction sink abstraction with a bytecode backend
//! - The runtime operation ABI and a reference implementation of it
//! - Builtin global bindings
//! - A reference VM for executing compiled chunks
//!
//! ## Quick Start
//!
//! ```rust
//! use quire_compiler::ast::build::*;
//! use quire_compiler::{Builtins, Compiler, VM};
//!
//! let program = program(vec![
//!     var("x", num("40")),
//!     expr(call(ident("print"), vec![binary(ident("x"), "+", num("2"))])),
//! ]);
//!
//! let bytecode = Compiler::new().compile(&program)?;
//! let builtins = Builtins::standard();
//! let mut vm = VM::new(&builtins);
//! vm.execute(&bytecode)?;
//! assert_eq!(vm.output(), ["42"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod builtins;
pub mod compiler;
pub mod error;
pub mod runtime;
pub mod source;
pub mod vm;

// Re-exports for convenience
pub use ast::{Position, Program};
pub use builtins::Builtins;
pub use compiler::{Bytecode, Compiler, InstructionSink};
pub use error::{Diagnostic, Error, ErrorKind, InternalError, RuntimeError};
pub use runtime::{RuntimeLibrary, RuntimeOp, StandardRuntime, Value};
pub use source::SourceFile;
pub use vm::VM;

/// Compiles independent programs, one compiler instance each.
///
/// Runs in parallel when the `parallel` feature is enabled. Results are in
/// input order.
pub fn compile_batch(programs: &[Program]) -> Vec<Result<Bytecode, Error>> {
    tracing::debug!(programs = programs.len(), "compiling batch");

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        programs
            .par_iter()
            .map(|program| Compiler::new().compile(program))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        programs
            .iter()
            .map(|program| Compiler::new().compile(program))
            .collect()
    }
}
