// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Quire - bytecode compiler driver
//!
//! Reads programs as JSON-encoded syntax trees, compiles them and prints
//! the disassembly, or runs them on the reference VM.

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use quire_compiler::{Builtins, Bytecode, Compiler, Error, Program, SourceFile, VM, compile_batch};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Compile JSON syntax trees to stack bytecode.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about)]
struct Cli {
    /// JSON-encoded programs to compile
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Execute each program on the reference VM
    #[arg(short, long)]
    run: bool,

    /// Print the disassembly (default unless --run)
    #[arg(short, long)]
    disassemble: bool,

    /// Compile without the standard builtin globals
    #[arg(long)]
    no_builtins: bool,

    /// Abort execution after this many instructions
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "quire=debug,quire_compiler=debug"
    } else {
        "quire=warn,quire_compiler=warn"
    };
    let filter = EnvFilter::try_from_env("QUIRE_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Compiles (and optionally runs) every file. Returns whether all succeeded.
fn run(cli: &Cli) -> Result<bool> {
    let programs = cli
        .files
        .iter()
        .map(|path| load_program(path))
        .collect::<Result<Vec<_>>>()?;

    let builtins = if cli.no_builtins {
        Builtins::new()
    } else {
        Builtins::standard()
    };
    let results = compile_all(&programs, cli.no_builtins, &builtins);

    let mut ok = true;
    for ((path, program), result) in cli.files.iter().zip(&programs).zip(results) {
        let bytecode = match result {
            Ok(bytecode) => bytecode,
            Err(e) => {
                report(path, program, &e);
                ok = false;
                continue;
            }
        };

        if cli.disassemble || !cli.run {
            if cli.files.len() > 1 {
                println!("{}", format!("== {} ==", path.display()).cyan().bold());
            }
            print!("{}", bytecode);
        }

        if cli.run {
            let mut vm = VM::new(&builtins).echo(true);
            if let Some(limit) = cli.max_steps {
                vm = vm.with_step_limit(limit);
            }
            if let Err(e) = vm.execute(&bytecode) {
                eprintln!(
                    "{}: {}: {}",
                    "Runtime error".red().bold(),
                    path.display(),
                    e
                );
                ok = false;
            }
        }
    }

    Ok(ok)
}

fn load_program(path: &Path) -> Result<Program> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let program: Program = serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not a valid program", path.display()))?;
    tracing::debug!(file = %path.display(), statements = program.statements.len(), "loaded program");
    Ok(program)
}

fn compile_all(
    programs: &[Program],
    no_builtins: bool,
    builtins: &Builtins,
) -> Vec<Result<Bytecode, Error>> {
    if no_builtins {
        programs
            .iter()
            .map(|program| Compiler::new().with_builtins(builtins).compile(program))
            .collect()
    } else {
        compile_batch(programs)
    }
}

/// Prints a compile error, with source context when the program names its
/// source file.
fn report(path: &Path, program: &Program, error: &Error) {
    let rendered = match (error.diagnostic(), &program.source) {
        (Some(diagnostic), Some(source)) => match SourceFile::load(source) {
            Ok(file) => file.render(diagnostic),
            Err(_) => format!("{}: {}", source.display(), diagnostic),
        },
        _ => format!("{}: {}", path.display(), error),
    };
    eprintln!("{}: {}", "Compile error".red().bold(), rendered);
}
