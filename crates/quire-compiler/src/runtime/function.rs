//! Native (Rust) callables.

use super::value::Value;
use crate::error::RuntimeError;

/// Signature of a native function body.
pub type NativeFn =
    dyn Fn(&mut CallContext, &[Value]) -> Result<Value, RuntimeError> + Send + Sync;

/// A named native function.
pub struct NativeFunction {
    name: String,
    func: Box<NativeFn>,
}

impl NativeFunction {
    /// Creates a native function.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// Returns the function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the function.
    pub fn call(&self, ctx: &mut CallContext, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.func)(ctx, args)
    }
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// Host state visible to native functions during a call.
#[derive(Debug, Default)]
pub struct CallContext {
    /// Lines written by natives, in order
    pub output: Vec<String>,
    /// Also write each line to stdout
    pub echo: bool,
}

impl CallContext {
    /// Creates a context that only captures output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a line of output.
    pub fn write_line(&mut self, line: String) {
        if self.echo {
            println!("{}", line);
        }
        self.output.push(line);
    }
}
