//! Builtin global bindings.
//!
//! Builtins are an ordered table of `(name, default value)` pairs. The
//! compiler installs each one into a fresh slot, in table order, before any
//! user statement; the VM supplies the values. A program may shadow a builtin
//! with its own `var` declaration.

pub mod console;

use crate::runtime::function::NativeFunction;
use crate::runtime::value::Value;

/// One builtin global.
#[derive(Debug, Clone)]
pub struct Builtin {
    /// The global name
    pub name: String,
    /// The value the global starts with
    pub value: Value,
}

/// An ordered table of builtin globals.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    entries: Vec<Builtin>,
}

impl Builtins {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard globals: `print`, `true`, `false`, `null`.
    pub fn standard() -> Self {
        Self::new()
            .with("print", Value::native(NativeFunction::new("print", console::print)))
            .with("true", Value::Bool(true))
            .with("false", Value::Bool(false))
            .with("null", Value::Null)
    }

    /// Appends a global. A later entry with the same name takes precedence
    /// for name lookup, but both are still installed.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.push(name, value);
        self
    }

    /// Appends a global in place.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push(Builtin {
            name: name.into(),
            value,
        });
    }

    /// Returns the number of globals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the global at `index`.
    pub fn get(&self, index: usize) -> Option<&Builtin> {
        self.entries.get(index)
    }

    /// Iterates over the globals in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
        self.entries.iter()
    }

    /// Returns the names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|b| b.name.as_str())
    }
}
