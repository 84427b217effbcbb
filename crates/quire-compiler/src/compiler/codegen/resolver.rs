//! Resolution of runtime operations to entry points.

use crate::compiler::bytecode::EntryPoint;
use crate::error::InternalError;
use crate::runtime::{RuntimeLibrary, RuntimeOp};
use rustc_hash::FxHashMap;

/// Resolves each [`RuntimeOp`] against a runtime library, at most once per
/// compilation.
pub struct RuntimeResolver<'rt> {
    library: &'rt dyn RuntimeLibrary,
    resolved: FxHashMap<RuntimeOp, EntryPoint>,
}

impl<'rt> RuntimeResolver<'rt> {
    /// Creates a resolver over `library`.
    pub fn new(library: &'rt dyn RuntimeLibrary) -> Self {
        Self {
            library,
            resolved: FxHashMap::default(),
        }
    }

    /// Returns the entry point exported for `op`.
    pub fn resolve(&mut self, op: RuntimeOp) -> Result<EntryPoint, InternalError> {
        if let Some(entry) = self.resolved.get(&op) {
            return Ok(*entry);
        }
        let entry = self
            .library
            .lookup(op.name())
            .ok_or(InternalError::UnresolvedRuntimeOp(op.name()))?;
        self.resolved.insert(op, entry);
        Ok(entry)
    }
}
