//! Scope management for variable resolution during compilation.
//!
//! There is a single binding table mapping each visible name to its slot.
//! Entering a block pushes a frame; the first declaration of a name inside
//! that block records the binding it shadows (or its absence). Exiting the
//! block pops the frame and undoes those records in reverse order, so the
//! table ends up exactly as it was before the block.

use crate::compiler::bytecode::Slot;
use crate::error::InternalError;
use rustc_hash::{FxHashMap, FxHashSet};

/// Bindings shadowed within one block.
#[derive(Debug, Default)]
struct Frame {
    /// `(name, previous binding)` in first-shadow order
    shadowed: Vec<(String, Option<Slot>)>,
    /// Names already recorded in `shadowed`
    seen: FxHashSet<String>,
}

/// Name-to-slot bindings plus the block frame stack.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<String, Slot>,
    frames: Vec<Frame>,
    slot_count: u32,
}

impl Scope {
    /// Creates a new scope with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a block.
    pub fn enter_block(&mut self) {
        self.frames.push(Frame::default());
    }

    /// End the current block, restoring every binding it shadowed.
    pub fn exit_block(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        for (name, previous) in frame.shadowed.into_iter().rev() {
            match previous {
                Some(slot) => {
                    self.bindings.insert(name, slot);
                }
                None => {
                    self.bindings.remove(&name);
                }
            }
        }
    }

    /// Allocates a slot with no name bound to it.
    ///
    /// Fails once every slot index is taken; slots are never reused.
    pub fn fresh_slot(&mut self) -> Result<Slot, InternalError> {
        let index = u16::try_from(self.slot_count).map_err(|_| InternalError::TooManyLocals)?;
        self.slot_count += 1;
        Ok(Slot(index))
    }

    /// Declare `name` in a fresh slot, shadowing any current binding.
    pub fn declare(&mut self, name: &str) -> Result<Slot, InternalError> {
        let slot = self.fresh_slot()?;
        if let Some(frame) = self.frames.last_mut() {
            if frame.seen.insert(name.to_string()) {
                let previous = self.bindings.get(name).copied();
                frame.shadowed.push((name.to_string(), previous));
            }
        }
        self.bindings.insert(name.to_string(), slot);
        Ok(slot)
    }

    /// Resolve a variable by name, returning its slot.
    pub fn resolve(&self, name: &str) -> Option<Slot> {
        self.bindings.get(name).copied()
    }

    /// Number of slots allocated so far.
    pub fn slot_count(&self) -> usize {
        self.slot_count as usize
    }

    /// Current block nesting depth (0 = top level).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
