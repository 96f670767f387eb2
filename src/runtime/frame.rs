//! Activation records
//!
//! A frame holds the operand stack, the locals region, the read-only
//! argument view and the program counter of one invocation.

use super::{stack::Stack, RuntimeError, Value};
use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;

/// Fixed-capacity indexed local storage
///
/// Slots start out `Undefined`. Under the shared locals model one `Locals`
/// serves the whole run as a register file; under the per-frame model every
/// frame gets its own.
#[derive(Debug)]
pub struct Locals<'bump> {
    slots: &'bump mut [Value],
}

impl<'bump> Locals<'bump> {
    pub fn new_in(capacity: usize, arena: &'bump Bump) -> Self {
        Locals {
            slots: arena.alloc_slice_fill_copy(capacity, Value::Undefined),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Read the local at `index`
    ///
    /// # Errors
    /// Returns `LocalIndexOutOfBounds` for negative or too-large indices
    pub fn load(&self, index: i64) -> Result<Value, RuntimeError> {
        let slot = self.slot(index)?;
        Ok(self.slots[slot])
    }

    /// Overwrite the local at `index`
    ///
    /// # Errors
    /// Returns `LocalIndexOutOfBounds` for negative or too-large indices
    pub fn store(&mut self, index: i64, value: Value) -> Result<(), RuntimeError> {
        let slot = self.slot(index)?;
        self.slots[slot] = value;
        Ok(())
    }

    pub fn as_slice(&self) -> &[Value] {
        &*self.slots
    }

    /// Set every slot back to `Undefined`
    pub fn reset(&mut self) {
        self.slots.fill(Value::Undefined);
    }

    fn slot(&self, index: i64) -> Result<usize, RuntimeError> {
        usize::try_from(index)
            .ok()
            .filter(|slot| *slot < self.slots.len())
            .ok_or(RuntimeError::LocalIndexOutOfBounds(index))
    }
}

/// Call frame for one invocation
#[derive(Debug)]
pub struct Frame<'bump> {
    stack: Stack<'bump>,
    locals: Locals<'bump>,
    arguments: BumpVec<'bump, Value>,
    pc: usize,
}

impl<'bump> Frame<'bump> {
    /// Create a frame starting at `pc` whose operand stack is seeded with
    /// `initial_stack`
    pub fn new_in(
        initial_stack: &[Value],
        arguments: &[Value],
        locals: Locals<'bump>,
        pc: usize,
        arena: &'bump Bump,
    ) -> Self {
        let mut argument_view = BumpVec::with_capacity_in(arguments.len(), arena);
        argument_view.extend_from_slice(arguments);
        Frame {
            stack: Stack::from_slice_in(initial_stack, arena),
            locals,
            arguments: argument_view,
            pc,
        }
    }

    /// Reinitialise a spent frame for a new call, reusing its storage
    ///
    /// The operand stack and argument view both become `arguments`, every
    /// local is `Undefined` again and execution starts at `pc`.
    pub fn enter(&mut self, arguments: &[Value], pc: usize) {
        self.stack.reset(arguments);
        self.arguments.clear();
        self.arguments.extend_from_slice(arguments);
        self.locals.reset();
        self.pc = pc;
    }

    pub fn stack(&self) -> &Stack<'bump> {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut Stack<'bump> {
        &mut self.stack
    }

    pub fn locals(&self) -> &Locals<'bump> {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut Locals<'bump> {
        &mut self.locals
    }

    /// The argument view bound when the frame was created
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Read one argument
    ///
    /// # Errors
    /// Returns `ArgumentIndexOutOfBounds` for negative or too-large indices
    pub fn argument(&self, index: i64) -> Result<Value, RuntimeError> {
        usize::try_from(index)
            .ok()
            .and_then(|slot| self.arguments.get(slot))
            .copied()
            .ok_or(RuntimeError::ArgumentIndexOutOfBounds(index))
    }

    /// Index of the next instruction this frame will execute
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Move the program counter to the next instruction
    pub fn advance(&mut self) {
        self.pc += 1;
    }

    /// Move the program counter to `index`
    pub fn jump(&mut self, index: usize) {
        self.pc = index;
    }
}

impl PartialEq for Frame<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.pc == other.pc
            && self.arguments() == other.arguments()
            && self.locals.as_slice() == other.locals.as_slice()
            && self.stack.as_slice() == other.stack.as_slice()
    }
}
