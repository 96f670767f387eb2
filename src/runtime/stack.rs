//! Operand stack implementation
//!
//! Each frame owns one operand stack. Storage comes from the run's arena so
//! tearing down a run releases every stack at once.

use super::{RuntimeError, Value};
use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;

/// The operand stack of a single frame
#[derive(Debug)]
pub struct Stack<'bump> {
    values: BumpVec<'bump, Value>,
}

impl<'bump> Stack<'bump> {
    /// Create a new empty stack in `arena`
    pub fn new_in(arena: &'bump Bump) -> Self {
        Stack {
            values: BumpVec::new_in(arena),
        }
    }

    /// Create a stack seeded with `values`, bottom first
    pub fn from_slice_in(values: &[Value], arena: &'bump Bump) -> Self {
        let mut stack = Stack {
            values: BumpVec::with_capacity_in(values.len(), arena),
        };
        stack.values.extend_from_slice(values);
        stack
    }

    /// Replace the contents with `values`, keeping the allocation
    pub fn reset(&mut self, values: &[Value]) {
        self.values.clear();
        self.values.extend_from_slice(values);
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.values.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Pop an integer value
    pub fn pop_integer(&mut self) -> Result<i64, RuntimeError> {
        self.pop()?.try_integer()
    }

    /// Pop a double value
    pub fn pop_double(&mut self) -> Result<f64, RuntimeError> {
        self.pop()?.try_double()
    }

    /// Peek at the top value without popping
    pub fn peek(&self) -> Result<&Value, RuntimeError> {
        self.values.last().ok_or(RuntimeError::StackUnderflow)
    }

    /// Fail with `StackUnderflow` unless at least `count` values are present
    pub fn require(&self, count: usize) -> Result<(), RuntimeError> {
        if self.values.len() < count {
            return Err(RuntimeError::StackUnderflow);
        }
        Ok(())
    }

    /// The topmost `count` values, bottom first
    pub fn top(&self, count: usize) -> Result<&[Value], RuntimeError> {
        self.require(count)?;
        Ok(&self.values[self.values.len() - count..])
    }

    /// Remove the topmost `count` values
    pub fn discard(&mut self, count: usize) -> Result<(), RuntimeError> {
        self.require(count)?;
        let len = self.values.len();
        self.values.truncate(len - count);
        Ok(())
    }

    /// Get the current stack depth
    pub fn depth(&self) -> usize {
        self.values.len()
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values, bottom first
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }
}
