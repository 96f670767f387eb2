//! Native function bridge
//!
//! Native functions are plain Rust function pointers carried inside a
//! [`Value`] under the reserved native-function type code. The `Execute`
//! opcode decodes the handle with a checked downcast and invokes it with a
//! [`CallContext`] describing the arguments sitting on the caller's operand
//! stack.

use super::{RuntimeError, Value};
use bumpalo::Bump;
use std::fmt;

/// Signature of a function callable through `Execute`
pub type NativeFn = for<'a> fn(&CallContext<'a>) -> Result<Value, RuntimeError>;

/// Opaque handle to a native function.
///
/// Two handles are equal when they point at the same code address.
#[derive(Clone, Copy)]
pub struct NativeFunction(NativeFn);

impl NativeFunction {
    pub fn new(function: NativeFn) -> Self {
        NativeFunction(function)
    }

    /// Code address of the wrapped function
    pub fn addr(&self) -> usize {
        self.0 as usize
    }

    /// Call the function with the given context
    ///
    /// # Errors
    /// Propagates whatever fault the native function reports
    pub fn invoke(&self, context: &CallContext<'_>) -> Result<Value, RuntimeError> {
        (self.0)(context)
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for NativeFunction {}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({:#x})", self.addr())
    }
}

/// Everything a native function may see during one `Execute`
///
/// The argument view borrows the caller's operand stack, so it cannot
/// escape the call. Scratch memory can be taken from the run's arena.
pub struct CallContext<'a> {
    arena: &'a Bump,
    args: &'a [Value],
}

impl<'a> CallContext<'a> {
    pub fn new(arena: &'a Bump, args: &'a [Value]) -> Self {
        CallContext { arena, args }
    }

    /// The arena allocator backing the current run
    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    /// Arguments in push order (first pushed is first)
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Get a single argument
    ///
    /// # Errors
    /// Returns `ArgumentIndexOutOfBounds` if `index >= arg_count()`
    pub fn arg(&self, index: usize) -> Result<Value, RuntimeError> {
        self.args
            .get(index)
            .copied()
            .ok_or(RuntimeError::ArgumentIndexOutOfBounds(index as i64))
    }
}
