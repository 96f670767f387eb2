//! Bytecode runtime implementation
//!
//! This module provides the execution engine for bytecode programs,
//! including the frame stack, value representation, native function bridge
//! and the instruction dispatcher.

pub mod call_stack;
pub mod config;
pub mod executor;
pub mod frame;
pub mod native;
pub mod stack;
pub mod test_utils;
pub mod value;

pub use call_stack::FrameStack;
pub use config::{Config, LocalsModel};
pub use executor::{Dispatcher, RunReport, RunStats};
pub use frame::{Frame, Locals};
pub use native::{CallContext, NativeFn, NativeFunction};
pub use stack::Stack;
pub use value::{UserDefined, Value, ValueKind};

use crate::bytecode::Program;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: ValueKind, actual: ValueKind },
    #[error("Local variable index out of bounds: {0}")]
    LocalIndexOutOfBounds(i64),
    #[error("Argument index out of bounds: {0}")]
    ArgumentIndexOutOfBounds(i64),
    #[error("Invalid jump target: {0}")]
    InvalidJumpTarget(i64),
    #[error("Invalid return address: {0}")]
    InvalidReturnAddress(i64),
    #[error("Program counter out of bounds: {0}")]
    ProgramCounterOutOfBounds(usize),
    #[error("Empty program")]
    EmptyProgram,
    #[error("Invalid argument count: {0}")]
    InvalidArgumentCount(i64),
    #[error("Argument count mismatch: expected {expected} values, {available} available")]
    ArgumentCountMismatch { expected: usize, available: usize },
    #[error("Call stack overflow: more than {0} frames")]
    CallStackOverflow(usize),
    #[error("Frame stack underflow")]
    FrameStackUnderflow,
    #[error("Step budget exhausted after {0} instructions")]
    StepBudgetExhausted(u64),
    #[error("Reserved type code: {0}")]
    ReservedTag(u16),
    #[error("Native function fault: {0}")]
    NativeFault(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Run `program` with no arguments under the default configuration
///
/// # Errors
/// Returns the fault that stopped the run
pub fn execute(program: &Program) -> Result<Value, RuntimeError> {
    Dispatcher::default().run(program, &[])
}
