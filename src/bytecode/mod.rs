//! Bytecode representation
//!
//! A [`Program`] is an immutable sequence of [`Instruction`]s. Each
//! instruction is an [`OpCode`] plus a single operand [`Value`](crate::runtime::Value)
//! whose required variant depends on the opcode.

pub mod instruction;
pub mod program;

pub use instruction::{Instruction, OpCode};
pub use program::Program;
