//! A stack-based bytecode virtual machine written in Rust.
//!
//! stackvm executes programs made of fixed-shape instructions over a small
//! dynamically-typed value model. Each run owns an arena that backs its
//! frames and operand stacks; the arena is released in one go when the run
//! finishes or faults.
//!
//! # Modules
//!
//! - [`bytecode`] -- Opcodes, instructions and immutable programs.
//! - [`runtime`] -- Values, frames, the native function bridge and the dispatcher.
//!
//! # Example
//!
//! Add two doubles and return the sum:
//!
//! ```
//! use stackvm::bytecode::{Instruction, Program};
//! use stackvm::runtime::{self, Value};
//!
//! let program = Program::new(vec![
//!     Instruction::push(3.0),
//!     Instruction::push(4.0),
//!     Instruction::add_doubles(),
//!     Instruction::exit(),
//! ]);
//!
//! assert_eq!(runtime::execute(&program).unwrap(), Value::Double(7.0));
//! ```
//!
//! Native functions are plain Rust functions carried inside a [`runtime::Value`]:
//!
//! ```
//! use stackvm::bytecode::{Instruction, Program};
//! use stackvm::runtime::{CallContext, Config, Dispatcher, RuntimeError, Value};
//!
//! fn count(context: &CallContext<'_>) -> Result<Value, RuntimeError> {
//!     Ok(Value::Integer(context.arg_count() as i64))
//! }
//!
//! let program = Program::new(vec![
//!     Instruction::arg(0),
//!     Instruction::arg(1),
//!     Instruction::push(2),
//!     Instruction::push(Value::native(count)),
//!     Instruction::execute(),
//!     Instruction::exit(),
//! ]);
//!
//! let dispatcher = Dispatcher::new(Config::new().with_max_steps(1_000));
//! let args = [Value::Null, Value::Undefined];
//! assert_eq!(dispatcher.run(&program, &args).unwrap(), Value::Integer(2));
//! ```

pub mod bytecode;
pub mod runtime;
