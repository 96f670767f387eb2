//! Common test utilities shared between integration tests

#![allow(dead_code)]

use stackvm::bytecode::{Instruction, Program};
use stackvm::runtime::{Config, Dispatcher, RunReport, RuntimeError, Value};

/// Run `instructions` with no arguments under the default configuration
pub fn run(instructions: Vec<Instruction>) -> Result<Value, RuntimeError> {
    stackvm::runtime::execute(&Program::new(instructions))
}

/// Run `instructions` with explicit configuration and arguments
pub fn run_with(config: Config, instructions: Vec<Instruction>, args: &[Value]) -> Result<RunReport, RuntimeError> {
    Dispatcher::new(config).run_with_report(&Program::new(instructions), args)
}

/// A chain of `levels` nested calls below the top-level frame
///
/// The innermost callee exits with `1.0` and every other level adds `1.0`
/// to what its callee returned, so the result is `levels` as a double.
/// Each caller keeps a `Null` beneath its call.
pub fn call_chain(levels: usize) -> Program {
    assert!(levels >= 1);
    let mut code = vec![
        Instruction::push(Value::Null),
        Instruction::push(0),
        Instruction::call(4),
        Instruction::exit(),
    ];
    for level in 1..levels {
        let next = (4 + 6 * level) as i64;
        code.extend([
            Instruction::push(Value::Null),
            Instruction::push(0),
            Instruction::call(next),
            Instruction::push(1.0),
            Instruction::add_doubles(),
            Instruction::exit(),
        ]);
    }
    code.extend([Instruction::push(1.0), Instruction::exit()]);
    Program::new(code)
}

/// Number of instructions a successful run of `call_chain(levels)` dispatches
pub fn call_chain_steps(levels: usize) -> u64 {
    (4 + 6 * (levels - 1) + 2) as u64
}

/// Assert that `result` is a fault whose message contains `fragment`
pub fn assert_fault<T: std::fmt::Debug>(result: Result<T, RuntimeError>, fragment: &str) {
    match result {
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(fragment),
                "Expected error containing '{}', got: '{}'",
                fragment,
                message
            );
        }
        Ok(value) => panic!("Expected error containing '{}', got {:?}", fragment, value),
    }
}
