#![no_main]

//! Structure-aware bytecode program fuzzer
//!
//! Generates programs from structured fuzz input instead of raw bytes, so
//! most inputs reach the dispatcher with well-formed instructions and
//! exercise branches, calls and native invocations.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use stackvm::bytecode::{Instruction, OpCode, Program};
use stackvm::runtime::{CallContext, Config, Dispatcher, LocalsModel, RuntimeError, Value};

/// Configuration for a generated run
#[derive(Debug, Arbitrary)]
struct RunConfig {
    /// Number of local slots (0-15)
    locals_capacity: u8,
    /// Use isolated per-frame locals instead of the shared register file
    per_frame: bool,
    /// Maximum call depth (1-64)
    max_call_depth: u8,
    /// Instructions to generate
    instructions: Vec<Op>,
    /// Top-level arguments
    args: Vec<Literal>,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Literal {
    Null,
    Undefined,
    Integer(i64),
    Double(f64),
    Native,
    UserDefined(u16, u64),
}

/// Simplified instruction set for generation
#[derive(Debug, Clone, Copy, Arbitrary)]
enum Op {
    Push(Literal),
    Load(i8),
    Store(i8),
    Arg(i8),
    Jump(u8),
    Gosub(u8),
    Return,
    AddDoubles,
    Call(u8),
    Execute,
    Exit,
    /// Operand of the wrong variant
    Garbled(u8),
}

fn echo_count(context: &CallContext<'_>) -> Result<Value, RuntimeError> {
    Ok(Value::Integer(context.arg_count() as i64))
}

impl Literal {
    fn value(self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Undefined => Value::Undefined,
            Literal::Integer(v) => Value::Integer(v),
            Literal::Double(v) => Value::Double(v),
            Literal::Native => Value::native(echo_count),
            Literal::UserDefined(tag, data) => Value::user_defined(tag.max(2), data).unwrap_or(Value::Null),
        }
    }
}

/// Map a target byte into (mostly) the program's address space
fn target(raw: u8, len: usize) -> i64 {
    (raw as usize % (len + 2)) as i64 - 1
}

fn generate_program(ops: &[Op]) -> Program {
    let len = ops.len();
    ops.iter()
        .map(|op| match *op {
            Op::Push(literal) => Instruction::push(literal.value()),
            Op::Load(i) => Instruction::load(i64::from(i)),
            Op::Store(i) => Instruction::store(i64::from(i)),
            Op::Arg(i) => Instruction::arg(i64::from(i)),
            Op::Jump(t) => Instruction::jump(target(t, len)),
            Op::Gosub(t) => Instruction::gosub(target(t, len)),
            Op::Return => Instruction::ret(),
            Op::AddDoubles => Instruction::add_doubles(),
            Op::Call(t) => Instruction::call(target(t, len)),
            Op::Execute => Instruction::execute(),
            Op::Exit => Instruction::exit(),
            Op::Garbled(t) => Instruction::new(OpCode::Jump, Value::Double(f64::from(t))),
        })
        .collect()
}

fuzz_target!(|config: RunConfig| {
    if config.instructions.len() > 256 {
        return;
    }

    let program = generate_program(&config.instructions);
    let args: Vec<Value> = config.args.iter().map(|literal| literal.value()).collect();

    let locals_model = if config.per_frame { LocalsModel::PerFrame } else { LocalsModel::Shared };
    let dispatcher = Dispatcher::new(
        Config::new()
            .with_locals_capacity(usize::from(config.locals_capacity % 16))
            .with_locals_model(locals_model)
            .with_max_call_depth(usize::from(config.max_call_depth % 64) + 1)
            // Use a step budget to prevent infinite loops from hanging the fuzzer
            .with_max_steps(100_000),
    );

    if let Ok(report) = dispatcher.run_with_report(&program, &args) {
        assert!(report.stats.steps >= 1);
        assert!(report.stats.max_frame_depth <= dispatcher.config().max_call_depth);
    }
});
