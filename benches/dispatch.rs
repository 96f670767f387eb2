//! Dispatch benchmarks for the bytecode interpreter.
//!
//! These benchmarks measure raw instruction dispatch, frame push/pop cost
//! and native function calls.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use stackvm::bytecode::{Instruction, Program};
use stackvm::runtime::{CallContext, Config, Dispatcher, RuntimeError, Value};
use std::hint::black_box;

/// `1.0 + 1.0 + ...` unrolled into `n` additions
fn straight_line(n: usize) -> Program {
    let mut code = vec![Instruction::push(1.0)];
    for _ in 0..n {
        code.push(Instruction::push(1.0));
        code.push(Instruction::add_doubles());
    }
    code.push(Instruction::exit());
    Program::new(code)
}

/// `levels` nested calls, each adding 1.0 to its callee's result
fn call_chain(levels: usize) -> Program {
    let mut code = vec![
        Instruction::push(Value::Null),
        Instruction::push(0),
        Instruction::call(4),
        Instruction::exit(),
    ];
    for level in 1..levels {
        code.extend([
            Instruction::push(Value::Null),
            Instruction::push(0),
            Instruction::call((4 + 6 * level) as i64),
            Instruction::push(1.0),
            Instruction::add_doubles(),
            Instruction::exit(),
        ]);
    }
    code.extend([Instruction::push(1.0), Instruction::exit()]);
    Program::new(code)
}

fn sum_doubles(context: &CallContext<'_>) -> Result<Value, RuntimeError> {
    let mut total = 0.0;
    for value in context.args() {
        total += value.try_double()?;
    }
    Ok(Value::Double(total))
}

/// `n` native calls, each summing the running total with 1.0
fn native_calls(n: usize) -> Program {
    let mut code = vec![Instruction::push(0.0)];
    for _ in 0..n {
        code.extend([
            Instruction::push(1.0),
            Instruction::push(2),
            Instruction::push(Value::native(sum_doubles)),
            Instruction::execute(),
        ]);
    }
    code.push(Instruction::exit());
    Program::new(code)
}

/// Verify programs before benchmarking
fn verify_programs() {
    let dispatcher = Dispatcher::default();
    for n in [0, 1, 100] {
        let result = dispatcher.run(&straight_line(n), &[]).unwrap();
        assert_eq!(result, Value::Double(n as f64 + 1.0), "straight_line({}) should add up", n);

        let result = dispatcher.run(&native_calls(n), &[]).unwrap();
        assert_eq!(result, Value::Double(n as f64), "native_calls({}) should add up", n);
    }
    for levels in [1, 10, 1000] {
        let result = dispatcher.run(&call_chain(levels), &[]).unwrap();
        assert_eq!(result, Value::Double(levels as f64), "call_chain({}) should add up", levels);
    }

    println!("All program correctness checks passed.");
}

fn bench_straight_line(c: &mut Criterion) {
    let dispatcher = Dispatcher::default();

    let mut group = c.benchmark_group("dispatch");
    for n in [100, 1_000, 10_000] {
        let program = straight_line(n);
        group.bench_with_input(BenchmarkId::new("add_doubles", n), &program, |b, program| {
            b.iter(|| black_box(dispatcher.run(program, &[]).unwrap()));
        });
    }
    group.finish();
}

fn bench_step_budget(c: &mut Criterion) {
    let program = Program::new(vec![Instruction::jump(0)]);

    let mut group = c.benchmark_group("dispatch");
    for steps in [1_000u64, 100_000] {
        let dispatcher = Dispatcher::new(Config::new().with_max_steps(steps));
        group.bench_with_input(BenchmarkId::new("jump_loop", steps), &program, |b, program| {
            b.iter(|| black_box(dispatcher.run(program, &[]).is_err()));
        });
    }
    group.finish();
}

fn bench_call_chain(c: &mut Criterion) {
    let dispatcher = Dispatcher::default();

    let mut group = c.benchmark_group("call_overhead");
    for levels in [10, 100, 1000] {
        let program = call_chain(levels);
        group.bench_with_input(BenchmarkId::new("call_chain", levels), &program, |b, program| {
            b.iter(|| black_box(dispatcher.run(program, &[]).unwrap()));
        });
    }
    group.finish();
}

fn bench_native_calls(c: &mut Criterion) {
    let dispatcher = Dispatcher::default();

    let mut group = c.benchmark_group("native");
    for n in [100, 1_000] {
        let program = native_calls(n);
        group.bench_with_input(BenchmarkId::new("execute", n), &program, |b, program| {
            b.iter(|| black_box(dispatcher.run(program, &[]).unwrap()));
        });
    }
    group.finish();
}

// Run verification before benchmarks
fn verify_and_bench(c: &mut Criterion) {
    verify_programs();
    bench_straight_line(c);
    bench_step_budget(c);
    bench_call_chain(c);
    bench_native_calls(c);
}

criterion_group!(benches, verify_and_bench);
criterion_main!(benches);
