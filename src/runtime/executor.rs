//! Bytecode instruction dispatcher

use super::{
    call_stack::FrameStack,
    config::{Config, LocalsModel},
    frame::{Frame, Locals},
    native::CallContext,
    stack::Stack,
    RuntimeError, Value,
};
use crate::bytecode::{Instruction, OpCode, Program};
use bumpalo::Bump;
use tracing::{debug, instrument, trace};

/// Counters collected while a program runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Instructions dispatched, including the final `Exit`
    pub steps: u64,
    /// Deepest frame stack observed, counting the top-level frame
    pub max_frame_depth: usize,
    /// Bytes held by the arena when the run finished
    pub arena_bytes: usize,
}

/// Result of a completed run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    pub value: Value,
    pub stats: RunStats,
}

/// Executes bytecode programs
///
/// A dispatcher holds only configuration. Every run gets its own frame
/// stack and register file, and its own arena unless the caller supplies one
/// through [`Dispatcher::run_in`], so one dispatcher can be reused for any
/// number of runs.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: Config,
}

impl Dispatcher {
    pub fn new(config: Config) -> Self {
        Dispatcher { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `program` to completion, returning the value of the final `Exit`
    ///
    /// # Errors
    /// Returns the fault that stopped the run
    pub fn run(&self, program: &Program, args: &[Value]) -> Result<Value, RuntimeError> {
        self.run_with_report(program, args).map(|report| report.value)
    }

    /// Run `program` to completion and report execution counters
    ///
    /// `args` become the argument view of the top-level frame. The run gets a
    /// fresh arena of `arena_capacity` bytes that is released on return.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration does not validate
    /// - `EmptyProgram` if `program` has no instructions
    /// - Any fault raised by an instruction
    pub fn run_with_report(&self, program: &Program, args: &[Value]) -> Result<RunReport, RuntimeError> {
        let arena = Bump::with_capacity(self.config.arena_capacity);
        self.run_in(&arena, program, args)
    }

    /// Run `program` with frames and operand stacks allocated from `arena`
    ///
    /// The caller owns the arena; nothing allocated during the run is freed
    /// until the caller resets or drops it. The returned value borrows
    /// nothing from the arena.
    ///
    /// # Errors
    /// Same as [`Dispatcher::run_with_report`]
    #[instrument(skip_all, fields(instructions = program.len(), args = args.len()))]
    pub fn run_in(&self, arena: &Bump, program: &Program, args: &[Value]) -> Result<RunReport, RuntimeError> {
        self.config.validate()?;
        if program.is_empty() {
            debug!("refusing to run an empty program");
            return Err(RuntimeError::EmptyProgram);
        }

        let mut run = Run::new(&self.config, program, args, arena);

        match run.dispatch() {
            Ok(value) => {
                run.stats.arena_bytes = arena.allocated_bytes();
                debug!(steps = run.stats.steps, result = %value, "run finished");
                Ok(RunReport { value, stats: run.stats })
            }
            Err(error) => {
                debug!(
                    pc = run.frames.active().pc(),
                    depth = run.frames.depth(),
                    %error,
                    "run faulted"
                );
                Err(error)
            }
        }
    }
}

/// What the dispatch loop does after an instruction
enum Flow {
    /// Advance the active frame's pc by one
    Next,
    /// The instruction already set the pc of the (possibly new) active frame
    Transferred,
    /// The top-level frame exited with this value
    Finished(Value),
}

/// State of one run; everything borrowed from `arena` dies with it
struct Run<'a, 'bump> {
    config: &'a Config,
    program: &'a Program,
    arena: &'bump Bump,
    frames: FrameStack<'bump>,
    /// Register file shared by all frames under `LocalsModel::Shared`
    registers: Option<Locals<'bump>>,
    stats: RunStats,
}

impl<'a, 'bump> Run<'a, 'bump> {
    fn new(config: &'a Config, program: &'a Program, args: &[Value], arena: &'bump Bump) -> Self {
        let registers = match config.locals_model {
            LocalsModel::Shared => Some(Locals::new_in(config.locals_capacity, arena)),
            LocalsModel::PerFrame => None,
        };
        let frame_locals = Self::locals_for(config, arena);
        let root = Frame::new_in(&[], args, frame_locals, 0, arena);

        Run {
            config,
            program,
            arena,
            frames: FrameStack::new_in(root, config.max_call_depth, arena),
            registers,
            stats: RunStats {
                steps: 0,
                max_frame_depth: 1,
                arena_bytes: 0,
            },
        }
    }

    /// Locals owned by a new frame; empty when the register file is shared
    fn locals_for(config: &Config, arena: &'bump Bump) -> Locals<'bump> {
        match config.locals_model {
            LocalsModel::Shared => Locals::new_in(0, arena),
            LocalsModel::PerFrame => Locals::new_in(config.locals_capacity, arena),
        }
    }

    fn dispatch(&mut self) -> Result<Value, RuntimeError> {
        loop {
            let pc = self.frames.active().pc();
            let instruction = *self.program.fetch(pc)?;
            self.charge_step()?;
            trace!(pc, depth = self.frames.depth(), %instruction, "dispatch");

            match self.step(pc, instruction)? {
                Flow::Next => self.frames.active_mut().advance(),
                Flow::Transferred => {}
                Flow::Finished(value) => return Ok(value),
            }
        }
    }

    fn charge_step(&mut self) -> Result<(), RuntimeError> {
        if let Some(max) = self.config.max_steps {
            if self.stats.steps >= max {
                return Err(RuntimeError::StepBudgetExhausted(max));
            }
        }
        self.stats.steps += 1;
        Ok(())
    }

    fn step(&mut self, pc: usize, instruction: Instruction) -> Result<Flow, RuntimeError> {
        match instruction.opcode {
            OpCode::Push => {
                self.stack_mut().push(instruction.operand);
                Ok(Flow::Next)
            }
            OpCode::Load => {
                let value = self.locals().load(instruction.integer_operand()?)?;
                self.stack_mut().push(value);
                Ok(Flow::Next)
            }
            OpCode::Store => {
                let index = instruction.integer_operand()?;
                let value = self.stack_mut().pop()?;
                self.locals_mut().store(index, value)?;
                Ok(Flow::Next)
            }
            OpCode::Arg => {
                let value = self.frames.active().argument(instruction.integer_operand()?)?;
                self.stack_mut().push(value);
                Ok(Flow::Next)
            }
            OpCode::Jump => {
                let target = self.branch_target(&instruction)?;
                self.frames.active_mut().jump(target);
                Ok(Flow::Transferred)
            }
            OpCode::Gosub => {
                let target = self.branch_target(&instruction)?;
                let frame = self.frames.active_mut();
                frame.stack_mut().push(Value::Integer(pc as i64 + 1));
                frame.jump(target);
                Ok(Flow::Transferred)
            }
            OpCode::Return => {
                let address = self.stack_mut().pop_integer()?;
                let target = self
                    .program
                    .index(address)
                    .ok_or(RuntimeError::InvalidReturnAddress(address))?;
                self.frames.active_mut().jump(target);
                Ok(Flow::Transferred)
            }
            OpCode::AddDoubles => {
                let stack = self.stack_mut();
                stack.require(2)?;
                let rhs = stack.pop_double()?;
                let lhs = stack.pop_double()?;
                stack.push(Value::Double(lhs + rhs));
                Ok(Flow::Next)
            }
            OpCode::Call => self.call(pc, &instruction),
            OpCode::Execute => self.execute_native(),
            OpCode::Exit => self.exit(),
        }
    }

    /// Push a callee frame seeded with the arguments beneath the count
    ///
    /// At least one caller value must remain beneath the arguments.
    fn call(&mut self, pc: usize, instruction: &Instruction) -> Result<Flow, RuntimeError> {
        let target = self.branch_target(instruction)?;
        let mut callee = match self.frames.take_spare() {
            Some(frame) => frame,
            None => Frame::new_in(&[], &[], Self::locals_for(self.config, self.arena), target, self.arena),
        };

        let caller = self.frames.active_mut();
        let count = pop_count(caller.stack_mut(), 1)?;
        callee.enter(caller.stack().top(count)?, target);
        caller.stack_mut().discard(count)?;
        caller.jump(pc + 1);

        self.frames.push(callee)?;
        self.stats.max_frame_depth = self.stats.max_frame_depth.max(self.frames.depth());
        debug!(target, args = count, depth = self.frames.depth(), "pushed frame");
        Ok(Flow::Transferred)
    }

    /// Invoke the native function on top of the stack
    fn execute_native(&mut self) -> Result<Flow, RuntimeError> {
        let arena = self.arena;
        let stack = self.stack_mut();
        let function = stack.pop()?.try_native_function()?;
        let count = pop_count(stack, 0)?;

        let result = function.invoke(&CallContext::new(arena, stack.top(count)?))?;
        stack.discard(count)?;
        stack.push(result);
        trace!(function = ?function, args = count, %result, "native returned");
        Ok(Flow::Next)
    }

    fn exit(&mut self) -> Result<Flow, RuntimeError> {
        let result = self.stack_mut().pop()?;
        if self.frames.is_root() {
            return Ok(Flow::Finished(result));
        }

        let callee = self.frames.pop()?;
        self.frames.recycle(callee);
        debug!(resume = self.frames.active().pc(), depth = self.frames.depth(), "popped frame");
        self.stack_mut().push(result);
        Ok(Flow::Transferred)
    }

    fn branch_target(&self, instruction: &Instruction) -> Result<usize, RuntimeError> {
        let target = instruction.integer_operand()?;
        self.program.index(target).ok_or(RuntimeError::InvalidJumpTarget(target))
    }

    fn stack_mut(&mut self) -> &mut Stack<'bump> {
        self.frames.active_mut().stack_mut()
    }

    fn locals(&self) -> &Locals<'bump> {
        match &self.registers {
            Some(registers) => registers,
            None => self.frames.active().locals(),
        }
    }

    fn locals_mut(&mut self) -> &mut Locals<'bump> {
        match &mut self.registers {
            Some(registers) => registers,
            None => self.frames.active_mut().locals_mut(),
        }
    }
}

/// Pop an argument count and check that the arguments plus `reserved`
/// further values sit beneath it
fn pop_count(stack: &mut Stack<'_>, reserved: usize) -> Result<usize, RuntimeError> {
    let raw = stack.pop_integer()?;
    let count = usize::try_from(raw).map_err(|_| RuntimeError::InvalidArgumentCount(raw))?;
    let expected = count.saturating_add(reserved);
    if stack.depth() < expected {
        return Err(RuntimeError::ArgumentCountMismatch {
            expected,
            available: stack.depth(),
        });
    }
    Ok(count)
}
