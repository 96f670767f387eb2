//! Test utilities for runtime testing
//!
//! This module provides test helpers that can be used by any runtime test
//! without creating circular dependencies.

#[cfg(test)]
pub mod test {
    use crate::bytecode::{Instruction, Program};
    use crate::runtime::{Config, Dispatcher, RunReport, RuntimeError, Value};

    /// Test builder for creating dispatcher tests fluently
    pub struct DispatcherTest {
        instructions: Vec<Instruction>,
        args: Vec<Value>,
        config: Config,
    }

    impl DispatcherTest {
        pub fn new() -> Self {
            DispatcherTest {
                instructions: Vec::new(),
                args: Vec::new(),
                config: Config::default(),
            }
        }

        pub fn config(mut self, config: Config) -> Self {
            self.config = config;
            self
        }

        pub fn inst(mut self, instruction: Instruction) -> Self {
            self.instructions.push(instruction);
            self
        }

        pub fn arg(mut self, value: Value) -> Self {
            self.args.push(value);
            self
        }

        pub fn args(mut self, args: Vec<Value>) -> Self {
            self.args = args;
            self
        }

        pub fn run(self) -> Result<RunReport, RuntimeError> {
            let program = Program::new(self.instructions);
            Dispatcher::new(self.config).run_with_report(&program, &self.args)
        }

        pub fn expect_value(self, expected: Value) {
            let report = self.run().expect("Execution should succeed");
            assert_eq!(report.value, expected);
        }

        pub fn expect_error(self, error_contains: &str) {
            match self.run() {
                Err(e) => {
                    let error_string = e.to_string();
                    assert!(
                        error_string.contains(error_contains),
                        "Expected error containing '{}', got: '{}'",
                        error_contains,
                        error_string
                    );
                }
                Ok(report) => panic!(
                    "Expected error containing '{}', but execution succeeded with {}",
                    error_contains, report.value
                ),
            }
        }
    }
}
