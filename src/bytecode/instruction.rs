//! Opcodes and instructions

use crate::runtime::{RuntimeError, Value};
use std::fmt;

/// The operation an instruction performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // Data movement
    Push,
    Load,
    Store,
    Arg,

    // Intra-frame control
    Jump,
    Gosub,
    Return,

    // Arithmetic
    AddDoubles,

    // Cross-frame control
    Call,
    Execute,
    Exit,
}

impl OpCode {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpCode::Push => "push",
            OpCode::Load => "load",
            OpCode::Store => "store",
            OpCode::Arg => "arg",
            OpCode::Jump => "jump",
            OpCode::Gosub => "gosub",
            OpCode::Return => "return",
            OpCode::AddDoubles => "add.doubles",
            OpCode::Call => "call",
            OpCode::Execute => "execute",
            OpCode::Exit => "exit",
        }
    }

    /// Whether the operand carries meaning for this opcode
    pub fn takes_operand(&self) -> bool {
        matches!(
            self,
            OpCode::Push | OpCode::Load | OpCode::Store | OpCode::Arg | OpCode::Jump | OpCode::Gosub | OpCode::Call
        )
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One opcode with its embedded operand
///
/// Opcodes that take no operand carry `Value::Null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    pub opcode: OpCode,
    pub operand: Value,
}

impl Instruction {
    pub fn new(opcode: OpCode, operand: Value) -> Self {
        Instruction { opcode, operand }
    }

    pub fn push(value: impl Into<Value>) -> Self {
        Self::new(OpCode::Push, value.into())
    }

    pub fn load(index: i64) -> Self {
        Self::new(OpCode::Load, Value::Integer(index))
    }

    pub fn store(index: i64) -> Self {
        Self::new(OpCode::Store, Value::Integer(index))
    }

    pub fn arg(index: i64) -> Self {
        Self::new(OpCode::Arg, Value::Integer(index))
    }

    pub fn jump(target: i64) -> Self {
        Self::new(OpCode::Jump, Value::Integer(target))
    }

    pub fn gosub(target: i64) -> Self {
        Self::new(OpCode::Gosub, Value::Integer(target))
    }

    pub fn ret() -> Self {
        Self::new(OpCode::Return, Value::Null)
    }

    pub fn add_doubles() -> Self {
        Self::new(OpCode::AddDoubles, Value::Null)
    }

    pub fn call(target: i64) -> Self {
        Self::new(OpCode::Call, Value::Integer(target))
    }

    pub fn execute() -> Self {
        Self::new(OpCode::Execute, Value::Null)
    }

    pub fn exit() -> Self {
        Self::new(OpCode::Exit, Value::Null)
    }

    /// The operand as an index or target
    ///
    /// # Errors
    /// Returns `TypeMismatch` if the operand is not an `Integer`
    pub fn integer_operand(&self) -> Result<i64, RuntimeError> {
        self.operand.try_integer()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        if self.opcode.takes_operand() {
            write!(f, " {}", self.operand)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Instruction::push(5), Instruction::new(OpCode::Push, Value::Integer(5)));
        assert_eq!(Instruction::push(2.5).operand, Value::Double(2.5));
        assert_eq!(Instruction::push(Value::Null).operand, Value::Null);
        assert_eq!(Instruction::load(3).operand, Value::Integer(3));
        assert_eq!(Instruction::call(7).opcode, OpCode::Call);
        assert_eq!(Instruction::ret().operand, Value::Null);
        assert_eq!(Instruction::exit().opcode, OpCode::Exit);
    }

    #[test]
    fn test_integer_operand() {
        assert_eq!(Instruction::jump(4).integer_operand().unwrap(), 4);

        let bad = Instruction::new(OpCode::Jump, Value::Double(4.0));
        let err = bad.integer_operand().unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch: expected integer, got double");
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::push(42).to_string(), "push int:42");
        assert_eq!(Instruction::gosub(3).to_string(), "gosub int:3");
        assert_eq!(Instruction::add_doubles().to_string(), "add.doubles");
        assert_eq!(Instruction::exit().to_string(), "exit");
        assert_eq!(OpCode::Execute.to_string(), "execute");
    }
}
