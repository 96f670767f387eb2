//! Immutable instruction sequences

use super::Instruction;
use crate::runtime::RuntimeError;
use std::fmt;

/// An ordered, fixed-length sequence of instructions addressed from 0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Program { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// The instruction at `pc`
    ///
    /// # Errors
    /// Returns `ProgramCounterOutOfBounds` if `pc` is past the end
    pub fn fetch(&self, pc: usize) -> Result<&Instruction, RuntimeError> {
        self.instructions.get(pc).ok_or(RuntimeError::ProgramCounterOutOfBounds(pc))
    }

    /// Resolve a raw branch target into an instruction index
    ///
    /// Returns `None` for negative targets and targets at or past the end.
    pub fn index(&self, target: i64) -> Option<usize> {
        usize::try_from(target).ok().filter(|index| *index < self.len())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Program::new(instructions)
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Program::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{index:>4}: {instruction}")?;
        }
        Ok(())
    }
}
