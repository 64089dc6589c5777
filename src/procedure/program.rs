// Copyright 2026 FedSQL Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Procedural programs
//!
//! A program is an ordered sequence of instructions plus a 0-based counter;
//! a counter equal to the sequence length means finished. Nested programs
//! (loop bodies, dynamic SQL) are owned by their instructions as values, so
//! cloning a program is a deep copy and clones never share counters.

use std::fmt;

use super::instruction::Instruction;

/// A compiled block of procedural SQL
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
    counter: usize,
}

impl Program {
    /// Create a program over the given instructions, positioned at the start
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Program {
            instructions,
            counter: 0,
        }
    }

    /// Start building a program
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder {
            instructions: Vec::new(),
        }
    }

    /// The instruction at the current counter, `None` when finished
    pub fn current(&self) -> Option<&Instruction> {
        self.instructions.get(self.counter)
    }

    /// The current counter value
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Move the counter past the current instruction
    pub fn advance(&mut self) {
        if self.counter < self.instructions.len() {
            self.counter += 1;
        }
    }

    /// Rewind the counter to the first instruction
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Returns true if the counter is past the last instruction
    pub fn is_finished(&self) -> bool {
        self.counter >= self.instructions.len()
    }

    /// Number of instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program holds no instructions
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instructions in declaration order
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Render the program as an indented instruction listing
    pub fn describe(&self, indent: usize) -> String {
        let mut out = String::new();
        let pad = "  ".repeat(indent);
        for instruction in &self.instructions {
            out.push_str(&pad);
            out.push_str(&instruction.describe());
            out.push('\n');
            if let Some(body) = instruction.body() {
                out.push_str(&body.describe(indent + 1));
            }
        }
        out
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe(0))
    }
}

/// Builder assembling a program instruction by instruction
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
}

impl ProgramBuilder {
    /// Append an instruction
    pub fn add(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Finish the program
    pub fn build(self) -> Program {
        Program::new(self.instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_walk() {
        let program = Program::builder()
            .add(Instruction::Continue)
            .add(Instruction::PopCallFrame)
            .build();
        let mut program = program;

        assert_eq!(program.len(), 2);
        assert!(!program.is_finished());
        assert!(matches!(program.current(), Some(Instruction::Continue)));

        program.advance();
        assert!(matches!(program.current(), Some(Instruction::PopCallFrame)));

        program.advance();
        assert!(program.is_finished());
        assert!(program.current().is_none());

        // advancing past the end stays at the end
        program.advance();
        assert_eq!(program.counter(), 2);
    }

    #[test]
    fn test_reset() {
        let mut program = Program::new(vec![Instruction::Continue]);
        program.advance();
        assert!(program.is_finished());
        program.reset();
        assert_eq!(program.counter(), 0);
        assert!(!program.is_finished());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = Program::new(vec![Instruction::Continue, Instruction::Continue]);
        let clone = original.clone();
        original.advance();
        assert_eq!(original.counter(), 1);
        assert_eq!(clone.counter(), 0);
    }

    #[test]
    fn test_empty_program() {
        let program = Program::new(vec![]);
        assert!(program.is_empty());
        assert!(program.is_finished());
        assert!(program.current().is_none());
    }
}
