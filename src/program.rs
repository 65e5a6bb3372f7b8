//! Program store: the normalized, immutable instruction sequence.

use std::fmt;

use crate::error::{BracketSide, EngineError};

/// One of the eight Brainfuck instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `>`
    MoveRight,
    /// `<`
    MoveLeft,
    /// `+`
    Increment,
    /// `-`
    Decrement,
    /// `.`
    Output,
    /// `,`
    Input,
    /// `[`
    LoopOpen,
    /// `]`
    LoopClose,
}

impl Instruction {
    pub fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            '>' => Instruction::MoveRight,
            '<' => Instruction::MoveLeft,
            '+' => Instruction::Increment,
            '-' => Instruction::Decrement,
            '.' => Instruction::Output,
            ',' => Instruction::Input,
            '[' => Instruction::LoopOpen,
            ']' => Instruction::LoopClose,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Instruction::MoveRight => '>',
            Instruction::MoveLeft => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopOpen => '[',
            Instruction::LoopClose => ']',
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// What to do with characters outside `><+-.,[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Treat them as comments and drop them before execution.
    #[default]
    Strip,
    /// Refuse the program at the first foreign character.
    Reject,
}

/// An immutable, normalized program.
///
/// Positions used anywhere else in the crate (program counter, jump targets,
/// error positions) index into [`Program::instructions`], i.e. they are
/// positions *after* comment stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    text: String,
}

impl Program {
    /// Normalize `source` according to `filter`.
    ///
    /// With [`Filter::Reject`] the error position is the character index of the
    /// offending character in `source`.
    pub fn parse(source: &str, filter: Filter) -> Result<Self, EngineError> {
        let mut instructions = Vec::with_capacity(source.len());
        for (ip, ch) in source.chars().enumerate() {
            match (Instruction::from_char(ch), filter) {
                (Some(instr), _) => instructions.push(instr),
                (None, Filter::Strip) => {}
                (None, Filter::Reject) => return Err(EngineError::InvalidInstruction { ch, ip }),
            }
        }
        let text = instructions.iter().map(|i| i.as_char()).collect();
        Ok(Self { instructions, text })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, pc: usize) -> Option<Instruction> {
        self.instructions.get(pc).copied()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The normalized program as text, one character per instruction.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Validate bracket balance in a single pass.
    ///
    /// Reports the first `]` that closes nothing, otherwise the innermost `[`
    /// left open at the end of the program.
    pub fn check_brackets(&self) -> Result<(), EngineError> {
        let mut stack: Vec<usize> = Vec::new();
        for (ip, instr) in self.instructions.iter().enumerate() {
            match instr {
                Instruction::LoopOpen => stack.push(ip),
                Instruction::LoopClose => {
                    if stack.pop().is_none() {
                        return Err(EngineError::UnmatchedBracket { ip, side: BracketSide::Close });
                    }
                }
                _ => {}
            }
        }

        if let Some(unmatched_open) = stack.last().copied() {
            return Err(EngineError::UnmatchedBracket {
                ip: unmatched_open,
                side: BracketSide::Open,
            });
        }
        Ok(())
    }
}
