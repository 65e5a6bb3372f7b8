//! Loop resolution: where `[` and `]` send the program counter.
//!
//! Two strategies with identical observable behavior:
//! - [`RescanResolver`] scans the instruction stream every time a bracket executes.
//! - [`StackResolver`] keeps a stack of open loops so `]` jumps back without a scan.

use std::fmt;
use std::str::FromStr;

use crate::error::{BracketSide, EngineError};
use crate::program::{Instruction, Program};

/// Position of the `]` matching the bracket scope that starts after `pc`.
///
/// Scans forward from `pc + 1`; nested `[` raise the depth, and a `]` seen at
/// depth zero is the match.
pub fn find_close(program: &Program, pc: usize) -> Result<usize, EngineError> {
    let mut depth = 0usize;
    for (i, instr) in program.instructions().iter().enumerate().skip(pc + 1) {
        match instr {
            Instruction::LoopOpen => depth += 1,
            Instruction::LoopClose if depth == 0 => return Ok(i),
            Instruction::LoopClose => depth -= 1,
            _ => {}
        }
    }
    Err(EngineError::UnmatchedBracket { ip: pc, side: BracketSide::Open })
}

/// Position of the `[` matching the bracket scope that ends before `pc`.
///
/// Scans backward from `pc - 1`; nested `]` raise the depth, and a `[` seen at
/// depth zero is the match.
pub fn find_open(program: &Program, pc: usize) -> Result<usize, EngineError> {
    let end = pc.min(program.len());
    let mut depth = 0usize;
    for (i, instr) in program.instructions()[..end].iter().enumerate().rev() {
        match instr {
            Instruction::LoopClose => depth += 1,
            Instruction::LoopOpen if depth == 0 => return Ok(i),
            Instruction::LoopOpen => depth -= 1,
            _ => {}
        }
    }
    Err(EngineError::UnmatchedBracket { ip: pc, side: BracketSide::Close })
}

/// Computes the next program counter for loop instructions.
///
/// Implementations own whatever bookkeeping they need for one run; an engine
/// never shares a resolver with another engine.
pub trait LoopResolver: Send {
    /// `[` at `pc` with the current cell value `cell`.
    fn loop_open(&mut self, program: &Program, pc: usize, cell: u8) -> Result<usize, EngineError>;

    /// `]` at `pc`. Always returns to the matching `[` so its test runs again.
    fn loop_close(&mut self, program: &Program, pc: usize) -> Result<usize, EngineError>;

    /// Position of the `]` matching the `[` at `open`.
    fn resolve_close(&mut self, program: &Program, open: usize) -> Result<usize, EngineError>;

    /// Drop all per-run state.
    fn reset(&mut self);

    fn strategy(&self) -> Strategy;
}

/// Strategy A: re-scan on demand.
#[derive(Debug, Default)]
pub struct RescanResolver;

impl LoopResolver for RescanResolver {
    fn loop_open(&mut self, program: &Program, pc: usize, cell: u8) -> Result<usize, EngineError> {
        // The scan also runs for a non-zero cell so an unbalanced `[` is
        // reported at the same step the stack strategy reports it.
        let close = find_close(program, pc)?;
        Ok(if cell == 0 { close + 1 } else { pc + 1 })
    }

    fn loop_close(&mut self, program: &Program, pc: usize) -> Result<usize, EngineError> {
        find_open(program, pc)
    }

    fn resolve_close(&mut self, program: &Program, open: usize) -> Result<usize, EngineError> {
        find_close(program, open)
    }

    fn reset(&mut self) {}

    fn strategy(&self) -> Strategy {
        Strategy::Rescan
    }
}

/// Strategy B: stack-assisted.
///
/// Each entered loop is pushed as `(open, close)`; `]` jumps to the open
/// position on top of the stack and the entry is popped only once that `[`
/// tests zero. Close positions are memoised for the rest of the run.
#[derive(Debug, Default)]
pub struct StackResolver {
    open_loops: Vec<(usize, usize)>,
    closes: Vec<Option<usize>>,
}

impl StackResolver {
    /// Currently open loops, innermost last.
    pub fn open_loops(&self) -> &[(usize, usize)] {
        &self.open_loops
    }
}

impl LoopResolver for StackResolver {
    fn loop_open(&mut self, program: &Program, pc: usize, cell: u8) -> Result<usize, EngineError> {
        let close = match self.open_loops.last() {
            Some(&(open, close)) if open == pc => close,
            _ => {
                let close = self.resolve_close(program, pc)?;
                self.open_loops.push((pc, close));
                close
            }
        };

        if cell == 0 {
            self.open_loops.pop();
            Ok(close + 1)
        } else {
            Ok(pc + 1)
        }
    }

    fn loop_close(&mut self, _program: &Program, pc: usize) -> Result<usize, EngineError> {
        match self.open_loops.last() {
            Some(&(open, close)) if close == pc => Ok(open),
            _ => Err(EngineError::UnmatchedBracket { ip: pc, side: BracketSide::Close }),
        }
    }

    fn resolve_close(&mut self, program: &Program, open: usize) -> Result<usize, EngineError> {
        if self.closes.len() != program.len() {
            self.closes = vec![None; program.len()];
        }
        if let Some(Some(close)) = self.closes.get(open) {
            return Ok(*close);
        }
        let close = find_close(program, open)?;
        if let Some(slot) = self.closes.get_mut(open) {
            *slot = Some(close);
        }
        Ok(close)
    }

    fn reset(&mut self) {
        self.open_loops.clear();
        self.closes.clear();
    }

    fn strategy(&self) -> Strategy {
        Strategy::Stack
    }
}

/// Which [`LoopResolver`] an engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Strategy B, [`StackResolver`].
    #[default]
    Stack,
    /// Strategy A, [`RescanResolver`].
    Rescan,
}

impl Strategy {
    pub fn resolver(self) -> Box<dyn LoopResolver> {
        match self {
            Strategy::Stack => Box::new(StackResolver::default()),
            Strategy::Rescan => Box::new(RescanResolver),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Stack => write!(f, "stack"),
            Strategy::Rescan => write!(f, "rescan"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stack" | "b" => Ok(Strategy::Stack),
            "rescan" | "scan" | "a" => Ok(Strategy::Rescan),
            other => Err(format!("invalid loop strategy: {other} (expected 'stack' or 'rescan')")),
        }
    }
}
