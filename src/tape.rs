//! The memory tape and its two memory policies.

use std::fmt;
use std::str::FromStr;

/// Default number of cells for a fixed tape.
pub const DEFAULT_TAPE_LEN: usize = 30_000;

/// Initial allocation for a growable tape.
const GROWABLE_INITIAL_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TapeError {
    #[error("cell {ptr} is outside the tape (len={len})")]
    OutOfBounds { ptr: usize, len: usize },
}

/// How the tape treats addresses beyond its current length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapePolicy {
    /// Exactly this many cells; anything past the end is a bounds violation.
    Fixed(usize),
    /// Zero-filled cells are appended on first access past the end.
    Growable,
}

impl Default for TapePolicy {
    fn default() -> Self {
        TapePolicy::Fixed(DEFAULT_TAPE_LEN)
    }
}

impl fmt::Display for TapePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapePolicy::Fixed(n) => write!(f, "fixed:{n}"),
            TapePolicy::Growable => write!(f, "growable"),
        }
    }
}

/// Accepts `growable`, `fixed` (default length), `fixed:N` or a bare `N`.
impl FromStr for TapePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let parse_len = |n: &str| -> Result<usize, String> {
            match n.trim().replace('_', "").parse::<usize>() {
                Ok(0) => Err("tape length must be at least 1".to_string()),
                Ok(n) => Ok(n),
                Err(_) => Err(format!("invalid tape length: {n}")),
            }
        };
        match s.as_str() {
            "growable" | "grow" | "unbounded" => Ok(TapePolicy::Growable),
            "fixed" => Ok(TapePolicy::default()),
            other => match other.strip_prefix("fixed:") {
                Some(n) => parse_len(n).map(TapePolicy::Fixed),
                None => parse_len(other)
                    .map(TapePolicy::Fixed)
                    .map_err(|_| format!("invalid tape policy: {other} (expected 'growable', 'fixed' or 'fixed:N')")),
            },
        }
    }
}

/// A tape of wrapping `u8` cells governed by a single [`TapePolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    policy: TapePolicy,
}

impl Tape {
    pub fn new(policy: TapePolicy) -> Self {
        let len = match policy {
            // A zero-length fixed tape could not hold the initial pointer.
            TapePolicy::Fixed(n) => n.max(1),
            TapePolicy::Growable => GROWABLE_INITIAL_LEN,
        };
        Self { cells: vec![0; len], policy }
    }

    pub fn policy(&self) -> TapePolicy {
        self.policy
    }

    /// Current number of allocated cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Whether the data pointer may legally sit at `ptr`. Never allocates.
    pub fn check(&self, ptr: usize) -> Result<(), TapeError> {
        match self.policy {
            TapePolicy::Fixed(_) if ptr >= self.cells.len() => Err(TapeError::OutOfBounds {
                ptr,
                len: self.cells.len(),
            }),
            _ => Ok(()),
        }
    }

    fn cell_mut(&mut self, ptr: usize) -> Result<&mut u8, TapeError> {
        self.check(ptr)?;
        if ptr >= self.cells.len() {
            // Growable only: double to amortize repeated rightward growth.
            let new_len = (ptr + 1).max(self.cells.len() * 2);
            self.cells.resize(new_len, 0);
        }
        Ok(&mut self.cells[ptr])
    }

    pub fn read(&mut self, ptr: usize) -> Result<u8, TapeError> {
        self.cell_mut(ptr).map(|c| *c)
    }

    pub fn write(&mut self, ptr: usize, value: u8) -> Result<(), TapeError> {
        *self.cell_mut(ptr)? = value;
        Ok(())
    }

    pub fn increment(&mut self, ptr: usize) -> Result<u8, TapeError> {
        let cell = self.cell_mut(ptr)?;
        *cell = cell.wrapping_add(1);
        Ok(*cell)
    }

    pub fn decrement(&mut self, ptr: usize) -> Result<u8, TapeError> {
        let cell = self.cell_mut(ptr)?;
        *cell = cell.wrapping_sub(1);
        Ok(*cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_addition() {
        let mut tape = Tape::new(TapePolicy::Fixed(1));
        tape.write(0, 255).unwrap();
        assert_eq!(tape.increment(0), Ok(0));
    }

    #[test]
    fn wrapping_subtraction() {
        let mut tape = Tape::new(TapePolicy::Fixed(1));
        assert_eq!(tape.decrement(0), Ok(255));
    }

    #[test]
    fn fixed_tape_rejects_access_past_end() {
        let mut tape = Tape::new(TapePolicy::Fixed(3));
        assert!(tape.check(2).is_ok());
        assert_eq!(tape.check(3), Err(TapeError::OutOfBounds { ptr: 3, len: 3 }));
        assert_eq!(tape.read(3), Err(TapeError::OutOfBounds { ptr: 3, len: 3 }));
        assert!(tape.write(10, 1).is_err());
        assert_eq!(tape.len(), 3);
    }

    #[test]
    fn growable_tape_extends_with_zeroes() {
        let mut tape = Tape::new(TapePolicy::Growable);
        let far = GROWABLE_INITIAL_LEN * 5 + 3;
        assert!(tape.check(far).is_ok());
        assert_eq!(tape.read(far), Ok(0));
        assert!(tape.len() > far);
        tape.increment(far + 1).unwrap();
        assert_eq!(tape.cells()[far + 1], 1);
        assert!(tape.cells()[..=far].iter().all(|&c| c == 0));
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("growable".parse::<TapePolicy>(), Ok(TapePolicy::Growable));
        assert_eq!("fixed".parse::<TapePolicy>(), Ok(TapePolicy::Fixed(DEFAULT_TAPE_LEN)));
        assert_eq!("fixed:300".parse::<TapePolicy>(), Ok(TapePolicy::Fixed(300)));
        assert_eq!("30_000".parse::<TapePolicy>(), Ok(TapePolicy::Fixed(30_000)));
        assert!("fixed:0".parse::<TapePolicy>().is_err());
        assert!("sideways".parse::<TapePolicy>().is_err());
        assert_eq!(TapePolicy::Fixed(8).to_string(), "fixed:8");
    }
}
