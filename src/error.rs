use std::fmt;

/// Errors that can terminate a run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A loop-open has no matching loop-close, or the other way around.
    #[error("Unmatched bracket {side} at instruction {ip} (no match found scanning {})", .side.scan_direction())]
    UnmatchedBracket { ip: usize, side: BracketSide },

    /// The data pointer moved left of cell 0 or past the end of a fixed tape.
    #[error("Pointer out of bounds at instruction {ip} (ptr={ptr}, op='{op}')")]
    BoundsViolation { ip: usize, ptr: usize, op: char },

    /// `,` found no input and the end-of-input policy is `Error`.
    #[error("End of input at instruction {ip}")]
    EndOfInput { ip: usize },

    /// A character outside `><+-.,[]` with comment filtering disabled.
    #[error("Invalid character: '{ch}' at instruction {ip}")]
    InvalidInstruction { ch: char, ip: usize },

    /// An underlying I/O error occurred when reading from stdin.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

/// Discriminant of an [`EngineError`], kept by the engine once it has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnmatchedBracket,
    BoundsViolation,
    EndOfInput,
    InvalidInstruction,
    Io,
    StepLimitExceeded,
    Canceled,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::UnmatchedBracket { .. } => ErrorKind::UnmatchedBracket,
            EngineError::BoundsViolation { .. } => ErrorKind::BoundsViolation,
            EngineError::EndOfInput { .. } => ErrorKind::EndOfInput,
            EngineError::InvalidInstruction { .. } => ErrorKind::InvalidInstruction,
            EngineError::Io { .. } => ErrorKind::Io,
            EngineError::StepLimitExceeded { .. } => ErrorKind::StepLimitExceeded,
            EngineError::Canceled => ErrorKind::Canceled,
        }
    }

    /// Instruction index the error was raised at, when there is one.
    pub fn position(&self) -> Option<usize> {
        match self {
            EngineError::UnmatchedBracket { ip, .. }
            | EngineError::BoundsViolation { ip, .. }
            | EngineError::EndOfInput { ip }
            | EngineError::InvalidInstruction { ip, .. }
            | EngineError::Io { ip, .. } => Some(*ip),
            EngineError::StepLimitExceeded { .. } | EngineError::Canceled => None,
        }
    }
}

/// Which side of the loop was unmatched.
///
/// `Open` means a forward scan from a `[` ran off the end of the program;
/// `Close` means a backward scan from a `]` (or an empty loop stack) found nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketSide {
    Open,
    Close,
}

impl BracketSide {
    pub fn scan_direction(&self) -> &'static str {
        match self {
            BracketSide::Open => "forward",
            BracketSide::Close => "backward",
        }
    }
}

impl fmt::Display for BracketSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketSide::Open => write!(f, "'['"),
            BracketSide::Close => write!(f, "']'"),
        }
    }
}
