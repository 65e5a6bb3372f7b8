use std::io::{self, Write};

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::EngineError;

/// Install the stderr log subscriber.
///
/// `BF_LOG` takes the usual `EnvFilter` syntax; each `-v` raises the floor
/// (0 = warn, 1 = debug, 2+ = trace).
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_env_var("BF_LOG")
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

/// Pretty-print a structured [`EngineError`] with caret positioning.
/// If `program` is `Some("bf")`, prefix messages with "bf: ..." for CLI run mode
pub fn print_engine_error(program: Option<&str>, code: &str, err: &EngineError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        EngineError::BoundsViolation { ip, ptr, op } => {
            let msg = prefix_program(&format!(
                "Runtime error: pointer out of bounds (ptr={ptr}, op={op})"
            ));
            print_error_with_context(&msg, code, *ip);
        }
        EngineError::InvalidInstruction { ch, ip } => {
            let msg = prefix_program(&format!("Parse error: invalid character '{ch}'"));
            print_error_with_context(&msg, code, *ip);
        }
        EngineError::UnmatchedBracket { ip, side } => {
            let msg = prefix_program(&format!(
                "Parse error: unmatched bracket {side} (no match scanning {})",
                side.scan_direction()
            ));
            print_error_with_context(&msg, code, *ip);
        }
        EngineError::EndOfInput { ip } => {
            let msg = prefix_program("Runtime error: end of input");
            print_error_with_context(&msg, code, *ip);
        }
        EngineError::Io { ip, source } => {
            let msg = prefix_program(&format!("I/O error: {source}"));
            print_error_with_context(&msg, code, *ip);
        }
        EngineError::StepLimitExceeded { .. } | EngineError::Canceled => {
            eprintln!("{err}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprintln!("{prefix} at instruction {pos}");
    let (slice, caret) = context_window(code, pos);
    eprintln!("  {slice}");
    eprintln!("  {caret}");
    let _ = io::stderr().flush();
}

/// A window of up to 32 chars either side of `pos`, and the caret line under it.
fn context_window(code: &str, pos: usize) -> (&str, String) {
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let start_byte = char_to_byte_index(code, start_char);
    let end_byte = char_to_byte_index(code, end_char).max(start_byte);
    let slice = &code[start_byte..end_byte];

    // Caret under the exact position
    let mut underline = " ".repeat(pos.saturating_sub(start_char));
    underline.push('^');
    (slice, underline)
}

/// Convert a char index into a byte index in the given UTF-8 string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}
