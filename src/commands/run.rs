use std::fs;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clap::Args;
use tracing::debug;

use super::EngineArgs;
use crate::cli_util::print_engine_error;
use crate::config::ConfigError;
use crate::trace::{TraceFormat, TABLE_HEADER};
use crate::{Engine, EngineError, Program, StepControl};

const DEFAULT_TIMEOUT_MS: u64 = 2_000;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a snapshot to stderr after every instruction (diagram or table)
    #[arg(short = 't', long = "trace", value_name = "FORMAT", num_args = 0..=1, require_equals = true, default_missing_value = "diagram")]
    pub trace: Option<TraceFormat>,

    /// Shorthand for --trace=table
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Wall-clock budget for one supervised run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub timeout: Option<Duration>,
}

impl Limits {
    /// Resolve the timeout: flag -> BF_TIMEOUT_MS -> 2_000 ms. Zero disables it.
    pub fn resolve(timeout_ms: Option<u64>) -> Result<Self, ConfigError> {
        let ms = match timeout_ms {
            Some(ms) => ms,
            None => match std::env::var("BF_TIMEOUT_MS") {
                Ok(value) => parse_timeout_ms(&value)?,
                Err(_) => DEFAULT_TIMEOUT_MS,
            },
        };
        Ok(Self { timeout: (ms > 0).then(|| Duration::from_millis(ms)) })
    }
}

fn parse_timeout_ms(value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .replace('_', "")
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue { key: "timeout".to_string(), reason: e.to_string() })
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        trace,
        debug,
        file,
        code,
        engine: engine_args,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    let resolved = engine_args.resolve().and_then(|cfg| Ok((cfg, engine_args.limits()?)));
    let (config, limits) = match resolved {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    // Foreign characters are reported against the raw source, everything
    // else against the normalized program.
    let parsed = match Program::parse(&code_str, config.filter) {
        Ok(p) => p,
        Err(err) => {
            print_engine_error(Some(program), &code_str, &err);
            return 1;
        }
    };
    let normalized = parsed.text().to_string();
    let mut engine = match Engine::from_program(parsed, config) {
        Ok(e) => e,
        Err(err) => {
            print_engine_error(Some(program), &normalized, &err);
            return 1;
        }
    };

    match if debug { Some(TraceFormat::Table) } else { trace } {
        Some(TraceFormat::Table) => {
            eprintln!("{TABLE_HEADER}");
            engine.set_trace_observer(|s| eprintln!("{}", s.table_row()));
        }
        Some(TraceFormat::Diagram) => {
            engine.set_trace_observer(|s| eprintln!("{}\n", s.diagram()));
        }
        None => {}
    }

    let exit_code = supervise(Some(program), engine, limits);

    // For readability, ensure output ends with a newline
    println!();
    let _ = io::stdout().flush();
    exit_code
}

/// Execute `engine` on a worker thread with cooperative cancellation.
///
/// Reports any failure on stderr and returns the process exit code.
pub fn supervise(program: Option<&str>, mut engine: Engine, limits: Limits) -> i32 {
    let code = engine.program().text().to_string();
    let cancel = Arc::new(AtomicBool::new(false));
    let ctrl = StepControl::new(engine.config().max_steps, Arc::clone(&cancel));
    let (tx, rx) = mpsc::channel::<Result<(), EngineError>>();

    thread::spawn(move || {
        let res = engine.run_with_control(ctrl);
        let _ = io::stdout().flush();
        let _ = tx.send(res);
    });

    let received = match limits.timeout {
        Some(timeout) => rx.recv_timeout(timeout),
        None => rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
    };
    let timeout_ms = limits.timeout.map_or(0, |t| t.as_millis() as u64);

    match received {
        Ok(Ok(())) => 0,
        Ok(Err(EngineError::Canceled)) | Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            debug!(timeout_ms, "run cancelled");
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Ok(Err(other)) => {
            print_engine_error(program, &code, &other);
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>      Read Brainfuck code from PATH instead of positional "<code>"
  --trace[=FORMAT], -t    Print a snapshot after every instruction to stderr (diagram|table)
  --debug, -d             Same as --trace=table
  --tape <POLICY>         growable | fixed | fixed:N            (env BF_TAPE)
  --eof <POLICY>          zero | unchanged | error              (env BF_EOF)
  --strategy <NAME>       stack | rescan                        (env BF_STRATEGY)
  --no-filter             Reject characters outside ><+-.,[]
  --lazy-brackets         Report unmatched brackets only when reached
  --max-steps <N>         Abort after N instructions            (env BF_MAX_STEPS)
  --timeout <MS>          Abort after MS milliseconds, 0 = none (env BF_TIMEOUT_MS)
  --verbose, -v           More log output on stderr (repeat for more; env BF_LOG)
  --help,  -h             Show this help

Notes:
- Characters outside ><+-.,[] are comments unless --no-filter is given.
- Input (`,`) reads a single byte from stdin; on EOF the current cell is set to 0 by default.
- Defaults can also be set in the [engine] table of bf.toml in your config directory.

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
