//! A small Brainfuck tape-machine interpreter library.
//!
//! The engine executes the eight instructions `><+-.,[]` over a tape of
//! wrapping `u8` cells with a single data pointer.
//!
//! Features and behaviors:
//! - Characters outside the instruction set are comments and are stripped
//!   before execution (or rejected, with [`Filter::Reject`]).
//! - Tape policy is configurable: a fixed tape (30,000 cells by default) where
//!   running off either end is an error, or a growable tape that extends to the
//!   right on demand.
//! - Input `,` reads one byte; end of input follows a configurable [`EofPolicy`]
//!   (store 0 by default).
//! - Output `.` writes the current cell as one raw byte.
//! - Loops are resolved either by re-scanning ([`Strategy::Rescan`]) or with an
//!   open-loop stack ([`Strategy::Stack`], the default); unmatched brackets are
//!   reported as errors.
//! - An optional trace observer receives a [`Snapshot`] after every instruction.
//!
//! Quick start:
//!
//! ```no_run
//! use bf_engine::Engine;
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let mut bf = Engine::new(code).expect("program should parse");
//! bf.run().expect("program should run");
//! println!(); // ensure a trailing newline for readability
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod program;
pub mod repl;
pub mod resolver;
pub mod tape;
pub mod theme;
pub mod trace;

pub use config::{EngineConfig, EofPolicy};
pub use engine::{Engine, State, StepControl};
pub use error::{BracketSide, EngineError, ErrorKind};
pub use program::{Filter, Instruction, Program};
pub use resolver::{LoopResolver, RescanResolver, StackResolver, Strategy};
pub use tape::{Tape, TapeError, TapePolicy};
pub use trace::{Snapshot, TraceFormat};
