//! The execution engine: one program, one tape, one cursor.

use std::io::{self, Read, Write};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::{debug, trace};

use crate::config::{EngineConfig, EofPolicy};
use crate::error::{EngineError, ErrorKind};
use crate::program::{Instruction, Program};
use crate::resolver::LoopResolver;
use crate::tape::Tape;
use crate::trace::Snapshot;

type OutputSink = Box<dyn FnMut(&[u8]) + Send>;
type InputProvider = Box<dyn FnMut() -> Option<u8> + Send>;
type TraceObserver = Box<dyn FnMut(&Snapshot<'_>) + Send>;

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    /// The program counter reached the end of the program.
    Halted,
    Failed(ErrorKind),
}

/// A single, isolated interpreter run.
///
/// The engine owns its program, tape, cursor and loop bookkeeping; nothing is
/// shared between engines, so independent runs may live on different threads.
pub struct Engine {
    program: Program,
    tape: Tape,
    pc: usize,
    pointer: usize,
    steps: usize,
    state: State,
    config: EngineConfig,
    resolver: Box<dyn LoopResolver>,
    // Optional hooks:
    output_sink: Option<OutputSink>,
    input_provider: Option<InputProvider>,
    trace_observer: Option<TraceObserver>,
}

impl Engine {
    /// Parse `source` with the default configuration: comments stripped,
    /// 30,000-cell fixed tape, EOF stores 0, stack-assisted loops.
    pub fn new(source: &str) -> Result<Self, EngineError> {
        Self::with_config(source, EngineConfig::default())
    }

    pub fn with_config(source: &str, config: EngineConfig) -> Result<Self, EngineError> {
        let program = Program::parse(source, config.filter)?;
        Self::from_program(program, config)
    }

    /// Build an engine for an already-normalized program.
    ///
    /// With `validate_brackets` set, an unbalanced program is rejected here,
    /// before any instruction runs.
    pub fn from_program(program: Program, config: EngineConfig) -> Result<Self, EngineError> {
        if config.validate_brackets {
            program.check_brackets()?;
        }
        debug!(
            instructions = program.len(),
            tape = %config.tape,
            strategy = %config.strategy,
            eof = %config.eof,
            "program loaded"
        );
        Ok(Self {
            program,
            tape: Tape::new(config.tape),
            pc: 0,
            pointer: 0,
            steps: 0,
            state: State::Running,
            resolver: config.strategy.resolver(),
            config,
            output_sink: None,
            input_provider: None,
            trace_observer: None,
        })
    }

    /// Provide an output sink. When set, '.' sends bytes to this sink instead of stdout.
    /// The sink receives a single-byte slice per '.'.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.output_sink = Some(Box::new(sink));
    }

    /// Provide an input provider. When set, ',' reads from this provider instead of stdin.
    /// Returning None indicates end of input, handled per [`EofPolicy`].
    pub fn set_input_provider<F>(&mut self, provider: F)
    where
        F: FnMut() -> Option<u8> + Send + 'static,
    {
        self.input_provider = Some(Box::new(provider));
    }

    /// Enable tracing: `observer` sees a [`Snapshot`] after every executed instruction.
    pub fn set_trace_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&Snapshot<'_>) + Send + 'static,
    {
        self.trace_observer = Some(Box::new(observer));
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Return to the initial state (zeroed tape, both cursors at 0). Hooks are kept.
    pub fn reset(&mut self) {
        self.tape = Tape::new(self.config.tape);
        self.pc = 0;
        self.pointer = 0;
        self.steps = 0;
        self.state = State::Running;
        self.resolver.reset();
    }

    /// Execute one instruction and report the resulting state.
    ///
    /// Stepping an engine that is no longer running does nothing.
    pub fn step(&mut self) -> Result<State, EngineError> {
        if self.state != State::Running {
            return Ok(self.state);
        }
        if let Err(e) = self.execute_one() {
            return Err(self.fail(e));
        }
        Ok(self.state)
    }

    /// Execute the program until completion.
    ///
    /// Honors `max_steps` from the configuration.
    pub fn run(&mut self) -> Result<(), EngineError> {
        let control = StepControl::new(self.config.max_steps, Arc::new(AtomicBool::new(false)));
        self.run_with_control(control)
    }

    /// Execute with cooperative cancellation and optional step limit.
    ///
    /// The control's step limit replaces the configured one.
    pub fn run_with_control(&mut self, step_control: StepControl) -> Result<(), EngineError> {
        debug!(pc = self.pc, "run started");
        while self.state == State::Running {
            // Cooperative cancellation check
            if step_control.cancel_flag.load(Ordering::Relaxed) {
                return Err(self.fail(EngineError::Canceled));
            }
            if let Some(limit) = step_control.max_steps {
                if self.steps >= limit {
                    return Err(self.fail(EngineError::StepLimitExceeded { limit }));
                }
            }
            self.step()?;
        }
        debug!(steps = self.steps, "program halted");
        Ok(())
    }

    fn fail(&mut self, err: EngineError) -> EngineError {
        debug!(error = %err, steps = self.steps, "run failed");
        self.state = State::Failed(err.kind());
        err
    }

    fn execute_one(&mut self) -> Result<(), EngineError> {
        let ip = self.pc;
        let Some(instr) = self.program.get(ip) else {
            self.state = State::Halted;
            return Ok(());
        };
        let op = instr.as_char();
        let bounds = |ptr: usize| EngineError::BoundsViolation { ip, ptr, op };

        let ptr_before = self.pointer;
        let cell_before = self.tape.read(ptr_before).map_err(|_| bounds(ptr_before))?;
        let mut action: Option<String> = self.trace_observer.as_ref().map(|_| String::new());

        let next_pc = match instr {
            Instruction::MoveRight => {
                let to = self.pointer + 1;
                self.tape.check(to).map_err(|_| bounds(ptr_before))?;
                self.pointer = to;
                describe(&mut action, || format!("Moved pointer head to index {}", self.pointer));
                ip + 1
            }
            Instruction::MoveLeft => {
                if self.pointer == 0 {
                    return Err(bounds(ptr_before));
                }
                self.pointer -= 1;
                describe(&mut action, || format!("Moved pointer head to index {}", self.pointer));
                ip + 1
            }
            Instruction::Increment => {
                let after = self.tape.increment(self.pointer).map_err(|_| bounds(ptr_before))?;
                describe(&mut action, || {
                    format!("Increment cell[{ptr_before}] from {cell_before} to {after}")
                });
                ip + 1
            }
            Instruction::Decrement => {
                let after = self.tape.decrement(self.pointer).map_err(|_| bounds(ptr_before))?;
                describe(&mut action, || {
                    format!("Decrement cell[{ptr_before}] from {cell_before} to {after}")
                });
                ip + 1
            }
            Instruction::Output => {
                self.emit(ip, cell_before)?;
                describe(&mut action, || {
                    format!("Output byte {} ({:?})", cell_before, cell_before as char)
                });
                ip + 1
            }
            Instruction::Input => {
                match self.next_input(ip)? {
                    Some(b) => {
                        self.tape.write(self.pointer, b).map_err(|_| bounds(ptr_before))?;
                        describe(&mut action, || format!("Read byte -> {b}"));
                    }
                    None => match self.config.eof {
                        EofPolicy::Zero => {
                            self.tape.write(self.pointer, 0).map_err(|_| bounds(ptr_before))?;
                            describe(&mut action, || "End of input (set cell to 0)".to_string());
                        }
                        EofPolicy::Unchanged => {
                            describe(&mut action, || "End of input (cell unchanged)".to_string());
                        }
                        EofPolicy::Error => return Err(EngineError::EndOfInput { ip }),
                    },
                }
                ip + 1
            }
            Instruction::LoopOpen => {
                let target = self.resolver.loop_open(&self.program, ip, cell_before)?;
                if target == ip + 1 {
                    describe(&mut action, || "Enter loop (cell != 0)".to_string());
                } else {
                    trace!(ip, target, "loop skipped");
                    describe(&mut action, || {
                        format!("Cell is 0; jump past matching ']' to IP {target}")
                    });
                }
                target
            }
            Instruction::LoopClose => {
                let target = self.resolver.loop_close(&self.program, ip)?;
                trace!(ip, target, "loop repeat");
                describe(&mut action, || format!("Jump back to matching '[' at IP {target}"));
                target
            }
        };

        self.pc = next_pc;
        if self.pc >= self.program.len() {
            self.state = State::Halted;
        }

        // Notify the trace observer (if any) after applying the instruction's effect.
        if let Some(observer) = self.trace_observer.as_mut() {
            let snapshot = Snapshot {
                step: self.steps,
                ip,
                instruction: instr,
                pc: self.pc,
                code: self.program.text(),
                tape: self.tape.cells(),
                ptr: self.pointer,
                ptr_before,
                cell_before,
                action: action.as_deref().unwrap_or_default(),
            };
            (observer)(&snapshot);
        }

        self.steps += 1;
        Ok(())
    }

    fn emit(&mut self, ip: usize, byte: u8) -> Result<(), EngineError> {
        // Use output sink when provided; fallback to stdout.
        if let Some(sink) = self.output_sink.as_mut() {
            (sink)(&[byte]);
            return Ok(());
        }
        io::stdout()
            .write_all(&[byte])
            .map_err(|source| EngineError::Io { ip, source })
    }

    fn next_input(&mut self, ip: usize) -> Result<Option<u8>, EngineError> {
        // Prefer input provider when set; fall back to stdin.
        if let Some(provider) = self.input_provider.as_mut() {
            return Ok((provider)());
        }
        let mut buf = [0u8; 1];
        loop {
            match io::stdin().read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(EngineError::Io { ip, source }),
            }
        }
    }
}

/// Fill in the trace action text; skipped entirely when nobody observes.
fn describe(action: &mut Option<String>, text: impl FnOnce() -> String) {
    if let Some(a) = action.as_mut() {
        *a = text();
    }
}
