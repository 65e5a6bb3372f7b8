pub mod repl;
pub mod run;

use clap::Args;

use crate::config::{self, ConfigError, EngineConfig, EofPolicy};
use crate::{Filter, Strategy, TapePolicy};

/// Engine flags shared by `run` and `repl`.
#[derive(Args, Debug, Default, Clone)]
pub struct EngineArgs {
    /// Tape policy: growable, fixed or fixed:N (fallback BF_TAPE; default fixed:30000)
    #[arg(long = "tape", value_name = "POLICY")]
    pub tape: Option<TapePolicy>,

    /// What `,` does at end of input: zero, unchanged or error (fallback BF_EOF; default zero)
    #[arg(long = "eof", value_name = "POLICY")]
    pub eof: Option<EofPolicy>,

    /// Loop resolution: stack or rescan (fallback BF_STRATEGY; default stack)
    #[arg(long = "strategy", value_name = "NAME")]
    pub strategy: Option<Strategy>,

    /// Reject characters outside ><+-.,[] instead of treating them as comments
    #[arg(long = "no-filter")]
    pub no_filter: bool,

    /// Report unmatched brackets when they are reached instead of before running
    #[arg(long = "lazy-brackets")]
    pub lazy_brackets: bool,

    /// Maximum interpreter steps before abort, 0 for unlimited (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Wall-clock timeout in milliseconds, 0 for none (fallback BF_TIMEOUT_MS; default 2_000)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

impl EngineArgs {
    /// Resolve the engine configuration: flags -> env -> config file -> defaults.
    pub fn resolve(&self) -> Result<EngineConfig, ConfigError> {
        let mut cfg = config::file_defaults().apply_env()?;
        if let Some(tape) = self.tape {
            cfg.tape = tape;
        }
        if let Some(eof) = self.eof {
            cfg.eof = eof;
        }
        if let Some(strategy) = self.strategy {
            cfg.strategy = strategy;
        }
        if self.no_filter {
            cfg.filter = Filter::Reject;
        }
        if self.lazy_brackets {
            cfg.validate_brackets = false;
        }
        if let Some(n) = self.max_steps {
            cfg.max_steps = (n > 0).then_some(n);
        }
        Ok(cfg)
    }

    pub fn limits(&self) -> Result<run::Limits, ConfigError> {
        run::Limits::resolve(self.timeout_ms)
    }
}
