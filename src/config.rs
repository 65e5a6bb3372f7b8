//! Engine configuration and its sources.
//!
//! Values resolve as: CLI flags -> environment -> `bf.toml` -> defaults. This
//! module owns the last three layers; the CLI applies its flags on top.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use cross_xdg::BaseDirs;
use tracing::{debug, warn};

use crate::program::Filter;
use crate::resolver::Strategy;
use crate::tape::TapePolicy;

/// What `,` does when the input source is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EofPolicy {
    /// Store 0 in the current cell.
    #[default]
    Zero,
    /// Leave the current cell untouched.
    Unchanged,
    /// Fail the run with `EngineError::EndOfInput`.
    Error,
}

impl fmt::Display for EofPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EofPolicy::Zero => write!(f, "zero"),
            EofPolicy::Unchanged => write!(f, "unchanged"),
            EofPolicy::Error => write!(f, "error"),
        }
    }
}

impl FromStr for EofPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "0" => Ok(EofPolicy::Zero),
            "unchanged" | "keep" => Ok(EofPolicy::Unchanged),
            "error" | "fail" => Ok(EofPolicy::Error),
            other => Err(format!("invalid EOF policy: {other} (expected 'zero', 'unchanged' or 'error')")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Everything that shapes a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub filter: Filter,
    pub tape: TapePolicy,
    pub eof: EofPolicy,
    pub strategy: Strategy,
    /// Reject unbalanced programs before the first step. When off, the
    /// resolver reports the imbalance on the first jump that needs it.
    pub validate_brackets: bool,
    pub max_steps: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter: Filter::Strip,
            tape: TapePolicy::default(),
            eof: EofPolicy::Zero,
            strategy: Strategy::Stack,
            validate_brackets: true,
            max_steps: None,
        }
    }
}

impl EngineConfig {
    pub fn with_tape(mut self, tape: TapePolicy) -> Self {
        self.tape = tape;
        self
    }

    pub fn with_eof(mut self, eof: EofPolicy) -> Self {
        self.eof = eof;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_bracket_validation(mut self, validate: bool) -> Self {
        self.validate_brackets = validate;
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Apply one `key = value` setting. Shared by the file and env layers.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue { key: key.to_string(), reason };
        match key {
            "tape" => self.tape = value.parse().map_err(invalid)?,
            "eof" => self.eof = value.parse().map_err(invalid)?,
            "strategy" => self.strategy = value.parse().map_err(invalid)?,
            "filter" => {
                self.filter = if parse_bool(value).map_err(invalid)? {
                    Filter::Strip
                } else {
                    Filter::Reject
                }
            }
            "validate" => self.validate_brackets = parse_bool(value).map_err(invalid)?,
            "max_steps" => {
                let n = value
                    .trim()
                    .replace('_', "")
                    .parse::<usize>()
                    .map_err(|e| invalid(e.to_string()))?;
                self.max_steps = (n > 0).then_some(n);
            }
            _ => debug!(key, "ignoring unknown config key"),
        }
        Ok(())
    }

    /// Overlay `BF_TAPE`, `BF_EOF`, `BF_STRATEGY` and `BF_MAX_STEPS`.
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        for (var, key) in [
            ("BF_TAPE", "tape"),
            ("BF_EOF", "eof"),
            ("BF_STRATEGY", "strategy"),
            ("BF_MAX_STEPS", "max_steps"),
        ] {
            if let Ok(value) = std::env::var(var) {
                self.set(key, &value)?;
            }
        }
        Ok(self)
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("expected a boolean, got {other}")),
    }
}

static FILE_DEFAULTS: OnceLock<EngineConfig> = OnceLock::new();

/// Defaults overlaid with `bf.toml`, loaded once per process.
pub fn file_defaults() -> EngineConfig {
    *FILE_DEFAULTS.get_or_init(|| match load_from_toml() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "ignoring config file");
            EngineConfig::default()
        }
    })
}

/// `<config home>/bf.toml`, e.g. `~/.config/bf.toml` on Linux.
pub fn config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

fn load_from_toml() -> Result<EngineConfig, ConfigError> {
    let Some(path) = config_path() else {
        return Ok(EngineConfig::default());
    };
    let content = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(EngineConfig::default()),
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    debug!(path = %path.display(), "loading config file");
    parse_engine_section(&content, EngineConfig::default())
}

/// Read the `[engine]` table of a small TOML document on top of `base`.
///
/// Only flat `key = value` lines are understood; values may be quoted.
pub fn parse_engine_section(content: &str, base: EngineConfig) -> Result<EngineConfig, ConfigError> {
    let mut in_engine = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_engine = line[1..line.len() - 1].trim() == "engine";
            continue;
        }
        if !in_engine {
            continue;
        }
        if let Some((key, val_raw)) = line.split_once('=') {
            let val_raw = val_raw.trim();
            let val = if val_raw.len() >= 2 && val_raw.starts_with('"') && val_raw.ends_with('"') {
                &val_raw[1..val_raw.len() - 1]
            } else {
                val_raw
            };
            map.insert(key.trim().to_string(), val.to_string());
        }
    }

    let mut cfg = base;
    for (key, value) in &map {
        cfg.set(key, value)?;
    }
    Ok(cfg)
}
