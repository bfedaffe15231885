//! Environment-derived settings.
//!
//! Two variables influence a processing call: `COLUMNS` sets the help wrap
//! width and `CLARGS_IGNORE_UNKNOWN_ARGS` downgrades unknown-argument
//! reports to warnings. Only the leader reads them; the rest of the group
//! adopts the leader's values.

use std::collections::HashMap;

use clargs_core::{ArgvFlags, ErrorMode, parse_leading_int};
use serde::{Deserialize, Serialize};

/// Terminal width variable.
pub const COLUMNS_VAR: &str = "COLUMNS";

/// When set (to anything), unknown arguments are reported as warnings.
pub const IGNORE_UNKNOWN_VAR: &str = "CLARGS_IGNORE_UNKNOWN_ARGS";

/// Terminal width assumed when `COLUMNS` is unset or not numeric.
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Columns reserved for indentation and continuation marks.
pub const HELP_MARGIN: usize = 10;

/// Narrowest help text column ever used.
pub const MIN_HELP_WIDTH: usize = 10;

/// Source of environment variables.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables.
///
/// # Examples
///
/// ```
/// use clargs_engine::settings::{EnvSource, MapEnv};
///
/// let env = MapEnv::new().with("COLUMNS", "120");
/// assert_eq!(env.var("COLUMNS").as_deref(), Some("120"));
/// assert_eq!(env.var("HOME"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Settings the leader derives from its environment.
///
/// # Examples
///
/// ```
/// use clargs_engine::settings::{LeaderSettings, MapEnv};
///
/// let settings = LeaderSettings::from_env(&MapEnv::new());
/// assert_eq!(settings.help_width, 70);
/// assert!(!settings.ignore_unknown);
///
/// let env = MapEnv::new()
///     .with("COLUMNS", "132")
///     .with("CLARGS_IGNORE_UNKNOWN_ARGS", "");
/// let settings = LeaderSettings::from_env(&env);
/// assert_eq!(settings.help_width, 122);
/// assert!(settings.ignore_unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderSettings {
    /// Characters of help text per line.
    pub help_width: usize,
    /// Unknown arguments are reported as warnings.
    pub ignore_unknown: bool,
}

impl Default for LeaderSettings {
    fn default() -> Self {
        Self {
            help_width: DEFAULT_TERMINAL_WIDTH - HELP_MARGIN,
            ignore_unknown: false,
        }
    }
}

impl LeaderSettings {
    pub fn from_env(env: &dyn EnvSource) -> Self {
        let help_width = env
            .var(COLUMNS_VAR)
            .filter(|value| value.starts_with(|c: char| c.is_ascii_digit()))
            .and_then(|value| usize::try_from(parse_leading_int(&value)).ok())
            .map_or(DEFAULT_TERMINAL_WIDTH - HELP_MARGIN, |columns| {
                columns.saturating_sub(HELP_MARGIN).max(MIN_HELP_WIDTH)
            });

        Self {
            help_width,
            ignore_unknown: env.var(IGNORE_UNKNOWN_VAR).is_some(),
        }
    }

    /// Applies the environment override to the caller's flags.
    pub fn apply(&self, flags: ArgvFlags) -> ArgvFlags {
        if self.ignore_unknown {
            flags.with_error_mode(ErrorMode::Warn)
        } else {
            flags
        }
    }
}
