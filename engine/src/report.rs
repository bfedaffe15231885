//! Result of one processing call.

use clargs_core::{Document, Severity};
use serde::Serialize;

/// Terminal state of a call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Values were routed.
    Ok,
    /// Help was requested; nothing was routed.
    Help,
}

/// A non-fatal message produced while matching, such as a lossy integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Everything a successful call hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseReport {
    pub outcome: Outcome,
    /// Present only in document routing mode with an `Ok` outcome.
    pub document: Option<Document>,
    /// Identical on every member of the group.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseReport {
    pub(crate) fn help() -> Self {
        Self {
            outcome: Outcome::Help,
            document: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn is_help(&self) -> bool {
        self.outcome == Outcome::Help
    }
}
