//! Error types for argument processing.
//!
//! [`ClargsError`] is the error outcome of one processing call. Every
//! variant is reached identically on every process of a cooperating group,
//! either because the leader's decision was broadcast or because the same
//! logic ran over the same agreed tokens.

use thiserror::Error;

use crate::types::Severity;
use crate::validate::DeclarationError;

/// Failures of the collective agreement primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FleetError {
    /// A non-root process offered a payload to a broadcast.
    #[error("rank {rank} is not the broadcast root but supplied a payload")]
    UnexpectedPayload { rank: usize },
    /// The root process called broadcast without a payload.
    #[error("broadcast root {root} supplied no payload")]
    MissingPayload { root: usize },
    /// The requested root does not exist in the group.
    #[error("broadcast root {root} is outside a group of {size}")]
    InvalidRoot { root: usize, size: usize },
    /// Another member left the group while a collective was in flight.
    #[error("cooperating group was disbanded")]
    Disbanded,
}

/// Errors that end a processing call.
#[derive(Debug, Error)]
pub enum ClargsError {
    /// The declaration list is invalid on the leader.
    ///
    /// Only the leader carries the individual problems; other processes
    /// receive the agreed verdict with an empty list.
    #[error("invalid argument declarations ({} problem(s))", .0.len())]
    Declaration(Vec<DeclarationError>),

    /// A token matched no declared argument.
    #[error("{program}: unknown argument {token}. Type {program} --help for help")]
    UnknownArgument {
        program: String,
        token: String,
        severity: Severity,
    },

    /// An argument expects more values than remain on the command line.
    #[error("too few arguments for command-line option {option}")]
    MissingValue { option: String },

    /// The collective agreement step failed.
    #[error("fleet agreement failed: {0}")]
    Fleet(#[from] FleetError),

    /// A broadcast payload could not be encoded or decoded.
    #[error("agreement payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ClargsError {
    /// Returns `true` for errors that abort regardless of the error mode.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingValue { .. } | Self::Fleet(_) | Self::Payload(_)
        )
    }
}

/// Convenience alias for results with [`ClargsError`].
pub type Result<T> = std::result::Result<T, ClargsError>;
