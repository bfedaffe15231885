//! Parameter types and processing flags.
//!
//! This module defines the small closed vocabularies shared by the registry,
//! the matcher and the fleet agreement step. Everything that crosses a
//! process boundary ([`ArgvFlags`] and its parts) is serializable with
//! [`serde`].

use serde::{Deserialize, Serialize};

/// Conversion applied to one value slot of a declared argument.
///
/// Each `%<marker>` in a format specifier yields one `ParamType`.
///
/// # Examples
///
/// ```
/// use clargs_core::ParamType;
///
/// assert_eq!(ParamType::from_marker('d'), Some(ParamType::Int));
/// assert_eq!(ParamType::from_marker('x'), None);
/// assert_eq!(ParamType::Float.marker(), 'f');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    /// Signed integer, with an optional size-unit suffix (`%d`).
    Int,
    /// Verbatim string (`%s`).
    Str,
    /// Decimal floating point (`%f`).
    Float,
    /// Index of the cursor in the token stream (`%n`).
    ArgIndex,
}

impl ParamType {
    /// Maps a marker character to its parameter type.
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            'd' => Some(Self::Int),
            's' => Some(Self::Str),
            'f' => Some(Self::Float),
            'n' => Some(Self::ArgIndex),
            _ => None,
        }
    }

    /// Returns the marker character for this type.
    pub fn marker(self) -> char {
        match self {
            Self::Int => 'd',
            Self::Str => 's',
            Self::Float => 'f',
            Self::ArgIndex => 'n',
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Str => write!(f, "string"),
            Self::Float => write!(f, "float"),
            Self::ArgIndex => write!(f, "argi"),
        }
    }
}

/// Severity of a user-facing diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// How unknown arguments and lossy integers are reported.
///
/// The mode only changes the severity of the emitted message. An unknown
/// argument ends processing with an error in both modes.
///
/// # Examples
///
/// ```
/// use clargs_core::{ErrorMode, Severity};
///
/// assert_eq!(ErrorMode::default(), ErrorMode::Abort);
/// assert_eq!(ErrorMode::Warn.severity(), Severity::Warning);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    Warn,
    #[default]
    Abort,
}

impl ErrorMode {
    /// Severity used for messages emitted under this mode.
    pub fn severity(self) -> Severity {
        match self {
            Self::Warn => Severity::Warning,
            Self::Abort => Severity::Error,
        }
    }
}

/// Where converted values are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Write straight into caller-owned destinations.
    #[default]
    BindToMemory,
    /// Collect values into a [`Document`](crate::Document) returned to the caller.
    BuildDocument,
}

/// Whether declared defaults are applied to arguments absent from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultsMode {
    #[default]
    Assign,
    Skip,
}

/// Per-call processing flags.
///
/// # Examples
///
/// ```
/// use clargs_core::{ArgvFlags, ErrorMode, RouteMode};
///
/// let flags = ArgvFlags::default()
///     .with_error_mode(ErrorMode::Warn)
///     .with_route_mode(RouteMode::BuildDocument);
/// assert_eq!(flags.error_mode, ErrorMode::Warn);
/// assert_eq!(flags.route_mode, RouteMode::BuildDocument);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArgvFlags {
    pub error_mode: ErrorMode,
    pub route_mode: RouteMode,
    pub defaults_mode: DefaultsMode,
}

impl ArgvFlags {
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    pub fn with_route_mode(mut self, mode: RouteMode) -> Self {
        self.route_mode = mode;
        self
    }

    pub fn with_defaults_mode(mut self, mode: DefaultsMode) -> Self {
        self.defaults_mode = mode;
        self
    }
}
