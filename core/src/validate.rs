//! Declaration validation.
//!
//! Catches problems in a declaration list before any token is matched:
//! unknown type markers, reserved names, bindings that do not line up with
//! the format specifier, defaults with the wrong arity and unbalanced help
//! groups. Every process in a group runs the same checks on the same
//! declarations, so they all find the same errors.
//!
//! # Examples
//!
//! ```
//! use clargs_core::*;
//!
//! let decls = Declarations::new().doc_arg("-dims %d %d", "mesh size");
//! assert!(validate_declarations(&decls, RouteMode::BuildDocument).is_empty());
//!
//! // `%q` is not a known type marker
//! let bad = Declarations::new().doc_arg("-dims %q", "mesh size");
//! let errors = validate_declarations(&bad, RouteMode::BuildDocument);
//! assert!(matches!(errors[0], DeclarationError::UnknownTypeMarker { .. }));
//! ```

use thiserror::Error;

use crate::declare::{DeclItem, Declarations, END_OF_ARGS, HELP_SUBSTRING};
use crate::types::{ParamType, RouteMode};

/// A problem found in a declaration list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// A `%` marker is followed by a character that names no type.
    #[error("invalid argument type '%{marker}' encountered at position {position} in \"{format}\"")]
    UnknownTypeMarker {
        format: String,
        /// 1-based parameter slot.
        position: usize,
        marker: char,
    },
    /// A `%` is the last character of the specifier.
    #[error("dangling '%' at end of \"{0}\"")]
    DanglingMarker(String),
    /// The specifier has no literal name before its first marker.
    #[error("argument \"{0}\" has an empty name")]
    EmptyPrefix(String),
    /// The specifier uses a reserved substring.
    #[error("argument \"{format}\" uses the reserved name \"{reserved}\"")]
    ReservedName {
        format: String,
        reserved: &'static str,
    },
    /// Bind-to-memory declarations need one destination per parameter.
    #[error("argument \"{format}\" expects {expected} binding(s), found {found}")]
    BindingCount {
        format: String,
        expected: usize,
        found: usize,
    },
    /// A destination cannot hold the value its slot produces.
    #[error("argument \"{format}\" slot {slot} expects a {expected} binding, found {found}")]
    BindingMismatch {
        format: String,
        slot: usize,
        expected: String,
        found: &'static str,
    },
    /// A default does not supply one token per parameter.
    #[error("default for \"{format}\" has {found} token(s), expected {expected}")]
    DefaultArity {
        format: String,
        expected: usize,
        found: usize,
    },
    /// A help group was closed without being opened, or never closed.
    #[error("unbalanced argument group \"{0}\"")]
    UnbalancedGroup(String),
}

/// Splits a format specifier into its match prefix and parameter types.
///
/// The prefix is the text before the first marker with trailing whitespace
/// removed. A specifier without markers is a presence-only argument and its
/// prefix is the whole specifier. `%%` stands for a literal percent sign.
///
/// # Examples
///
/// ```
/// use clargs_core::{ParamType, parse_format};
///
/// let (prefix, types) = parse_format("-dims %d %f").unwrap();
/// assert_eq!(prefix, "-dims");
/// assert_eq!(types, vec![ParamType::Int, ParamType::Float]);
///
/// let (prefix, types) = parse_format("-multifile").unwrap();
/// assert_eq!(prefix, "-multifile");
/// assert!(types.is_empty());
/// ```
pub fn parse_format(format: &str) -> Result<(String, Vec<ParamType>), DeclarationError> {
    let mut types = Vec::new();
    let mut prefix_end = None;
    let mut chars = format.char_indices();

    while let Some((idx, c)) = chars.next() {
        if c != '%' {
            continue;
        }
        match chars.next() {
            Some((_, '%')) => {}
            Some((_, marker)) => {
                prefix_end.get_or_insert(idx);
                match ParamType::from_marker(marker) {
                    Some(ty) => types.push(ty),
                    None => {
                        return Err(DeclarationError::UnknownTypeMarker {
                            format: format.to_string(),
                            position: types.len() + 1,
                            marker,
                        });
                    }
                }
            }
            None => return Err(DeclarationError::DanglingMarker(format.to_string())),
        }
    }

    let prefix = match prefix_end {
        Some(end) => format[..end].trim_end(),
        None => format,
    };
    if prefix.is_empty() {
        return Err(DeclarationError::EmptyPrefix(format.to_string()));
    }
    Ok((prefix.replace("%%", "%"), types))
}

/// Validates a declaration list for the given route mode.
///
/// Returns every problem found, in declaration order.
pub fn validate_declarations(decls: &Declarations<'_>, route: RouteMode) -> Vec<DeclarationError> {
    let mut errors = Vec::new();
    let mut open_groups: Vec<&str> = Vec::new();

    for item in decls.items() {
        match item {
            DeclItem::GroupBegin { name, .. } => open_groups.push(name),
            DeclItem::GroupEnd { name } => {
                if open_groups.last() == Some(&name.as_str()) {
                    open_groups.pop();
                } else {
                    errors.push(DeclarationError::UnbalancedGroup(name.clone()));
                }
            }
            DeclItem::Arg(arg) => {
                if let Some(reserved) = reserved_substring(&arg.format) {
                    errors.push(DeclarationError::ReservedName {
                        format: arg.format.clone(),
                        reserved,
                    });
                    continue;
                }

                let types = match parse_format(&arg.format) {
                    Ok((_, types)) => types,
                    Err(err) => {
                        errors.push(err);
                        continue;
                    }
                };

                if route == RouteMode::BindToMemory {
                    errors.extend(check_bindings(&arg.format, &types, &arg.bindings));
                }

                if let Some(default) = &arg.default {
                    let expected = types.len().max(1);
                    let found = default.split_whitespace().count();
                    if found != expected {
                        errors.push(DeclarationError::DefaultArity {
                            format: arg.format.clone(),
                            expected,
                            found,
                        });
                    }
                }
            }
        }
    }

    errors.extend(
        open_groups
            .into_iter()
            .map(|name| DeclarationError::UnbalancedGroup(name.to_string())),
    );
    errors
}

fn reserved_substring(format: &str) -> Option<&'static str> {
    [HELP_SUBSTRING, END_OF_ARGS]
        .into_iter()
        .find(|reserved| format.contains(reserved))
}

fn check_bindings(
    format: &str,
    types: &[ParamType],
    bindings: &[crate::declare::Binding<'_>],
) -> Vec<DeclarationError> {
    let expected = types.len().max(1);
    if bindings.len() != expected {
        return vec![DeclarationError::BindingCount {
            format: format.to_string(),
            expected,
            found: bindings.len(),
        }];
    }

    if types.is_empty() {
        return if bindings[0].accepts(None) {
            Vec::new()
        } else {
            vec![DeclarationError::BindingMismatch {
                format: format.to_string(),
                slot: 1,
                expected: "flag or int".to_string(),
                found: bindings[0].kind(),
            }]
        };
    }

    types
        .iter()
        .zip(bindings)
        .enumerate()
        .filter(|(_, (ty, binding))| !binding.accepts(Some(**ty)))
        .map(|(slot, (ty, binding))| DeclarationError::BindingMismatch {
            format: format.to_string(),
            slot: slot + 1,
            expected: ty.to_string(),
            found: binding.kind(),
        })
        .collect()
}
