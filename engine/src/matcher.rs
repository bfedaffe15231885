//! Token matching and value conversion.
//!
//! Walks the agreed token stream from the start index, finds the first
//! declared argument whose prefix starts each token, converts the values
//! that follow it and hands them to a [`Sink`].

use clargs_core::{
    ClargsError, ErrorMode, ParamType, Registry, Result, Severity, parse_leading_float,
    parse_leading_int, parse_presence, scale_int,
};
use tracing::{debug, error, warn};

use crate::report::Diagnostic;
use crate::router::{RoutedValue, Sink};

/// Per-call state shared by matching and default assignment.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'t> {
    /// Program name used in messages.
    pub program: &'t str,
    pub error_mode: ErrorMode,
    /// Only the leader emits log messages.
    pub leader: bool,
}

impl MatchContext<'_> {
    fn report(&self, severity: Severity, message: &str) {
        if !self.leader {
            return;
        }
        match severity {
            Severity::Warning => warn!(program = self.program, "{message}"),
            Severity::Error => error!(program = self.program, "{message}"),
        }
    }
}

/// What a successful matching pass produced.
#[derive(Debug, Default)]
pub struct MatchSummary {
    pub diagnostics: Vec<Diagnostic>,
    /// One flag per descriptor, set when the argument appeared on the command line.
    pub matched: Vec<bool>,
}

/// Final path component of `argv[0]`.
pub fn program_name(tokens: &[String]) -> &str {
    tokens
        .first()
        .map(|arg0| arg0.rsplit('/').next().unwrap_or(arg0.as_str()))
        .unwrap_or_default()
}

/// Matches `tokens[start..]` against the registry and routes every value.
///
/// Integer values that do not fit produce a [`Diagnostic`] and leave the
/// destination untouched; matching continues.
///
/// # Errors
///
/// - [`ClargsError::UnknownArgument`] for a token that matches no
///   declaration, with the severity taken from the error mode.
/// - [`ClargsError::MissingValue`] when fewer tokens remain than the
///   matched argument expects. Nothing is written for that argument.
pub fn match_tokens(
    registry: &mut Registry<'_>,
    tokens: &[String],
    start: usize,
    sink: &mut dyn Sink,
    ctx: &MatchContext<'_>,
) -> Result<MatchSummary> {
    let mut summary = MatchSummary {
        diagnostics: Vec::new(),
        matched: vec![false; registry.len()],
    };

    let mut i = start;
    while i < tokens.len() {
        let token = &tokens[i];
        let Some(index) = registry.find(token) else {
            let err = ClargsError::UnknownArgument {
                program: ctx.program.to_string(),
                token: token.clone(),
                severity: ctx.error_mode.severity(),
            };
            ctx.report(ctx.error_mode.severity(), &err.to_string());
            return Err(err);
        };
        summary.matched[index] = true;

        let param_types = registry.descriptor(index).param_types.clone();
        debug!(token = %token, index, params = param_types.len(), "Matched argument");

        if param_types.is_empty() {
            sink.route(registry.descriptor_mut(index), 0, RoutedValue::Present(true));
            i += 1;
            continue;
        }

        if i + param_types.len() >= tokens.len() {
            let err = ClargsError::MissingValue {
                option: token.clone(),
            };
            ctx.report(Severity::Error, &err.to_string());
            return Err(err);
        }

        let option = token;
        let mut cursor = i;
        for (slot, ty) in param_types.into_iter().enumerate() {
            let value = match ty {
                // Records the cursor, then steps over one token without reading it.
                ParamType::ArgIndex => Some(RoutedValue::ArgIndex(cursor)),
                _ => convert(ty, &tokens[cursor + 1], option, ctx, &mut summary.diagnostics),
            };
            cursor += 1;
            if let Some(value) = value {
                sink.route(registry.descriptor_mut(index), slot, value);
            }
        }
        i = cursor + 1;
    }

    Ok(summary)
}

/// Routes the declared default of every argument that was not matched.
///
/// Defaults are whitespace-separated, one word per parameter. A
/// presence-only argument's default is read as a boolean; one without a
/// default is routed as absent, so its destination reads `false` or 0.
pub fn apply_defaults(
    registry: &mut Registry<'_>,
    matched: &[bool],
    sink: &mut dyn Sink,
    ctx: &MatchContext<'_>,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for index in 0..registry.len() {
        if matched.get(index).copied().unwrap_or(false) {
            continue;
        }
        let descriptor = registry.descriptor(index);
        if descriptor.param_types.is_empty() {
            let on = descriptor
                .default
                .as_deref()
                .and_then(|default| default.split_whitespace().next())
                .is_some_and(parse_presence);
            debug!(option = %descriptor.prefix, on, "Assigning absent flag");
            sink.route(registry.descriptor_mut(index), 0, RoutedValue::Present(on));
            continue;
        }
        let Some(default) = descriptor.default.clone() else {
            continue;
        };
        let option = descriptor.prefix.clone();
        let param_types = descriptor.param_types.clone();
        debug!(option = %option, default = %default, "Assigning default");

        for (slot, (ty, word)) in param_types.into_iter().zip(default.split_whitespace()).enumerate() {
            let value = match ty {
                ParamType::ArgIndex => {
                    usize::try_from(parse_leading_int(word)).ok().map(RoutedValue::ArgIndex)
                }
                _ => convert(ty, word, &option, ctx, &mut diagnostics),
            };
            if let Some(value) = value {
                sink.route(registry.descriptor_mut(index), slot, value);
            }
        }
    }

    diagnostics
}

fn convert(
    ty: ParamType,
    raw: &str,
    option: &str,
    ctx: &MatchContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<RoutedValue> {
    match ty {
        ParamType::Int => match scale_int(raw) {
            Ok(value) => Some(RoutedValue::Int(value)),
            Err(overflow) => {
                let diagnostic = Diagnostic {
                    severity: ctx.error_mode.severity(),
                    message: format!("{overflow} for arg \"{option}\""),
                };
                ctx.report(diagnostic.severity, &diagnostic.message);
                diagnostics.push(diagnostic);
                None
            }
        },
        ParamType::Str => Some(RoutedValue::Str(raw.to_string())),
        ParamType::Float => Some(RoutedValue::Float(parse_leading_float(raw))),
        ParamType::ArgIndex => None,
    }
}
