//! Processing entry point and group-wide agreement.
//!
//! One call moves through these phases on every member of the group:
//!
//! 1. **Help check**: the leader scans every token for `"help"`; the group
//!    adopts its answer.
//! 2. **Declaring**: every member builds its own registry; the declarations
//!    fail for the whole group when they fail on any member.
//! 3. **Help**: the leader prints usage text and every member returns
//!    [`Outcome::Help`] without routing anything.
//! 4. **Agreement**: the leader applies its environment overrides and the
//!    group adopts its flags and token stream.
//! 5. **Matching**: every member matches the agreed tokens with identical
//!    logic, so errors found here need no further agreement.

use clargs_core::{
    ArgvFlags, ClargsError, Declarations, DefaultsMode, HELP_SUBSTRING, Registry, Result,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::fleet::{Collective, Solo, agree};
use crate::help::emit_help;
use crate::matcher::{MatchContext, apply_defaults, match_tokens, program_name};
use crate::report::{Outcome, ParseReport};
use crate::router::sink_for;
use crate::settings::{EnvSource, LeaderSettings, ProcessEnv};

/// The leader's decisions that every member adopts before matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Agreement {
    flags: ArgvFlags,
    tokens: Vec<String>,
}

/// Processes `tokens[start..]` against `decls` on one member of `group`.
///
/// Every member of the group must make this call with the same declaration
/// list. Only the leader's tokens and environment are consulted; the other
/// members adopt them. Routing follows each member's own
/// `flags.route_mode`.
///
/// # Errors
///
/// Returns [`ClargsError::Declaration`] on every member when the
/// declarations are invalid on any member (this takes precedence over a help
/// request). Each member carries its own errors, so a member whose
/// declarations were valid returns an empty list. Otherwise returns any
/// matching error, identically on every member.
///
/// # Examples
///
/// ```
/// use clargs_core::{ArgvFlags, Declarations, RouteMode};
/// use clargs_engine::{MapEnv, Outcome, Solo, process};
///
/// let tokens: Vec<String> = ["macsio", "-multifile", "-dims", "4", "8"]
///     .iter()
///     .map(|t| t.to_string())
///     .collect();
/// let decls = Declarations::new()
///     .doc_arg("-multifile", "one file per dump")
///     .doc_arg("-dims %d %d", "mesh size");
/// let flags = ArgvFlags::default().with_route_mode(RouteMode::BuildDocument);
///
/// let report = process(&Solo, &MapEnv::new(), flags, 1, &tokens, decls).unwrap();
///
/// assert_eq!(report.outcome, Outcome::Ok);
/// let doc = report.document.unwrap();
/// assert_eq!(doc.get("-dims"), Some(&serde_json::json!([4, 8])));
/// ```
pub fn process(
    group: &dyn Collective,
    env: &dyn EnvSource,
    flags: ArgvFlags,
    start: usize,
    tokens: &[String],
    decls: Declarations<'_>,
) -> Result<ParseReport> {
    let leader = group.is_leader();
    let rank = group.rank();

    let help_requested = agree(group, || {
        tokens.iter().any(|token| token.contains(HELP_SUBSTRING))
    })?;
    debug!(rank, phase = "help_check", help_requested, "Help check agreed");

    let built = Registry::build(decls, flags.route_mode);
    let declaration_failed = group.any(built.is_err())?;
    debug!(rank, phase = "declaring", declaration_failed, "Declarations agreed");

    let mut registry = match (built, declaration_failed) {
        (Ok(registry), false) => registry,
        (Err(errors), _) => {
            if leader {
                for err in &errors {
                    error!(%err, "Invalid argument declaration");
                }
            } else {
                debug!(rank, errors = errors.len(), "Member declarations invalid");
            }
            return Err(ClargsError::Declaration(errors));
        }
        (Ok(_), true) => {
            if leader {
                error!("Argument declarations are invalid on another group member");
            }
            return Err(ClargsError::Declaration(Vec::new()));
        }
    };

    if help_requested {
        if leader {
            let settings = LeaderSettings::from_env(env);
            let program = tokens.first().map(String::as_str).unwrap_or_default();
            if let Err(err) = emit_help(program, &registry, settings.help_width) {
                warn!(%err, "Failed to write help text");
            }
        }
        debug!(rank, phase = "help", "Returning help outcome");
        return Ok(ParseReport::help());
    }

    let agreement = agree(group, || Agreement {
        flags: LeaderSettings::from_env(env).apply(flags),
        tokens: tokens.to_vec(),
    })?;
    debug!(
        rank,
        phase = "agreement",
        error_mode = ?agreement.flags.error_mode,
        tokens = agreement.tokens.len(),
        "Token stream agreed"
    );

    let ctx = MatchContext {
        program: program_name(&agreement.tokens),
        error_mode: agreement.flags.error_mode,
        leader,
    };
    let mut sink = sink_for(flags.route_mode);
    let mut summary = match_tokens(&mut registry, &agreement.tokens, start, sink.as_mut(), &ctx)?;

    if agreement.flags.defaults_mode == DefaultsMode::Assign {
        let diagnostics = apply_defaults(&mut registry, &summary.matched, sink.as_mut(), &ctx);
        summary.diagnostics.extend(diagnostics);
    }
    debug!(
        rank,
        phase = "matching",
        diagnostics = summary.diagnostics.len(),
        "Matching complete"
    );

    Ok(ParseReport {
        outcome: Outcome::Ok,
        document: sink.finish(),
        diagnostics: summary.diagnostics,
    })
}

/// Processes the command line of a standalone program.
///
/// Equivalent to [`process`] with a group of one and the real process
/// environment.
pub fn process_local(
    flags: ArgvFlags,
    start: usize,
    tokens: &[String],
    decls: Declarations<'_>,
) -> Result<ParseReport> {
    process(&Solo, &ProcessEnv, flags, start, tokens, decls)
}
