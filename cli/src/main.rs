mod manifest;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use clap::{Args, Parser, Subcommand};
use clargs_core::{ArgvFlags, DefaultsMode, ErrorMode, Registry, RouteMode};
use clargs_engine::{Collective, Outcome, ParseReport, ProcessEnv, ThreadGroup, process};
use tracing_subscriber::EnvFilter;

use crate::manifest::DeclarationManifest;

/// Exit status when help was requested.
const EXIT_HELP: u8 = 2;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "clargs-fleet")]
#[command(about = "Run argument declaration manifests through the clargs engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match a command line against a manifest on a simulated process group.
    Run(RunArgs),
    /// Validate the declarations in a manifest.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Declaration manifest (YAML, or JSON with a .json extension).
    #[arg(long)]
    manifest: PathBuf,
    /// Number of cooperating ranks to simulate.
    #[arg(long, default_value_t = 1)]
    ranks: usize,
    /// Index of the first token to match; index 0 is the program name.
    #[arg(long, default_value_t = 1)]
    start_index: usize,
    /// Report unknown arguments as warnings.
    #[arg(long)]
    warn_unknown: bool,
    /// Do not assign declared defaults to unmatched arguments.
    #[arg(long)]
    skip_defaults: bool,
    /// Output format for the result document.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Command-line tokens to match, after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Declaration manifest (YAML, or JSON with a .json extension).
    #[arg(long)]
    manifest: PathBuf,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run_fleet(args),
        Command::Check(args) => run_check(args),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_fleet(args: RunArgs) -> Result<ExitCode, String> {
    let manifest = Arc::new(load_manifest(&args.manifest)?);

    let mut tokens = Vec::with_capacity(args.tokens.len() + 1);
    tokens.push(manifest.program().to_string());
    tokens.extend(args.tokens);
    let tokens = Arc::new(tokens);

    let mut flags = ArgvFlags::default().with_route_mode(RouteMode::BuildDocument);
    if args.warn_unknown {
        flags = flags.with_error_mode(ErrorMode::Warn);
    }
    if args.skip_defaults {
        flags = flags.with_defaults_mode(DefaultsMode::Skip);
    }

    let results = run_ranks(args.ranks, &manifest, &tokens, flags, args.start_index)?;
    let leader = check_agreement(results)?;

    match leader {
        Ok(report) if report.outcome == Outcome::Help => Ok(ExitCode::from(EXIT_HELP)),
        Ok(report) => {
            print_report(&report, args.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Err(err),
    }
}

/// Runs the engine on every rank of a fresh thread group.
fn run_ranks(
    ranks: usize,
    manifest: &Arc<DeclarationManifest>,
    tokens: &Arc<Vec<String>>,
    flags: ArgvFlags,
    start: usize,
) -> Result<Vec<Result<ParseReport, String>>, String> {
    let handles: Vec<_> = ThreadGroup::spawn_members(ranks)
        .into_iter()
        .map(|member| {
            let manifest = Arc::clone(manifest);
            let tokens = Arc::clone(tokens);
            thread::spawn(move || {
                tracing::debug!(rank = member.rank(), "Rank started");
                process(
                    &member,
                    &ProcessEnv,
                    flags,
                    start,
                    &tokens,
                    manifest.declarations(),
                )
                .map_err(|err| err.to_string())
            })
        })
        .collect();

    handles
        .into_iter()
        .enumerate()
        .map(|(rank, handle)| {
            handle
                .join()
                .map_err(|_| format!("rank {rank} panicked"))
        })
        .collect()
}

/// Returns the leader's result after checking that every rank matches it.
fn check_agreement(
    results: Vec<Result<ParseReport, String>>,
) -> Result<Result<ParseReport, String>, String> {
    let mut results = results.into_iter();
    let leader = results
        .next()
        .ok_or_else(|| "process group has no members".to_string())?;

    for (offset, result) in results.enumerate() {
        if result != leader {
            return Err(format!("rank {} diverged from the leader", offset + 1));
        }
    }
    Ok(leader)
}

fn print_report(report: &ParseReport, format: CliOutputFormat) -> Result<(), String> {
    let Some(document) = &report.document else {
        return Ok(());
    };
    let text = match format {
        CliOutputFormat::Json => document
            .to_json_pretty()
            .map_err(|err| format!("Failed to serialize document: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(document)
            .map_err(|err| format!("Failed to serialize document: {err}"))?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<ExitCode, String> {
    let manifest = load_manifest(&args.manifest)?;

    match Registry::build(manifest.declarations(), RouteMode::BuildDocument) {
        Ok(registry) => {
            println!(
                "{}: {} argument(s) declared",
                args.manifest.display(),
                registry.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            for err in &errors {
                eprintln!("{}: {err}", args.manifest.display());
            }
            Err(format!("{} declaration error(s)", errors.len()))
        }
    }
}

fn load_manifest(path: &std::path::Path) -> Result<DeclarationManifest, String> {
    DeclarationManifest::load(path)
        .map_err(|err| format!("Failed to load manifest '{}': {err}", path.display()))
}
