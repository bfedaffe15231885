use std::thread;

use clargs_core::{
    ArgvFlags, Binding, ClargsError, Declarations, ErrorMode, RouteMode, Severity,
};
use clargs_engine::settings::{COLUMNS_VAR, IGNORE_UNKNOWN_VAR};
use clargs_engine::{
    Collective, MapEnv, Outcome, ParseReport, Solo, ThreadGroup, process, render_help,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn doc_flags() -> ArgvFlags {
    ArgvFlags::default().with_route_mode(RouteMode::BuildDocument)
}

fn macsio_decls() -> Declarations<'static> {
    Declarations::new()
        .doc_arg("--interface %s", "I/O library to use")
        .doc_arg("-multifile", "use a file per dump")
        .doc_arg("-dims %d %d", "mesh size")
        .doc_arg("--part_size %d", "bytes per part")
        .doc_arg("--plugin-args %n", "start of plugin arguments")
}

/// Runs `process` in document mode on every member of a thread group.
///
/// `tokens_for` and `env_for` give each rank its own view of the command
/// line and environment.
fn run_group<T, E>(
    size: usize,
    tokens_for: T,
    env_for: E,
) -> Vec<Result<ParseReport, ClargsError>>
where
    T: Fn(usize) -> Vec<String> + Send + Sync + Copy + 'static,
    E: Fn(usize) -> MapEnv + Send + Sync + Copy + 'static,
{
    let handles: Vec<_> = ThreadGroup::spawn_members(size)
        .into_iter()
        .map(|member| {
            thread::spawn(move || {
                let rank = member.rank();
                let tokens = tokens_for(rank);
                process(&member, &env_for(rank), doc_flags(), 1, &tokens, macsio_decls())
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

// ---------------------------------------------------------------------------
// Binding to caller memory
// ---------------------------------------------------------------------------

#[test]
fn test_flag_and_pair_are_bound() {
    let mut multifile = 0;
    let (mut ni, mut nj) = (0, 0);
    let tokens = argv(&["prog", "-multifile", "-dims", "4", "8"]);
    let decls = Declarations::new()
        .arg("-multifile", "use a file per dump", vec![Binding::Int(&mut multifile)])
        .arg("-dims %d %d", "mesh size", vec![Binding::Int(&mut ni), Binding::Int(&mut nj)]);

    let report = process(&Solo, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls).unwrap();

    assert_eq!(report.outcome, Outcome::Ok);
    assert!(report.document.is_none());
    assert_eq!(multifile, 1);
    assert_eq!((ni, nj), (4, 8));
}

#[test]
fn test_help_anywhere_short_circuits_without_writes() {
    let mut multifile = false;
    let mut ni = 0;
    let tokens = argv(&["prog", "-multifile", "-n", "4", "--help"]);
    let decls = Declarations::new()
        .flag("-multifile", "use a file per dump", &mut multifile)
        .arg("-n %d", "count", vec![Binding::Int(&mut ni)]);

    let report = process(&Solo, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls).unwrap();

    assert_eq!(report.outcome, Outcome::Help);
    assert!(!multifile);
    assert_eq!(ni, 0);
}

#[test]
fn test_missing_value_is_an_error_with_nothing_written() {
    let (mut ni, mut nj) = (-1, -1);
    let tokens = argv(&["prog", "-dims", "4"]);
    let decls = Declarations::new().arg(
        "-dims %d %d",
        "mesh size",
        vec![Binding::Int(&mut ni), Binding::Int(&mut nj)],
    );

    let err = process(&Solo, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls).unwrap_err();

    assert!(matches!(err, ClargsError::MissingValue { .. }));
    assert!(err.is_fatal());
    assert_eq!((ni, nj), (-1, -1));
}

#[test]
fn test_unknown_argument_is_an_error_in_both_modes() {
    for (mode, severity) in [
        (ErrorMode::Abort, Severity::Error),
        (ErrorMode::Warn, Severity::Warning),
    ] {
        let tokens = argv(&["/usr/local/bin/prog", "-bogus"]);
        let flags = doc_flags().with_error_mode(mode);

        let err = process(&Solo, &MapEnv::new(), flags, 1, &tokens, macsio_decls()).unwrap_err();

        match err {
            ClargsError::UnknownArgument {
                program,
                token,
                severity: got,
            } => {
                assert_eq!(program, "prog");
                assert_eq!(token, "-bogus");
                assert_eq!(got, severity);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn test_overflow_is_reported_and_processing_continues() {
    let mut size = 3;
    let mut multifile = false;
    let tokens = argv(&["prog", "--part_size", "2g", "-multifile"]);
    let decls = Declarations::new()
        .arg("--part_size %d", "bytes per part", vec![Binding::Int(&mut size)])
        .flag("-multifile", "use a file per dump", &mut multifile);

    let report = process(&Solo, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls).unwrap();

    assert_eq!(size, 3);
    assert!(multifile);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].severity, Severity::Error);
}

#[test]
fn test_one_gig_fits() {
    let mut size = 0;
    let tokens = argv(&["prog", "--part_size", "1g"]);
    let decls =
        Declarations::new().arg("--part_size %d", "bytes per part", vec![Binding::Int(&mut size)]);

    let report = process(&Solo, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls).unwrap();

    assert!(report.diagnostics.is_empty());
    assert_eq!(size, 1 << 30);
}

#[test]
fn test_absent_flag_is_assigned_zero() {
    let mut multifile = 7;
    let mut size = 0;
    let tokens = argv(&["prog", "--part_size", "4"]);
    let decls = Declarations::new()
        .arg("-multifile", "use a file per dump", vec![Binding::Int(&mut multifile)])
        .arg("--part_size %d", "bytes per part", vec![Binding::Int(&mut size)]);

    let report = process(&Solo, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls).unwrap();

    assert_eq!(report.outcome, Outcome::Ok);
    assert_eq!(multifile, 0);
    assert_eq!(size, 4);
}

#[test]
fn test_existing_string_buffer_is_overwritten() {
    let mut interface = Some(String::from("miftmpl"));
    let tokens = argv(&["prog", "--interface", "hdf5"]);
    let decls = Declarations::new().arg(
        "--interface %s",
        "I/O library",
        vec![Binding::Str(&mut interface)],
    );

    process(&Solo, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls).unwrap();

    assert_eq!(interface.as_deref(), Some("hdf5"));
}

#[test]
fn test_repeated_scalar_keeps_last_value_in_memory() {
    let mut ni = 0;
    let tokens = argv(&["prog", "-n", "1", "-n", "2"]);
    let decls = Declarations::new().arg("-n %d", "count", vec![Binding::Int(&mut ni)]);

    process(&Solo, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls).unwrap();

    assert_eq!(ni, 2);
}

#[test]
fn test_binding_mismatch_is_a_declaration_error() {
    let mut rate = 0.0;
    let tokens = argv(&["prog"]);
    let decls = Declarations::new().arg("-n %d", "count", vec![Binding::Float(&mut rate)]);

    let err = process(&Solo, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls).unwrap_err();

    assert!(matches!(err, ClargsError::Declaration(ref errors) if errors.len() == 1));
}

// ---------------------------------------------------------------------------
// Structured document
// ---------------------------------------------------------------------------

#[test]
fn test_document_promotes_repeated_keys() {
    let tokens = argv(&[
        "prog",
        "-dims",
        "4",
        "8",
        "--interface",
        "hdf5",
        "--interface",
        "silo",
        "-multifile",
    ]);

    let report = process(&Solo, &MapEnv::new(), doc_flags(), 1, &tokens, macsio_decls()).unwrap();
    let doc = report.document.unwrap();

    assert_eq!(doc.get("-dims"), Some(&json!([4, 8])));
    assert_eq!(doc.get("--interface"), Some(&json!(["hdf5", "silo"])));
    assert_eq!(doc.get("-multifile"), Some(&json!(true)));
    assert_eq!(
        doc.keys().collect::<Vec<_>>(),
        vec!["-dims", "--interface", "-multifile"]
    );
}

#[test]
fn test_document_records_arg_index_under_reserved_key() {
    let tokens = argv(&["prog", "-multifile", "--plugin-args", "skipped"]);

    let report = process(&Solo, &MapEnv::new(), doc_flags(), 1, &tokens, macsio_decls()).unwrap();
    let doc = report.document.unwrap();

    assert_eq!(doc.get("argi"), Some(&json!(2)));
    assert_eq!(doc.len(), 2);
}

#[test]
fn test_start_index_skips_leading_tokens() {
    let tokens = argv(&["prog", "positional", "-multifile"]);

    let report = process(&Solo, &MapEnv::new(), doc_flags(), 2, &tokens, macsio_decls()).unwrap();

    assert_eq!(report.document.unwrap().len(), 1);
}

#[test]
fn test_document_defaults_fill_unmatched_keys() {
    let tokens = argv(&["prog", "-multifile"]);
    let decls = Declarations::new()
        .doc_arg("-multifile", "use a file per dump")
        .doc_arg("--part_size %d", "bytes per part")
        .with_default("80k");

    let report = process(&Solo, &MapEnv::new(), doc_flags(), 1, &tokens, decls).unwrap();
    let doc = report.document.unwrap();

    assert_eq!(doc.get("--part_size"), Some(&json!(81920)));
}

// ---------------------------------------------------------------------------
// Help rendering
// ---------------------------------------------------------------------------

#[test]
fn test_rendered_help_wraps_long_text() {
    let registry = clargs_core::Registry::build(
        Declarations::new().doc_arg("-x", "abcdefghijklmnopqrst"),
        RouteMode::BuildDocument,
    )
    .unwrap();

    let text = render_help("prog", &registry, 10);

    assert_eq!(
        text,
        "usage and help for prog\n   -x\n      abcdefghij-\n      klmnopqrst\n"
    );
}

// ---------------------------------------------------------------------------
// Cooperating groups
// ---------------------------------------------------------------------------

#[test]
fn test_group_members_adopt_leader_tokens() {
    let results = run_group(
        4,
        |rank| {
            if rank == 0 {
                argv(&["prog", "-dims", "4", "8", "--part_size", "1k"])
            } else {
                argv(&["prog", "--bogus-local-view"])
            }
        },
        |_| MapEnv::new(),
    );

    let leader = results[0].as_ref().unwrap();
    assert_eq!(leader.outcome, Outcome::Ok);
    assert_eq!(
        leader.document.as_ref().unwrap().get("--part_size"),
        Some(&json!(1024))
    );
    for result in &results {
        assert_eq!(result.as_ref().unwrap(), leader);
    }
}

#[test]
fn test_group_members_adopt_leader_help_decision() {
    let results = run_group(
        3,
        |rank| {
            if rank == 0 {
                argv(&["prog", "--help"])
            } else {
                argv(&["prog", "-multifile"])
            }
        },
        |_| MapEnv::new(),
    );

    for result in results {
        assert_eq!(result.unwrap().outcome, Outcome::Help);
    }
}

#[test]
fn test_group_members_adopt_leader_error_mode() {
    let results = run_group(
        3,
        |_| argv(&["prog", "-bogus"]),
        |rank| {
            if rank == 0 {
                MapEnv::new().with(IGNORE_UNKNOWN_VAR, "")
            } else {
                MapEnv::new().with(COLUMNS_VAR, "40")
            }
        },
    );

    for result in results {
        match result {
            Err(ClargsError::UnknownArgument { program, token, severity }) => {
                assert_eq!(program, "prog");
                assert_eq!(token, "-bogus");
                assert_eq!(severity, Severity::Warning);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

#[test]
fn test_group_members_agree_on_declaration_failure() {
    let handles: Vec<_> = ThreadGroup::spawn_members(3)
        .into_iter()
        .map(|member| {
            thread::spawn(move || {
                let tokens = argv(&["prog"]);
                let decls = Declarations::new().doc_arg("--help-me", "reserved name");
                let result = process(&member, &MapEnv::new(), doc_flags(), 1, &tokens, decls);
                matches!(result, Err(ClargsError::Declaration(_)))
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_declaration_failure_on_one_follower_fails_every_member() {
    let handles: Vec<_> = ThreadGroup::spawn_members(2)
        .into_iter()
        .map(|member| {
            thread::spawn(move || {
                let tokens = argv(&["prog", "-n", "3"]);
                let mut count = 0.0_f64;
                let result = if member.is_leader() {
                    let decls = Declarations::new().doc_arg("-n %d", "count");
                    process(&member, &MapEnv::new(), doc_flags(), 1, &tokens, decls)
                } else {
                    let decls =
                        Declarations::new().arg("-n %d", "count", vec![Binding::Float(&mut count)]);
                    process(&member, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls)
                };
                (member.rank(), result, count)
            })
        })
        .collect();

    for handle in handles {
        let (rank, result, count) = handle.join().unwrap();
        assert_eq!(count, 0.0);
        match result {
            Err(ClargsError::Declaration(errors)) => assert_eq!(errors.len(), rank),
            other => panic!("rank {rank}: unexpected result: {other:?}"),
        }
    }
}
