//! Fleet-consistent command-line processing.
//!
//! [`process`] matches a token stream against a [`Declarations`] list and
//! routes every value either into caller-owned destinations or into a
//! [`Document`]. When the program runs as a group of cooperating processes
//! that share one command line, every member calls [`process`] with its own
//! [`Collective`] handle and all of them reach the same outcome: the leader
//! decides whether help was requested, whether the declarations are valid
//! and which tokens to match, and the other members adopt those decisions.
//!
//! # Example
//!
//! ```
//! use clargs_core::{ArgvFlags, Binding, Declarations};
//! use clargs_engine::{MapEnv, Outcome, Solo, process};
//!
//! let tokens: Vec<String> = ["macsio", "--part_size", "64k", "--interface", "hdf5"]
//!     .iter()
//!     .map(|t| t.to_string())
//!     .collect();
//!
//! let mut part_size = 0;
//! let mut interface = None;
//! let decls = Declarations::new()
//!     .arg("--part_size %d", "bytes per part", vec![Binding::Int(&mut part_size)])
//!     .arg("--interface %s", "I/O library", vec![Binding::Str(&mut interface)]);
//!
//! let report = process(&Solo, &MapEnv::new(), ArgvFlags::default(), 1, &tokens, decls).unwrap();
//!
//! assert_eq!(report.outcome, Outcome::Ok);
//! assert_eq!(part_size, 64 * 1024);
//! assert_eq!(interface.as_deref(), Some("hdf5"));
//! ```
//!
//! [`Declarations`]: clargs_core::Declarations
//! [`Document`]: clargs_core::Document

pub mod coordinator;
pub mod fleet;
pub mod help;
pub mod matcher;
pub mod report;
pub mod router;
pub mod settings;

pub use coordinator::{process, process_local};
pub use fleet::{Collective, LEADER, Solo, ThreadGroup, ThreadMember, agree};
pub use help::{emit_help, render_help};
pub use report::{Diagnostic, Outcome, ParseReport};
pub use router::{BindSink, DocumentSink, RoutedValue, Sink};
pub use settings::{EnvSource, LeaderSettings, MapEnv, ProcessEnv};
