//! Core types for declarative command-line argument processing.
//!
//! This crate defines everything a caller needs to declare the arguments it
//! recognizes and everything the engine needs to match them:
//!
//! - [`Declarations`]: typed builder of argument declarations, each a
//!   printf-like format specifier (`"-dims %d %d"`), help text, optional
//!   default and one [`Binding`] per value slot.
//! - [`Registry`]: the validated, parsed descriptor sequence for one call.
//! - [`Document`]: structured result with scalar-to-list promotion on
//!   repeated keys.
//! - [`scale_int`], [`parse_leading_float`]: value conversions, including
//!   `k`/`m`/`g` size suffixes with lossless-narrowing checks.
//! - [`ClargsError`], [`DeclarationError`]: error taxonomy.
//!
//! # Example
//!
//! ```
//! use clargs_core::*;
//!
//! let mut multifile = false;
//! let (mut ni, mut nj) = (0, 0);
//! let decls = Declarations::new()
//!     .flag("-multifile", "use a file per dump", &mut multifile)
//!     .arg("-dims %d %d", "mesh size", vec![Binding::Int(&mut ni), Binding::Int(&mut nj)]);
//!
//! let registry = Registry::build(decls, RouteMode::BindToMemory).unwrap();
//! assert_eq!(registry.len(), 2);
//! assert_eq!(registry.find("-dims"), Some(1));
//! ```

mod convert;
mod declare;
mod document;
mod error;
mod registry;
mod types;
mod validate;

pub use convert::{
    Overflow, parse_leading_float, parse_leading_int, parse_presence, scale_int, size_multiplier,
};
pub use declare::{ArgDecl, Binding, DeclItem, Declarations, END_OF_ARGS, HELP_SUBSTRING};
pub use document::{ARG_INDEX_KEY, Document};
pub use error::{ClargsError, FleetError, Result};
pub use registry::{ArgDescriptor, DescriptorSignature, Registry, RegistryEntry};
pub use types::*;
pub use validate::{DeclarationError, parse_format, validate_declarations};
