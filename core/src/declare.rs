//! Typed argument declarations.
//!
//! Callers describe the arguments they recognize with a [`Declarations`]
//! builder. Each argument has a printf-like format specifier (`"-dims %d %d"`),
//! a help string and, when binding to memory, one [`Binding`] per value slot.
//!
//! # Example
//!
//! ```
//! use clargs_core::{Binding, Declarations};
//!
//! let mut multifile = false;
//! let (mut ni, mut nj) = (0, 0);
//!
//! let decls = Declarations::new()
//!     .flag("-multifile", "if specified, use a file-per-timestep", &mut multifile)
//!     .arg(
//!         "-dims %d %d",
//!         "logical size of the mesh",
//!         vec![Binding::Int(&mut ni), Binding::Int(&mut nj)],
//!     );
//! assert_eq!(decls.arg_count(), 2);
//! ```

use crate::types::ParamType;

/// Reserved literal that may not be used as an argument name.
///
/// Historically this terminated a variadic declaration list; the builder has
/// no sentinel but the name stays reserved so declaration sets remain
/// portable.
pub const END_OF_ARGS: &str = "end_of_args";

/// Substring reserved for help requests.
pub const HELP_SUBSTRING: &str = "help";

/// A borrowed caller destination for one converted value.
#[derive(Debug)]
pub enum Binding<'a> {
    Int(&'a mut i32),
    /// `None` means no storage yet; `Some` buffers are reused in place.
    Str(&'a mut Option<String>),
    Float(&'a mut f64),
    Index(&'a mut usize),
    Flag(&'a mut bool),
}

impl Binding<'_> {
    /// Returns `true` when this destination can receive a value of `ty`.
    ///
    /// `None` stands for a presence-only argument, which accepts an integer
    /// or a boolean flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use clargs_core::{Binding, ParamType};
    ///
    /// let mut n = 0;
    /// let binding = Binding::Int(&mut n);
    /// assert!(binding.accepts(Some(ParamType::Int)));
    /// assert!(binding.accepts(None));
    /// assert!(!binding.accepts(Some(ParamType::Float)));
    /// ```
    pub fn accepts(&self, ty: Option<ParamType>) -> bool {
        matches!(
            (self, ty),
            (Binding::Int(_), Some(ParamType::Int))
                | (Binding::Str(_), Some(ParamType::Str))
                | (Binding::Float(_), Some(ParamType::Float))
                | (Binding::Index(_), Some(ParamType::ArgIndex))
                | (Binding::Int(_), None)
                | (Binding::Flag(_), None)
        )
    }

    /// Short name of the destination kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Int(_) => "int",
            Binding::Str(_) => "string",
            Binding::Float(_) => "float",
            Binding::Index(_) => "index",
            Binding::Flag(_) => "flag",
        }
    }
}

/// One declared argument.
#[derive(Debug)]
pub struct ArgDecl<'a> {
    /// Literal name followed by zero or more `%<type>` markers.
    pub format: String,
    /// Free-form help text; explicit `\n` breaks are honored.
    pub help: String,
    /// Whitespace-separated default tokens, one per parameter.
    pub default: Option<String>,
    /// Destinations, one per parameter (one for a presence-only argument).
    pub bindings: Vec<Binding<'a>>,
}

/// An entry in a declaration list.
#[derive(Debug)]
pub enum DeclItem<'a> {
    Arg(ArgDecl<'a>),
    /// Opens a help section.
    GroupBegin { name: String, help: String },
    /// Closes the most recently opened help section.
    GroupEnd { name: String },
}

/// Ordered collection of argument declarations.
#[derive(Debug, Default)]
pub struct Declarations<'a> {
    items: Vec<DeclItem<'a>>,
}

impl<'a> Declarations<'a> {
    /// Creates an empty declaration list.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Declares an argument with explicit bindings.
    pub fn arg(
        mut self,
        format: impl Into<String>,
        help: impl Into<String>,
        bindings: Vec<Binding<'a>>,
    ) -> Self {
        self.items.push(DeclItem::Arg(ArgDecl {
            format: format.into(),
            help: help.into(),
            default: None,
            bindings,
        }));
        self
    }

    /// Declares a presence-only argument bound to a boolean.
    pub fn flag(
        self,
        format: impl Into<String>,
        help: impl Into<String>,
        target: &'a mut bool,
    ) -> Self {
        self.arg(format, help, vec![Binding::Flag(target)])
    }

    /// Declares an argument without bindings, for document routing.
    pub fn doc_arg(self, format: impl Into<String>, help: impl Into<String>) -> Self {
        self.arg(format, help, Vec::new())
    }

    /// Sets the default of the most recently declared argument.
    ///
    /// Has no effect when no argument has been declared yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use clargs_core::Declarations;
    ///
    /// let decls = Declarations::new()
    ///     .doc_arg("--num_dumps %d", "number of dumps")
    ///     .with_default("10");
    /// assert_eq!(decls.args().next().unwrap().default.as_deref(), Some("10"));
    /// ```
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        let last = self.items.iter_mut().rev().find_map(|item| match item {
            DeclItem::Arg(arg) => Some(arg),
            _ => None,
        });
        if let Some(arg) = last {
            arg.default = Some(value.into());
        }
        self
    }

    /// Opens a named help section.
    pub fn group(mut self, name: impl Into<String>, help: impl Into<String>) -> Self {
        self.items.push(DeclItem::GroupBegin {
            name: name.into(),
            help: help.into(),
        });
        self
    }

    /// Closes a named help section.
    pub fn end_group(mut self, name: impl Into<String>) -> Self {
        self.items.push(DeclItem::GroupEnd { name: name.into() });
        self
    }

    /// Appends an already-built item.
    pub fn push(&mut self, item: DeclItem<'a>) {
        self.items.push(item);
    }

    /// All items in declaration order.
    pub fn items(&self) -> &[DeclItem<'a>] {
        &self.items
    }

    /// Declared arguments in order, skipping group markers.
    pub fn args(&self) -> impl Iterator<Item = &ArgDecl<'a>> {
        self.items.iter().filter_map(|item| match item {
            DeclItem::Arg(arg) => Some(arg),
            _ => None,
        })
    }

    /// Number of declared arguments.
    pub fn arg_count(&self) -> usize {
        self.args().count()
    }

    pub(crate) fn into_items(self) -> Vec<DeclItem<'a>> {
        self.items
    }
}
