//! Descriptor registry.
//!
//! A [`Registry`] is the parsed, validated form of a [`Declarations`] list.
//! It owns one [`ArgDescriptor`] per declared argument, in declaration
//! order, and lives for a single processing call.

use crate::declare::{Binding, DeclItem, Declarations};
use crate::types::{ParamType, RouteMode};
use crate::validate::{DeclarationError, parse_format, validate_declarations};

/// One recognized argument form.
#[derive(Debug)]
pub struct ArgDescriptor<'a> {
    /// The literal specifier as declared.
    pub format: String,
    /// Literal text a token must start with to match.
    pub prefix: String,
    pub help: String,
    /// One type per value slot; empty for a presence-only argument.
    pub param_types: Vec<ParamType>,
    pub default: Option<String>,
    /// Enclosing help group, if any.
    pub group: Option<String>,
    bindings: Vec<Binding<'a>>,
}

impl<'a> ArgDescriptor<'a> {
    /// Returns `true` when the argument takes no values.
    pub fn is_presence_only(&self) -> bool {
        self.param_types.is_empty()
    }

    pub fn param_count(&self) -> usize {
        self.param_types.len()
    }

    /// Caller destinations (empty in document mode).
    pub fn bindings_mut(&mut self) -> &mut [Binding<'a>] {
        &mut self.bindings
    }

    /// Returns `true` when `token` starts with this argument's prefix.
    pub fn matches(&self, token: &str) -> bool {
        token.starts_with(&self.prefix)
    }
}

/// Comparable summary of one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSignature {
    pub prefix: String,
    pub param_types: Vec<ParamType>,
    pub help: String,
}

/// An entry in registry order, for help rendering.
#[derive(Debug, Clone, Copy)]
pub enum RegistryEntry<'r, 'a> {
    Arg(&'r ArgDescriptor<'a>),
    GroupBegin { name: &'r str, help: &'r str },
    GroupEnd { name: &'r str },
}

#[derive(Debug)]
enum Slot {
    Arg(usize),
    GroupBegin { name: String, help: String },
    GroupEnd { name: String },
}

/// Ordered descriptor sequence for one processing call.
///
/// # Examples
///
/// ```
/// use clargs_core::*;
///
/// let decls = Declarations::new()
///     .doc_arg("-multifile", "one file per dump")
///     .doc_arg("-dims %d %d", "mesh size");
/// let registry = Registry::build(decls, RouteMode::BuildDocument).unwrap();
///
/// assert_eq!(registry.len(), 2);
/// let idx = registry.find("-dims").unwrap();
/// assert_eq!(registry.descriptor(idx).param_types, vec![ParamType::Int, ParamType::Int]);
/// assert!(registry.find("-bogus").is_none());
/// ```
#[derive(Debug)]
pub struct Registry<'a> {
    descriptors: Vec<ArgDescriptor<'a>>,
    layout: Vec<Slot>,
}

impl<'a> Registry<'a> {
    /// Validates and parses a declaration list.
    ///
    /// In [`RouteMode::BuildDocument`] any bindings are ignored and dropped.
    ///
    /// # Errors
    ///
    /// Returns every [`DeclarationError`] found when the list is invalid.
    pub fn build(decls: Declarations<'a>, route: RouteMode) -> Result<Self, Vec<DeclarationError>> {
        let errors = validate_declarations(&decls, route);
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut descriptors = Vec::new();
        let mut layout = Vec::new();
        let mut groups: Vec<String> = Vec::new();

        for item in decls.into_items() {
            match item {
                DeclItem::GroupBegin { name, help } => {
                    groups.push(name.clone());
                    layout.push(Slot::GroupBegin { name, help });
                }
                DeclItem::GroupEnd { name } => {
                    groups.pop();
                    layout.push(Slot::GroupEnd { name });
                }
                DeclItem::Arg(arg) => {
                    let (prefix, param_types) = parse_format(&arg.format).map_err(|e| vec![e])?;
                    let bindings = match route {
                        RouteMode::BindToMemory => arg.bindings,
                        RouteMode::BuildDocument => Vec::new(),
                    };
                    layout.push(Slot::Arg(descriptors.len()));
                    descriptors.push(ArgDescriptor {
                        format: arg.format,
                        prefix,
                        help: arg.help,
                        param_types,
                        default: arg.default,
                        group: groups.last().cloned(),
                        bindings,
                    });
                }
            }
        }

        Ok(Self {
            descriptors,
            layout,
        })
    }

    /// Index of the first descriptor whose prefix starts `token`.
    ///
    /// Declaration order breaks ties between overlapping prefixes.
    pub fn find(&self, token: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.matches(token))
    }

    pub fn descriptor(&self, index: usize) -> &ArgDescriptor<'a> {
        &self.descriptors[index]
    }

    pub fn descriptor_mut(&mut self, index: usize) -> &mut ArgDescriptor<'a> {
        &mut self.descriptors[index]
    }

    pub fn descriptors(&self) -> &[ArgDescriptor<'a>] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Arguments and group markers in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = RegistryEntry<'_, 'a>> {
        self.layout.iter().map(|slot| match slot {
            Slot::Arg(i) => RegistryEntry::Arg(&self.descriptors[*i]),
            Slot::GroupBegin { name, help } => RegistryEntry::GroupBegin { name, help },
            Slot::GroupEnd { name } => RegistryEntry::GroupEnd { name },
        })
    }

    /// Prefix, parameter types and help of every descriptor, in order.
    pub fn signature(&self) -> Vec<DescriptorSignature> {
        self.descriptors
            .iter()
            .map(|d| DescriptorSignature {
                prefix: d.prefix.clone(),
                param_types: d.param_types.clone(),
                help: d.help.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn doc_registry(formats: &[&str]) -> Registry<'static> {
        let decls = formats
            .iter()
            .fold(Declarations::new(), |d, f| d.doc_arg(*f, format!("help for {f}")));
        Registry::build(decls, RouteMode::BuildDocument).unwrap()
    }

    #[test]
    fn test_first_declared_prefix_wins() {
        let registry = doc_registry(&["--part", "--part_size %d"]);
        assert_eq!(registry.find("--part_size"), Some(0));
        assert_eq!(registry.find("--partition"), Some(0));
    }

    #[test]
    fn test_groups_are_recorded_on_descriptors() {
        let decls = Declarations::new()
            .doc_arg("--interface %s", "io library")
            .group("mesh", "mesh options")
            .doc_arg("--part_type %s", "part type")
            .end_group("mesh");
        let registry = Registry::build(decls, RouteMode::BuildDocument).unwrap();
        assert_eq!(registry.descriptor(0).group, None);
        assert_eq!(registry.descriptor(1).group.as_deref(), Some("mesh"));
        assert_eq!(registry.entries().count(), 4);
    }

    #[test]
    fn test_document_mode_drops_bindings() {
        let mut n = 7;
        let decls = Declarations::new().arg("-n %d", "count", vec![Binding::Int(&mut n)]);
        let mut registry = Registry::build(decls, RouteMode::BuildDocument).unwrap();
        assert!(registry.descriptor_mut(0).bindings_mut().is_empty());
    }

    #[test]
    fn test_invalid_declarations_return_all_errors() {
        let decls = Declarations::new()
            .doc_arg("-a %z", "bad")
            .doc_arg("-b %d", "good")
            .doc_arg("-c %d %y", "bad too");
        let errors = Registry::build(decls, RouteMode::BuildDocument).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    fn format_strategy() -> impl Strategy<Value = String> {
        (
            "-[a-z]{1,3}",
            prop::collection::vec(prop::sample::select(vec!['d', 's', 'f', 'n']), 0..5),
        )
            .prop_map(|(name, markers)| {
                markers
                    .iter()
                    .fold(name, |acc, m| format!("{acc} %{m}"))
            })
    }

    proptest! {
        #[test]
        fn prop_marker_count_and_order(format in format_strategy()) {
            let registry = doc_registry(&[format.as_str()]);
            let expected: Vec<ParamType> = format
                .split(' ')
                .skip(1)
                .filter_map(|m| m.strip_prefix('%'))
                .filter_map(|m| m.chars().next())
                .filter_map(ParamType::from_marker)
                .collect();
            prop_assert_eq!(registry.descriptor(0).param_count(), format.matches('%').count());
            prop_assert_eq!(&registry.descriptor(0).param_types, &expected);
        }

        #[test]
        fn prop_registration_is_idempotent(formats in prop::collection::vec(format_strategy(), 1..6)) {
            let refs: Vec<&str> = formats.iter().map(String::as_str).collect();
            let first = doc_registry(&refs).signature();
            let second = doc_registry(&refs).signature();
            prop_assert_eq!(first, second);
        }
    }
}
