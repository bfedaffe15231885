//! Output routing.
//!
//! The matcher hands every converted value to a [`Sink`]. [`BindSink`]
//! stores values in the caller's destinations; [`DocumentSink`] collects
//! them into a [`Document`] keyed by the argument's match prefix.

use clargs_core::{ARG_INDEX_KEY, ArgDescriptor, Binding, Document, RouteMode};
use serde_json::{Value, json};

/// A converted value ready to be routed.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutedValue {
    /// Presence of a flag (or its default).
    Present(bool),
    Int(i32),
    Str(String),
    Float(f64),
    ArgIndex(usize),
}

impl RoutedValue {
    /// JSON has no NaN or infinity, so non-finite floats are stored as their
    /// text (`"NaN"`, `"inf"`, `"-inf"`).
    fn into_json(self) -> Value {
        match self {
            Self::Present(on) => json!(on),
            Self::Int(v) => json!(v),
            Self::Str(s) => json!(s),
            Self::Float(x) if !x.is_finite() => json!(x.to_string()),
            Self::Float(x) => json!(x),
            Self::ArgIndex(i) => json!(i),
        }
    }
}

/// Destination of routed values.
pub trait Sink {
    /// Writes `value` for parameter `slot` of `descriptor`.
    fn route(&mut self, descriptor: &mut ArgDescriptor<'_>, slot: usize, value: RoutedValue);

    /// Completes routing, returning the document when one was built.
    fn finish(self: Box<Self>) -> Option<Document>;
}

/// Creates the sink for a route mode.
pub fn sink_for(mode: RouteMode) -> Box<dyn Sink> {
    match mode {
        RouteMode::BindToMemory => Box::new(BindSink),
        RouteMode::BuildDocument => Box::new(DocumentSink::default()),
    }
}

/// Writes straight into caller-owned destinations.
#[derive(Debug, Default)]
pub struct BindSink;

impl Sink for BindSink {
    fn route(&mut self, descriptor: &mut ArgDescriptor<'_>, slot: usize, value: RoutedValue) {
        let Some(binding) = descriptor.bindings_mut().get_mut(slot) else {
            return;
        };
        // Binding kinds were checked against the format when the registry was built.
        match (binding, value) {
            (Binding::Flag(target), RoutedValue::Present(on)) => **target = on,
            (Binding::Int(target), RoutedValue::Present(on)) => **target = i32::from(on),
            (Binding::Int(target), RoutedValue::Int(v)) => **target = v,
            (Binding::Float(target), RoutedValue::Float(x)) => **target = x,
            (Binding::Index(target), RoutedValue::ArgIndex(i)) => **target = i,
            (Binding::Str(target), RoutedValue::Str(s)) => match target.as_mut() {
                Some(buffer) => {
                    buffer.clear();
                    buffer.push_str(&s);
                }
                None => **target = Some(s),
            },
            (binding, value) => {
                tracing::debug!(
                    kind = binding.kind(),
                    ?value,
                    "Dropped value for mismatched binding"
                );
            }
        }
    }

    fn finish(self: Box<Self>) -> Option<Document> {
        None
    }
}

/// Collects values into a [`Document`].
#[derive(Debug, Default)]
pub struct DocumentSink {
    document: Document,
}

impl Sink for DocumentSink {
    fn route(&mut self, descriptor: &mut ArgDescriptor<'_>, _slot: usize, value: RoutedValue) {
        let key = match value {
            RoutedValue::ArgIndex(_) => ARG_INDEX_KEY,
            _ => descriptor.prefix.as_str(),
        };
        self.document.insert(key, value.into_json());
    }

    fn finish(self: Box<Self>) -> Option<Document> {
        Some(self.document)
    }
}
