//! Parameter binding table.
//!
//! Maps parameter names to a declared kind and a value source. A table is
//! built per call and only borrowed immutably once handed to the compiler or
//! an execution.

mod signature;


use crate::value::{Value, ValueKind};
use derive_more::Deref;
use std::{collections::BTreeMap, fmt, sync::Arc};
use thiserror::Error as ThisError;

// re-exports
pub use signature::BindingSignature;

/// Late-bound value source evaluated at execution time.
pub type ValueProvider = Arc<dyn Fn() -> Value + Send + Sync>;

///
/// BindingError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BindingError {
    #[error("parameter name must be non-empty")]
    EmptyName,

    #[error("parameter '{name}' is already bound")]
    Duplicate { name: String },

    #[error("parameter '{name}' is not bound")]
    Unbound { name: String },

    #[error("parameter '{name}' is declared as {expected} but holds {found}")]
    KindMismatch {
        name: String,
        expected: ValueKind,
        found: String,
    },

    #[error("parameter '{name}' is null; bind it with an explicit kind")]
    UntypedNull { name: String },

    #[error("parameter '{name}' is declared as {declared}, compiled shape expects {expected}")]
    SignatureMismatch {
        name: String,
        expected: ValueKind,
        declared: ValueKind,
    },
}

///
/// BindingSource
///
/// Snapshot → value captured once when the table is built.
/// Dynamic  → provider called whenever the parameter is resolved.
///

#[derive(Clone)]
pub enum BindingSource {
    Snapshot(Value),
    Dynamic(ValueProvider),
}

impl BindingSource {
    pub fn dynamic(provider: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(provider))
    }

    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }

    fn current(&self) -> Value {
        match self {
            Self::Snapshot(value) => value.clone(),
            Self::Dynamic(provider) => provider(),
        }
    }
}

impl fmt::Debug for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot(value) => f.debug_tuple("Snapshot").field(value).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<Value> for BindingSource {
    fn from(value: Value) -> Self {
        Self::Snapshot(value)
    }
}

impl From<ValueProvider> for BindingSource {
    fn from(provider: ValueProvider) -> Self {
        Self::Dynamic(provider)
    }
}

///
/// Binding
///

#[derive(Clone, Debug)]
pub struct Binding {
    name: String,
    kind: ValueKind,
    source: BindingSource,
}

impl Binding {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    #[must_use]
    pub const fn source(&self) -> &BindingSource {
        &self.source
    }

    fn resolve(&self) -> Result<Value, BindingError> {
        let value = self.source.current();
        if !value.matches_kind(self.kind) {
            return Err(BindingError::KindMismatch {
                name: self.name.clone(),
                expected: self.kind,
                found: value.to_string(),
            });
        }

        Ok(value)
    }
}

///
/// ParameterBindings
///
/// Insertion-ordered table of uniquely named parameter bindings.
///

#[derive(Clone, Debug, Default)]
pub struct ParameterBindings {
    entries: Vec<Binding>,
}

impl ParameterBindings {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a table of snapshot bindings, inferring each kind from its value.
    pub fn snapshot<I, K, V>(values: I) -> Result<Self, BindingError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut bindings = Self::new();
        for (name, value) in values {
            bindings.bind_value(name, value)?;
        }

        Ok(bindings)
    }

    /// Register a value source for `name`.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        kind: ValueKind,
        source: impl Into<BindingSource>,
    ) -> Result<&mut Self, BindingError> {
        let name = name.into();
        if name.is_empty() {
            return Err(BindingError::EmptyName);
        }
        if self.contains(&name) {
            return Err(BindingError::Duplicate { name });
        }

        let source = source.into();
        if let BindingSource::Snapshot(value) = &source
            && !value.matches_kind(kind)
        {
            return Err(BindingError::KindMismatch {
                name,
                expected: kind,
                found: value.to_string(),
            });
        }

        self.entries.push(Binding { name, kind, source });

        Ok(self)
    }

    /// Snapshot binding with the kind taken from the value; null needs [`Self::bind`].
    pub fn bind_value(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<&mut Self, BindingError> {
        let name = name.into();
        let value = value.into();
        let Some(kind) = value.kind() else {
            return Err(BindingError::UntypedNull { name });
        };

        self.bind(name, kind, value)
    }

    /// Dynamic binding backed by `provider`.
    pub fn bind_with(
        &mut self,
        name: impl Into<String>,
        kind: ValueKind,
        provider: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Result<&mut Self, BindingError> {
        self.bind(name, kind, BindingSource::dynamic(provider))
    }

    /// Current value of `name`.
    pub fn resolve(&self, name: &str) -> Result<Value, BindingError> {
        self.get(name)
            .ok_or_else(|| BindingError::Unbound {
                name: name.to_string(),
            })?
            .resolve()
    }

    /// Resolve every slot in `signature` exactly once.
    pub fn resolve_all(&self, signature: &BindingSignature) -> Result<ParameterValues, BindingError> {
        let mut values = BTreeMap::new();
        for (name, expected) in signature.iter() {
            let binding = self.get(name).ok_or_else(|| BindingError::Unbound {
                name: name.to_string(),
            })?;
            if binding.kind != expected {
                return Err(BindingError::SignatureMismatch {
                    name: name.to_string(),
                    expected,
                    declared: binding.kind,
                });
            }
            values.insert(name.to_string(), binding.resolve()?);
        }

        Ok(ParameterValues(values))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.iter().find(|binding| binding.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        self.get(name).map(Binding::kind)
    }

    /// Names and kinds of every binding, in insertion order.
    #[must_use]
    pub fn signature(&self) -> BindingSignature {
        self.entries
            .iter()
            .map(|binding| (binding.name.clone(), binding.kind))
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Binding::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.entries.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

///
/// ParameterValues
///
/// Values resolved for one execution, keyed by parameter name.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct ParameterValues(BTreeMap<String, Value>);

impl ParameterValues {
    pub fn lookup(&self, name: &str) -> Result<&Value, BindingError> {
        self.0.get(name).ok_or_else(|| BindingError::Unbound {
            name: name.to_string(),
        })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
