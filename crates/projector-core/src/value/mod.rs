mod record;
mod tag;


use candid::CandidType;
use derive_more::Display;
use serde::{Deserialize, Serialize};

// re-exports
pub use record::{Record, RecordError};
pub(crate) use tag::ValueTag;

///
/// ValueKind
///
/// Declared scalar type of a parameter slot, constant, or shape field.
/// `Null` is not a kind; a null value is compatible with every kind.
///

#[derive(
    CandidType, Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ValueKind {
    Blob,
    Bool,
    Int,
    Text,
    Uint,
}

impl ValueKind {
    /// Stable byte tag used by fingerprint encodings.
    #[must_use]
    pub(crate) const fn tag(self) -> u8 {
        match self {
            Self::Blob => 0x01,
            Self::Bool => 0x02,
            Self::Int => 0x03,
            Self::Text => 0x04,
            Self::Uint => 0x05,
        }
    }
}

///
/// Value
///
/// Runtime value flowing through bindings, constants, and materialized rows.
///
/// Null    → absent value; accepted by every declared kind.
/// Record  → constructed shape instance or input row.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Int(i64),
    Null,
    Record(Record),
    Text(String),
    Uint(u64),
}

impl Value {
    /// Scalar kind of this value, or `None` for `Null` and `Record`.
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Blob(_) => Some(ValueKind::Blob),
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::Int(_) => Some(ValueKind::Int),
            Self::Text(_) => Some(ValueKind::Text),
            Self::Uint(_) => Some(ValueKind::Uint),
            Self::Null | Self::Record(_) => None,
        }
    }

    /// Returns true when this value may occupy a slot declared as `kind`.
    #[must_use]
    pub fn matches_kind(&self, kind: ValueKind) -> bool {
        match self {
            Self::Null => true,
            other => other.kind() == Some(kind),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Stable variant tag used by hashing surfaces.
    #[must_use]
    pub(crate) const fn tag(&self) -> ValueTag {
        tag::canonical_tag(self)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob(bytes) => write!(f, "blob[{}]", bytes.len()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Null => f.write_str("null"),
            Self::Record(r) => write!(f, "{r}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Uint(v) => write!(f, "{v}u"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Self::Record(r)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
