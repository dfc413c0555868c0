use crate::value::Value;

///
/// ValueTag
///
/// Stable canonical value-variant tag used by fingerprint encodings.
///
/// IMPORTANT:
/// Tag values feed shape fingerprints and must not be renumbered.
///

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ValueTag {
    Blob = 1,
    Bool = 2,
    Int = 3,
    Null = 4,
    Record = 5,
    Text = 6,
    Uint = 7,
}

impl ValueTag {
    #[must_use]
    pub(crate) const fn to_u8(self) -> u8 {
        self as u8
    }
}

#[must_use]
pub(super) const fn canonical_tag(value: &Value) -> ValueTag {
    match value {
        Value::Blob(_) => ValueTag::Blob,
        Value::Bool(_) => ValueTag::Bool,
        Value::Int(_) => ValueTag::Int,
        Value::Null => ValueTag::Null,
        Value::Record(_) => ValueTag::Record,
        Value::Text(_) => ValueTag::Text,
        Value::Uint(_) => ValueTag::Uint,
    }
}
