use crate::value::Value;
use candid::CandidType;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// RecordError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RecordError {
    #[error("record field name must be non-empty (position {index})")]
    EmptyName { index: usize },

    #[error("record field '{name}' appears more than once")]
    DuplicateField { name: String },
}

///
/// Record
///
/// Ordered field → value list with unique, non-empty field names.
/// Input rows and constructed shape instances share this representation;
/// field order follows the shape that produced the record.
///

#[derive(
    CandidType, Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
#[serde(try_from = "Vec<(String, Value)>", into = "Vec<(String, Value)>")]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build a record, rejecting empty or repeated field names.
    pub fn from_fields<I, K, V>(fields: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Self::new();
        for (name, value) in fields {
            record.push(name, value)?;
        }

        Ok(record)
    }

    /// Append one field.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), RecordError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RecordError::EmptyName {
                index: self.fields.len(),
            });
        }
        if self.contains(&name) {
            return Err(RecordError::DuplicateField { name });
        }
        self.fields.push((name, value.into()));

        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(field, value)| (field == name).then_some(value))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    /// Text value of `name`; `None` when absent, null, or not text.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    #[must_use]
    pub fn uint(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_uint)
    }

    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }
}

impl TryFrom<Vec<(String, Value)>> for Record {
    type Error = RecordError;

    fn try_from(fields: Vec<(String, Value)>) -> Result<Self, Self::Error> {
        Self::from_fields(fields)
    }
}

impl From<Record> for Vec<(String, Value)> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{ ")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str(" }")
    }
}
