use crate::{
    model::{FieldKind, FieldModel},
    value::{Record, Value},
};
use thiserror::Error as ThisError;

///
/// ShapeModel
/// Minimal runtime model for one source or destination type.
///

#[derive(Debug)]
pub struct ShapeModel {
    /// Stable external name used in constructed expressions and diagnostics.
    pub name: &'static str,
    /// Ordered field list; construction order follows it.
    pub fields: &'static [FieldModel],
}

impl ShapeModel {
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [FieldModel]) -> Self {
        Self { name, fields }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Walk `segments` from this shape and return the kind of the final member.
    pub fn resolve_path<S: AsRef<str>>(&self, segments: &[S]) -> Result<FieldKind, PathError> {
        let Some((first, rest)) = segments.split_first() else {
            return Err(PathError::Empty);
        };

        let mut kind = self
            .field(first.as_ref())
            .map(|field| field.kind)
            .ok_or_else(|| PathError::MissingMember {
                shape: self.name,
                member: first.as_ref().to_string(),
            })?;

        for segment in rest {
            let FieldKind::Shape(shape) = kind else {
                return Err(PathError::ScalarTraversal {
                    member: segment.as_ref().to_string(),
                });
            };
            kind = shape
                .field(segment.as_ref())
                .map(|field| field.kind)
                .ok_or_else(|| PathError::MissingMember {
                    shape: shape.name,
                    member: segment.as_ref().to_string(),
                })?;
        }

        Ok(kind)
    }

    /// Check that a record carries exactly this shape's fields with compatible values.
    pub fn check_record(&self, record: &Record) -> Result<(), ShapeError> {
        for name in record.names() {
            if !self.has_field(name) {
                return Err(ShapeError::UnexpectedField {
                    shape: self.name,
                    field: name.to_string(),
                });
            }
        }

        for field in self.fields {
            let value = record.get(field.name).ok_or(ShapeError::MissingField {
                shape: self.name,
                field: field.name,
            })?;
            check_value(self.name, field, value)?;
        }

        Ok(())
    }
}

fn check_value(shape: &'static str, field: &FieldModel, value: &Value) -> Result<(), ShapeError> {
    match (field.kind, value) {
        (_, Value::Null) => Ok(()),
        (FieldKind::Scalar(kind), value) if value.matches_kind(kind) => Ok(()),
        (FieldKind::Shape(nested), Value::Record(record)) => nested.check_record(record),
        (kind, value) => Err(ShapeError::KindMismatch {
            shape,
            field: field.name,
            expected: kind.to_string(),
            found: value.to_string(),
        }),
    }
}

///
/// PathError
/// Failure to resolve a member path against a shape.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PathError {
    #[error("member path is empty")]
    Empty,

    #[error("shape '{shape}' has no member '{member}'")]
    MissingMember { shape: &'static str, member: String },

    #[error("cannot access member '{member}' of a scalar")]
    ScalarTraversal { member: String },
}

///
/// ShapeError
/// A record does not conform to a shape.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ShapeError {
    #[error("record for '{shape}' is missing field '{field}'")]
    MissingField {
        shape: &'static str,
        field: &'static str,
    },

    #[error("record for '{shape}' has unexpected field '{field}'")]
    UnexpectedField { shape: &'static str, field: String },

    #[error("field '{shape}.{field}' expects {expected}, found {found}")]
    KindMismatch {
        shape: &'static str,
        field: &'static str,
        expected: String,
        found: String,
    },
}
