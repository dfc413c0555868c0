use crate::{
    compile::CompileError,
    config::CompileConfig,
    model::{FieldKind, ShapeModel},
    value::Value,
};
use std::fmt;

///
/// SourcePath
/// Dotted member path into the source shape (`customer.address.city`).
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SourcePath(Vec<String>);

impl SourcePath {
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self(path.split('.').map(str::to_string).collect())
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.0.len()
    }
}

impl From<&str> for SourcePath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

///
/// SourceDesc
///
/// Path       → read a member of the current source row.
/// Parameter  → hoisted slot named in the binding table.
/// Literal    → constant written into the specification.
/// Ignore     → leave the destination field out of the construct.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SourceDesc {
    Path(SourcePath),
    Parameter(String),
    Literal(Value),
    Ignore,
}

///
/// MemberMap
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberMap {
    pub field: String,
    pub source: SourceDesc,
}

///
/// ProjectionSpec
/// Immutable source → destination mapping.
///

#[derive(Debug)]
pub struct ProjectionSpec {
    source: &'static ShapeModel,
    target: &'static ShapeModel,
    members: Vec<MemberMap>,
}

impl ProjectionSpec {
    #[must_use]
    pub const fn builder(
        source: &'static ShapeModel,
        target: &'static ShapeModel,
    ) -> ProjectionBuilder {
        ProjectionBuilder {
            source,
            target,
            members: Vec::new(),
        }
    }

    #[must_use]
    pub const fn source(&self) -> &'static ShapeModel {
        self.source
    }

    #[must_use]
    pub const fn target(&self) -> &'static ShapeModel {
        self.target
    }

    #[must_use]
    pub fn members(&self) -> &[MemberMap] {
        &self.members
    }

    /// Explicit entry for `field`, if any.
    #[must_use]
    pub fn member(&self, field: &str) -> Option<&SourceDesc> {
        self.members
            .iter()
            .find_map(|member| (member.field == field).then_some(&member.source))
    }

    /// Check every property that does not depend on a binding table.
    pub fn validate(&self, limits: &CompileConfig) -> Result<(), CompileError> {
        let target = self.target;

        let width = self.members.len().max(target.fields.len());
        if width > limits.max_fields {
            return Err(CompileError::TooManyFields {
                target: target.name,
                count: width,
                max: limits.max_fields,
            });
        }

        for (i, member) in self.members.iter().enumerate() {
            let Some(field) = target.field(&member.field) else {
                return Err(CompileError::UnknownField {
                    shape: target.name,
                    field: member.field.clone(),
                });
            };
            if self.members[..i].iter().any(|m| m.field == member.field) {
                return Err(CompileError::DuplicateMapping {
                    field: member.field.clone(),
                });
            }

            match &member.source {
                SourceDesc::Path(path) => {
                    let found = self.resolve_path(path, limits)?;
                    check_kind(field.name, field.kind, found)?;
                }
                SourceDesc::Literal(value) => match field.kind {
                    FieldKind::Scalar(kind) if value.matches_kind(kind) => {}
                    expected => {
                        return Err(CompileError::KindMismatch {
                            field: field.name,
                            expected: expected.to_string(),
                            found: value.to_string(),
                        });
                    }
                },
                SourceDesc::Parameter(name) => {
                    if let FieldKind::Shape(shape) = field.kind {
                        return Err(CompileError::KindMismatch {
                            field: field.name,
                            expected: shape.name.to_string(),
                            found: format!("@{name}"),
                        });
                    }
                }
                SourceDesc::Ignore => {}
            }
        }

        // unmapped destination fields fall back to a same-name source member
        for field in target.fields {
            if self.member(field.name).is_some() {
                continue;
            }
            match self.source.field(field.name) {
                Some(source) if source.kind == field.kind => {}
                _ => {
                    return Err(CompileError::UnmappedField {
                        shape: target.name,
                        field: field.name,
                    });
                }
            }
        }

        Ok(())
    }

    pub(crate) fn resolve_path(
        &self,
        path: &SourcePath,
        limits: &CompileConfig,
    ) -> Result<FieldKind, CompileError> {
        if path.depth() > limits.max_path_depth {
            return Err(CompileError::PathTooDeep {
                path: path.to_string(),
                max: limits.max_path_depth,
            });
        }

        self.source
            .resolve_path(path.segments())
            .map_err(|source| CompileError::UnresolvedSource {
                shape: self.source.name,
                path: path.to_string(),
                source,
            })
    }
}

fn check_kind(
    field: &'static str,
    expected: FieldKind,
    found: FieldKind,
) -> Result<(), CompileError> {
    if expected == found {
        Ok(())
    } else {
        Err(CompileError::KindMismatch {
            field,
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

///
/// ProjectionBuilder
///
/// Collects member mappings; validation happens on registration and
/// compilation so a malformed specification never reaches execution.
///

#[derive(Debug)]
pub struct ProjectionBuilder {
    source: &'static ShapeModel,
    target: &'static ShapeModel,
    members: Vec<MemberMap>,
}

impl ProjectionBuilder {
    #[must_use]
    pub fn member(mut self, field: impl Into<String>, source: SourceDesc) -> Self {
        self.members.push(MemberMap {
            field: field.into(),
            source,
        });
        self
    }

    #[must_use]
    pub fn map_from(self, field: impl Into<String>, path: &str) -> Self {
        self.member(field, SourceDesc::Path(SourcePath::parse(path)))
    }

    #[must_use]
    pub fn map_parameter(self, field: impl Into<String>, parameter: impl Into<String>) -> Self {
        self.member(field, SourceDesc::Parameter(parameter.into()))
    }

    #[must_use]
    pub fn map_literal(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.member(field, SourceDesc::Literal(value.into()))
    }

    #[must_use]
    pub fn ignore(self, field: impl Into<String>) -> Self {
        self.member(field, SourceDesc::Ignore)
    }

    #[must_use]
    pub fn build(self) -> ProjectionSpec {
        ProjectionSpec {
            source: self.source,
            target: self.target,
            members: self.members,
        }
    }
}
