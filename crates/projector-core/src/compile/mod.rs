//! Projection compiler.
//!
//! Lowers a validated [`ProjectionSpec`] plus a binding table into a
//! `Lambda(Construct(..))` expression. Any field sourced from the binding
//! table becomes a `Parameter` slot; only literals written into the
//! specification itself may become `Constant` nodes. The emitted tree depends
//! on binding names and kinds only, never on bound values.

mod cache;

#[cfg(test)]
mod tests;

use crate::{
    binding::{BindingSignature, ParameterBindings},
    config::CompileConfig,
    expr::{Expr, ExprError, Lambda, ShapeFingerprint},
    model::{FieldKind, PathError},
    obs::sink::{self, MetricsEvent},
    projection::{ProjectionSpec, SourceDesc, SourcePath},
};
use thiserror::Error as ThisError;

// re-exports
pub use cache::{CacheStats, ProjectionKey, ShapeCache};

/// Name of the lambda input variable in compiled projections.
pub const SOURCE_VAR: &str = "src";

///
/// CompileError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error("shape '{shape}' has no field '{field}'")]
    UnknownField { shape: &'static str, field: String },

    #[error("cannot resolve '{path}' on '{shape}': {source}")]
    UnresolvedSource {
        shape: &'static str,
        path: String,
        source: PathError,
    },

    #[error("field '{field}' is mapped more than once")]
    DuplicateMapping { field: String },

    #[error("field '{field}' reads parameter '{parameter}', which is not bound")]
    UnboundParameter { field: &'static str, parameter: String },

    #[error("field '{field}' expects {expected}, source provides {found}")]
    KindMismatch {
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error("field '{shape}.{field}' has no mapping and no same-name source member")]
    UnmappedField {
        shape: &'static str,
        field: &'static str,
    },

    #[error("projection {source_shape} -> {target} is already registered")]
    DuplicateProjection {
        source_shape: &'static str,
        target: &'static str,
    },

    #[error("path '{path}' exceeds the maximum depth of {max}")]
    PathTooDeep { path: String, max: usize },

    #[error("projection to '{target}' has {count} fields, maximum is {max}")]
    TooManyFields {
        target: &'static str,
        count: usize,
        max: usize,
    },

    #[error("{0}")]
    Expr(#[from] ExprError),
}

///
/// CompiledProjection
///
/// Inert, shareable result of compilation. `parameters` lists the slots the
/// expression reads; any binding table with the same names and kinds can
/// drive an execution of this shape.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompiledProjection {
    source: &'static str,
    target: &'static str,
    expr: Expr,
    parameters: BindingSignature,
    fingerprint: ShapeFingerprint,
}

impl CompiledProjection {
    #[must_use]
    pub const fn source(&self) -> &'static str {
        self.source
    }

    #[must_use]
    pub const fn target(&self) -> &'static str {
        self.target
    }

    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    #[must_use]
    pub const fn parameters(&self) -> &BindingSignature {
        &self.parameters
    }

    #[must_use]
    pub const fn fingerprint(&self) -> ShapeFingerprint {
        self.fingerprint
    }

    fn construct_width(&self) -> usize {
        match self.expr.as_lambda().map(Lambda::body) {
            Some(Expr::Construct(construct)) => construct.fields().len(),
            _ => 0,
        }
    }
}

impl std::fmt::Display for CompiledProjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// Compile with default limits.
pub fn compile(
    spec: &ProjectionSpec,
    bindings: &ParameterBindings,
) -> Result<CompiledProjection, CompileError> {
    compile_with(spec, bindings, &CompileConfig::default())
}

/// Compile `spec` against the names and kinds declared in `bindings`.
pub fn compile_with(
    spec: &ProjectionSpec,
    bindings: &ParameterBindings,
    limits: &CompileConfig,
) -> Result<CompiledProjection, CompileError> {
    let result = lower(spec, bindings, limits);

    match &result {
        Ok(compiled) => sink::record(MetricsEvent::Compile {
            target: compiled.target,
            fields: compiled.construct_width(),
            parameters: compiled.parameters.len(),
        }),
        Err(_) => sink::record(MetricsEvent::CompileRejected {
            target: spec.target().name,
        }),
    }

    result
}

fn lower(
    spec: &ProjectionSpec,
    bindings: &ParameterBindings,
    limits: &CompileConfig,
) -> Result<CompiledProjection, CompileError> {
    spec.validate(limits)?;

    let target = spec.target();
    let mut fields = Vec::with_capacity(target.fields.len());

    for field in target.fields {
        let expr = match spec.member(field.name) {
            Some(SourceDesc::Path(path)) => member_chain(spec, path, limits)?,
            Some(SourceDesc::Parameter(name)) => {
                let Some(kind) = bindings.kind_of(name) else {
                    return Err(CompileError::UnboundParameter {
                        field: field.name,
                        parameter: name.clone(),
                    });
                };
                if field.kind != FieldKind::Scalar(kind) {
                    return Err(CompileError::KindMismatch {
                        field: field.name,
                        expected: field.kind.to_string(),
                        found: format!("@{name}: {kind}"),
                    });
                }

                Expr::parameter(name.as_str(), kind)
            }
            Some(SourceDesc::Literal(value)) => {
                // validate() guarantees a scalar destination for literals
                let FieldKind::Scalar(kind) = field.kind else {
                    return Err(CompileError::KindMismatch {
                        field: field.name,
                        expected: field.kind.to_string(),
                        found: value.to_string(),
                    });
                };

                Expr::constant(value.clone(), kind)?
            }
            Some(SourceDesc::Ignore) => continue,
            None => Expr::member(Expr::variable(SOURCE_VAR), field.name, field.kind),
        };

        fields.push((field.name, expr));
    }

    let expr = Expr::lambda(SOURCE_VAR, Expr::construct(target.name, fields)?);
    let parameters = expr.parameters().into_iter().collect();
    let fingerprint = expr.fingerprint();

    Ok(CompiledProjection {
        source: spec.source().name,
        target: target.name,
        expr,
        parameters,
        fingerprint,
    })
}

fn member_chain(
    spec: &ProjectionSpec,
    path: &SourcePath,
    limits: &CompileConfig,
) -> Result<Expr, CompileError> {
    spec.resolve_path(path, limits)?;

    let mut shape = spec.source();
    let mut expr = Expr::variable(SOURCE_VAR);
    for segment in path.segments() {
        let Some(field) = shape.field(segment) else {
            return Err(CompileError::UnresolvedSource {
                shape: shape.name,
                path: path.to_string(),
                source: PathError::MissingMember {
                    shape: shape.name,
                    member: segment.clone(),
                },
            });
        };
        expr = Expr::member(expr, segment.as_str(), field.kind);
        if let FieldKind::Shape(next) = field.kind {
            shape = next;
        }
    }

    Ok(expr)
}
