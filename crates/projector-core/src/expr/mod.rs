//! Expression tree model for compiled projections.
//!
//! Expressions are immutable values: every node is built through a
//! constructor and no API hands out mutable access afterwards. Trees compare
//! structurally, which is what the shape cache and determinism checks rely on.

mod explain;
pub(crate) mod fingerprint;
pub mod visit;


use crate::{
    model::FieldKind,
    value::{Value, ValueKind},
};
use thiserror::Error as ThisError;

// re-exports
pub use fingerprint::ShapeFingerprint;
pub use visit::{Preorder, has_constant_of_kind};

///
/// ExprError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ExprError {
    #[error("construct '{target}' assigns field '{field}' more than once")]
    DuplicateField { target: String, field: String },

    #[error("constant '{found}' does not fit kind {kind}")]
    ConstantKindMismatch { kind: ValueKind, found: String },
}

///
/// Expr
///
/// One node of a projection expression.
///
/// Variable   → the lambda input (current source row).
/// Member     → field read from a source expression.
/// Constant   → literal embedded in the compiled shape.
/// Parameter  → late-bound slot resolved per execution.
/// Construct  → destination instance built from field expressions.
/// Lambda     → per-row function over a source sequence.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Expr {
    Variable(String),
    Member {
        source: Box<Self>,
        name: String,
        kind: FieldKind,
    },
    Constant {
        value: Value,
        kind: ValueKind,
    },
    Parameter {
        name: String,
        kind: ValueKind,
    },
    Construct(Construct),
    Lambda(Lambda),
}

impl Expr {
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    #[must_use]
    pub fn member(source: Self, name: impl Into<String>, kind: FieldKind) -> Self {
        Self::Member {
            source: Box::new(source),
            name: name.into(),
            kind,
        }
    }

    /// Build a literal node; `value` must fit `kind` (null fits every kind).
    pub fn constant(value: Value, kind: ValueKind) -> Result<Self, ExprError> {
        if !value.matches_kind(kind) {
            return Err(ExprError::ConstantKindMismatch {
                kind,
                found: value.to_string(),
            });
        }

        Ok(Self::Constant { value, kind })
    }

    #[must_use]
    pub fn parameter(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::Parameter {
            name: name.into(),
            kind,
        }
    }

    /// Build a construct node; field names must be unique.
    pub fn construct<I, K>(target: impl Into<String>, fields: I) -> Result<Self, ExprError>
    where
        I: IntoIterator<Item = (K, Self)>,
        K: Into<String>,
    {
        Construct::new(target, fields).map(Self::Construct)
    }

    #[must_use]
    pub fn lambda(param: impl Into<String>, body: Self) -> Self {
        Self::Lambda(Lambda {
            param: param.into(),
            body: Box::new(body),
        })
    }

    /// Direct children in evaluation order.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Variable(_) | Self::Constant { .. } | Self::Parameter { .. } => Vec::new(),
            Self::Member { source, .. } => vec![source.as_ref()],
            Self::Construct(construct) => construct.fields.iter().map(|(_, expr)| expr).collect(),
            Self::Lambda(lambda) => vec![lambda.body.as_ref()],
        }
    }

    /// Pre-order traversal over this node and all descendants.
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder::new(self)
    }

    /// Parameter slots referenced by this tree, in first-appearance order.
    #[must_use]
    pub fn parameters(&self) -> Vec<(&str, ValueKind)> {
        let mut out: Vec<(&str, ValueKind)> = Vec::new();
        for node in self.preorder() {
            if let Self::Parameter { name, kind } = node
                && !out.iter().any(|(seen, _)| *seen == name.as_str())
            {
                out.push((name.as_str(), *kind));
            }
        }

        out
    }

    #[must_use]
    pub const fn as_lambda(&self) -> Option<&Lambda> {
        match self {
            Self::Lambda(lambda) => Some(lambda),
            _ => None,
        }
    }
}

///
/// Construct
/// Destination instance expression with unique field names.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Construct {
    target: String,
    fields: Vec<(String, Expr)>,
}

impl Construct {
    pub fn new<I, K>(target: impl Into<String>, fields: I) -> Result<Self, ExprError>
    where
        I: IntoIterator<Item = (K, Expr)>,
        K: Into<String>,
    {
        let target = target.into();
        let mut out: Vec<(String, Expr)> = Vec::new();

        for (name, expr) in fields {
            let name = name.into();
            if out.iter().any(|(seen, _)| *seen == name) {
                return Err(ExprError::DuplicateField {
                    target,
                    field: name,
                });
            }
            out.push((name, expr));
        }

        Ok(Self {
            target,
            fields: out,
        })
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, Expr)] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Expr> {
        self.fields
            .iter()
            .find_map(|(field, expr)| (field == name).then_some(expr))
    }
}

///
/// Lambda
/// Single-input function; `param` names the variable the body reads.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Lambda {
    param: String,
    body: Box<Expr>,
}

impl Lambda {
    #[must_use]
    pub fn param(&self) -> &str {
        &self.param
    }

    #[must_use]
    pub fn body(&self) -> &Expr {
        &self.body
    }
}
