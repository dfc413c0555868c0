//! Query execution.
//!
//! A [`QueryAdapter`] receives a compiled projection together with the
//! parameter values resolved for one execution and returns the constructed
//! destination records. [`MemoryStore`] is the in-process reference adapter;
//! it interprets the expression tree row by row via [`evaluate`].

mod eval;
mod materialize;
mod store;


use crate::{
    binding::{BindingError, ParameterValues},
    compile::CompiledProjection,
    model::ShapeError,
    value::{Record, RecordError},
};
use thiserror::Error as ThisError;

// re-exports
pub use eval::{Env, evaluate, project_rows};
pub use materialize::FromRecord;
pub use store::MemoryStore;

///
/// ExecuteError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ExecuteError {
    #[error("{0}")]
    Binding(#[from] BindingError),

    #[error("row rejected: {0}")]
    RowShape(#[from] ShapeError),

    #[error("{0}")]
    Record(#[from] RecordError),

    #[error("projection reads '{found}' rows but the adapter serves '{expected}'")]
    SourceMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("compiled projection root is not a lambda")]
    NotALambda,

    #[error("projection body did not construct a record")]
    NotARecord,

    #[error("lambda expressions cannot be evaluated as values")]
    NestedLambda,

    #[error("variable '{name}' is not in scope")]
    UnboundVariable { name: String },

    #[error("member '{member}' is not present on {found}")]
    MissingMember { member: String, found: String },

    #[error("cannot materialize {target}: field '{field}' is missing or has the wrong kind")]
    Materialize { target: &'static str, field: String },

    #[error("adapter failure: {0}")]
    Adapter(String),
}

impl ExecuteError {
    pub(crate) fn materialize(target: &'static str, field: impl Into<String>) -> Self {
        Self::Materialize {
            target,
            field: field.into(),
        }
    }
}

///
/// QueryAdapter
///
/// Boundary to whatever actually runs a compiled projection. Implementations
/// must read parameter slots from `parameters` on every call and never retain
/// values between calls.
///

pub trait QueryAdapter {
    fn execute(
        &self,
        compiled: &CompiledProjection,
        parameters: &ParameterValues,
    ) -> Result<Vec<Record>, ExecuteError>;
}
