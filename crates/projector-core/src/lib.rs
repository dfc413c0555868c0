//! Core runtime for Projector: shape models, expression trees, parameter
//! binding, the projection compiler and its execution boundary.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod binding;
pub mod compile;
pub mod config;
pub mod error;
pub mod exec;
pub mod expr;
pub mod mapper;
pub mod model;
pub mod obs;
pub mod projection;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, caches, or metrics are re-exported here.
///

pub mod prelude {
    pub use crate::{
        binding::{BindingSource, ParameterBindings},
        compile::CompiledProjection,
        exec::{FromRecord, MemoryStore, QueryAdapter},
        expr::Expr,
        mapper::Mapper,
        model::{FieldKind, FieldModel, ShapeModel},
        projection::{ProjectionRegistry, ProjectionSpec, SourceDesc},
        value::{Record, Value, ValueKind},
    };
}
