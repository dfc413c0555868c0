//! ## Crate layout
//! - `core`: shape models, expression trees, binding tables, the projection
//!   compiler, execution adapters and observability.
//! - `error`: public error type with a stable kind + origin taxonomy.
//!
//! [`Projector`] is the caller-facing entry point; it wraps the core mapper
//! and reports failures as [`Error`].

pub use projector_core as core;

pub mod error;

use projector_core::{
    binding::ParameterBindings,
    compile::{CacheStats, CompiledProjection},
    config::ProjectorConfig,
    exec::{FromRecord, QueryAdapter},
    mapper::Mapper,
    projection::ProjectionRegistry,
    value::Record,
};
use std::{path::Path, sync::Arc};

// re-exports
pub use error::Error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Projector
///
/// Compiles registered projections against a binding table and runs them
/// through a query adapter. Compiled shapes are cached by parameter names
/// and kinds, so rebinding a value never triggers a recompile.
///

#[derive(Debug)]
pub struct Projector {
    mapper: Mapper,
}

impl Projector {
    #[must_use]
    pub fn new(registry: Arc<ProjectionRegistry>, config: ProjectorConfig) -> Self {
        Self {
            mapper: Mapper::new(registry, config),
        }
    }

    /// Build with configuration loaded from a TOML file.
    pub fn from_config_path(
        registry: Arc<ProjectionRegistry>,
        path: impl AsRef<Path>,
    ) -> Result<Self, Error> {
        let config = ProjectorConfig::from_path(path)?;

        Ok(Self::new(registry, config))
    }

    pub fn project(
        &self,
        source: &str,
        target: &str,
        bindings: &ParameterBindings,
    ) -> Result<Arc<CompiledProjection>, Error> {
        Ok(self.mapper.project(source, target, bindings)?)
    }

    pub fn execute<A>(
        &self,
        compiled: &CompiledProjection,
        bindings: &ParameterBindings,
        adapter: &A,
    ) -> Result<Vec<Record>, Error>
    where
        A: QueryAdapter + ?Sized,
    {
        Ok(self.mapper.execute(compiled, bindings, adapter)?)
    }

    pub fn execute_as<T, A>(
        &self,
        compiled: &CompiledProjection,
        bindings: &ParameterBindings,
        adapter: &A,
    ) -> Result<Vec<T>, Error>
    where
        T: FromRecord,
        A: QueryAdapter + ?Sized,
    {
        Ok(self.mapper.execute_as(compiled, bindings, adapter)?)
    }

    /// Compile (or reuse) and execute in one call.
    pub fn query_as<T, A>(
        &self,
        source: &str,
        target: &str,
        bindings: &ParameterBindings,
        adapter: &A,
    ) -> Result<Vec<T>, Error>
    where
        T: FromRecord,
        A: QueryAdapter + ?Sized,
    {
        let compiled = self.project(source, target, bindings)?;

        self.execute_as(&compiled, bindings, adapter)
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.mapper.cache_stats()
    }

    #[must_use]
    pub const fn mapper(&self) -> &Mapper {
        &self.mapper
    }
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, Projector,
        core::{
            binding::{BindingSource, ParameterBindings},
            compile::CompiledProjection,
            config::ProjectorConfig,
            exec::{ExecuteError, FromRecord, MemoryStore, QueryAdapter},
            expr::{Expr, has_constant_of_kind},
            model::{FieldKind, FieldModel, ShapeModel},
            projection::{ProjectionRegistry, ProjectionSpec, SourceDesc},
            value::{Record, Value, ValueKind},
        },
    };
    pub use candid::CandidType;
    pub use serde::{Deserialize, Serialize};
}
