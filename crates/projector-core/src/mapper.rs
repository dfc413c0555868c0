//! Session-style entry point.
//!
//! A [`Mapper`] owns the shared registry, the runtime configuration and a
//! compiled-shape cache. `project` returns a compiled shape for the current
//! binding names and kinds; `execute` resolves parameter values once and
//! hands both to an adapter.

use crate::{
    binding::ParameterBindings,
    compile::{CacheStats, CompiledProjection, ProjectionKey, ShapeCache, compile_with},
    config::ProjectorConfig,
    error::InternalError,
    exec::{ExecuteError, FromRecord, QueryAdapter},
    obs::sink::{self, MetricsEvent},
    projection::ProjectionRegistry,
    value::Record,
};
use std::sync::Arc;

///
/// Mapper
///

#[derive(Debug)]
pub struct Mapper {
    registry: Arc<ProjectionRegistry>,
    config: ProjectorConfig,
    cache: ShapeCache,
}

impl Mapper {
    #[must_use]
    pub fn new(registry: Arc<ProjectionRegistry>, config: ProjectorConfig) -> Self {
        let cache = ShapeCache::new(&config.cache);

        Self {
            registry,
            config,
            cache,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ProjectionRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Compiled shape for `source -> target` under the names and kinds of
    /// `bindings`. Values are never read here.
    pub fn project(
        &self,
        source: &str,
        target: &str,
        bindings: &ParameterBindings,
    ) -> Result<Arc<CompiledProjection>, InternalError> {
        let spec = self
            .registry
            .get(source, target)
            .ok_or_else(|| InternalError::projection_not_found(source, target))?;

        let key = ProjectionKey::new(&spec, bindings);
        if let Some(compiled) = self.cache.get(&key) {
            self.cache.record_hit();
            return Ok(compiled);
        }
        self.cache.record_miss();

        let compiled = Arc::new(compile_with(&spec, bindings, &self.config.compile)?);
        self.cache.insert(key, Arc::clone(&compiled));

        Ok(compiled)
    }

    /// Run `compiled` through `adapter` with the current binding values.
    pub fn execute<A>(
        &self,
        compiled: &CompiledProjection,
        bindings: &ParameterBindings,
        adapter: &A,
    ) -> Result<Vec<Record>, InternalError>
    where
        A: QueryAdapter + ?Sized,
    {
        let parameters = bindings.resolve_all(compiled.parameters())?;
        sink::record(MetricsEvent::ParametersResolved {
            count: parameters.len(),
        });

        let rows = adapter.execute(compiled, &parameters)?;
        sink::record(MetricsEvent::Execute {
            target: compiled.target(),
            rows: rows.len() as u64,
        });

        Ok(rows)
    }

    /// Execute and materialize every row as `T`.
    pub fn execute_as<T, A>(
        &self,
        compiled: &CompiledProjection,
        bindings: &ParameterBindings,
        adapter: &A,
    ) -> Result<Vec<T>, InternalError>
    where
        T: FromRecord,
        A: QueryAdapter + ?Sized,
    {
        let rows = self.execute(compiled, bindings, adapter)?;

        rows.iter()
            .map(T::from_record)
            .collect::<Result<Vec<_>, ExecuteError>>()
            .map_err(InternalError::from)
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
