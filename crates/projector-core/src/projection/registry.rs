use crate::{compile::CompileError, config::CompileConfig, projection::ProjectionSpec};
use std::{collections::BTreeMap, sync::Arc};

///
/// ProjectionRegistry
///
/// Registered specifications keyed by source shape name, then target.
/// Build it once at configuration time, then share it behind an `Arc`;
/// registered specifications are never replaced.
///

#[derive(Debug, Default)]
pub struct ProjectionRegistry {
    limits: CompileConfig,
    specs: BTreeMap<&'static str, BTreeMap<&'static str, Arc<ProjectionSpec>>>,
}

impl ProjectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limits(limits: CompileConfig) -> Self {
        Self {
            limits,
            specs: BTreeMap::new(),
        }
    }

    /// Validate and register a specification.
    pub fn register(&mut self, spec: ProjectionSpec) -> Result<Arc<ProjectionSpec>, CompileError> {
        let (source, target) = (spec.source().name, spec.target().name);
        if self.contains(source, target) {
            return Err(CompileError::DuplicateProjection {
                source_shape: source,
                target,
            });
        }

        spec.validate(&self.limits)?;

        let spec = Arc::new(spec);
        self.specs
            .entry(source)
            .or_default()
            .insert(target, Arc::clone(&spec));

        Ok(spec)
    }

    #[must_use]
    pub fn get(&self, source: &str, target: &str) -> Option<Arc<ProjectionSpec>> {
        self.specs.get(source)?.get(target).map(Arc::clone)
    }

    #[must_use]
    pub fn contains(&self, source: &str, target: &str) -> bool {
        self.specs
            .get(source)
            .is_some_and(|targets| targets.contains_key(target))
    }

    #[must_use]
    pub const fn limits(&self) -> &CompileConfig {
        &self.limits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
