//! Compiled-shape cache, owned by a mapper.

use super::CompiledProjection;
use crate::{
    binding::ParameterBindings,
    config::CacheConfig,
    expr::fingerprint::{write_kind, write_str, write_tag, write_u32},
    obs::sink::{self, MetricsEvent},
    projection::{ProjectionSpec, SourceDesc},
};
use sha2::{Digest, Sha256};
use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

///
/// ProjectionKey
///
/// Identity of a compiled shape: the `(source, target)` pair plus the name
/// and declared kind of every parameter the specification reads. Bound
/// values never contribute, so rebinding a value maps to the same key.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ProjectionKey([u8; 32]);

impl ProjectionKey {
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn new(spec: &ProjectionSpec, bindings: &ParameterBindings) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"projkey:v1");
        write_str(&mut hasher, spec.source().name);
        write_str(&mut hasher, spec.target().name);

        let parameters: Vec<&str> = spec
            .members()
            .iter()
            .filter_map(|member| match &member.source {
                SourceDesc::Parameter(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();

        write_u32(&mut hasher, parameters.len() as u32);
        for name in parameters {
            write_str(&mut hasher, name);
            match bindings.kind_of(name) {
                Some(kind) => {
                    write_tag(&mut hasher, 0x01);
                    write_kind(&mut hasher, kind);
                }
                None => write_tag(&mut hasher, 0x00),
            }
        }

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

///
/// CacheStats
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
}

///
/// ShapeCache
///
/// Compiled projections keyed by [`ProjectionKey`]. Once `max_entries` is
/// reached new shapes are compiled but not retained.
///

#[derive(Debug)]
pub struct ShapeCache {
    enabled: bool,
    max_entries: usize,
    shapes: Mutex<BTreeMap<ProjectionKey, Arc<CompiledProjection>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ShapeCache {
    #[must_use]
    pub const fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled && cfg!(feature = "shape-cache"),
            max_entries: config.max_entries,
            shapes: Mutex::new(BTreeMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn get(&self, key: &ProjectionKey) -> Option<Arc<CompiledProjection>> {
        if !self.enabled {
            return None;
        }

        self.shapes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: ProjectionKey, compiled: Arc<CompiledProjection>) {
        if !self.enabled {
            return;
        }

        let mut shapes = self.shapes.lock().unwrap_or_else(PoisonError::into_inner);
        if shapes.len() < self.max_entries || shapes.contains_key(&key) {
            shapes.insert(key, compiled);
        }
    }

    // Stats are best-effort; relaxed ordering is enough.
    pub fn record_hit(&self) {
        if !self.enabled {
            return;
        }
        self.hits.fetch_add(1, Ordering::Relaxed);
        sink::record(MetricsEvent::CacheHit);
    }

    pub fn record_miss(&self) {
        if !self.enabled {
            return;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        sink::record(MetricsEvent::CacheMiss);
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let size = self
            .shapes
            .lock()
            .map_or(0, |shapes| shapes.len());

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size,
        }
    }

    /// Drop all cached shapes and zero the counters.
    pub fn clear(&self) {
        self.shapes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
