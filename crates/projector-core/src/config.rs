//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! [cache]
//! enabled = true
//! max_entries = 256
//!
//! [compile]
//! max_fields = 64
//! max_path_depth = 8
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid projector config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid projector config: {0}")]
    Invalid(String),
}

///
/// ProjectorConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectorConfig {
    pub cache: CacheConfig,
    pub compile: CompileConfig,
}

impl ProjectorConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.compile.max_fields == 0 {
            return Err(ConfigError::Invalid(
                "compile.max_fields must be at least 1".to_string(),
            ));
        }
        if self.compile.max_path_depth == 0 {
            return Err(ConfigError::Invalid(
                "compile.max_path_depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

///
/// CacheConfig
/// Compiled-shape cache settings.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Also gated by the `shape-cache` crate feature.
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "shape-cache"),
            max_entries: 256,
        }
    }
}

///
/// CompileConfig
/// Limits enforced while validating and compiling specifications.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    pub max_fields: usize,
    pub max_path_depth: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            max_fields: 64,
            max_path_depth: 8,
        }
    }
}
