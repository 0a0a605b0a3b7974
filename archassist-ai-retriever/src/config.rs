//! Retriever configuration.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional TOML file, and environment variables.
//!
//! ```toml
//! data_dir = "data"
//! top_k = 3
//! skip_duplicates = true
//!
//! [embedding]
//! mode = "mock"
//! dimension = 1536
//! ```

use crate::error::ConfigError;
use crate::retrieval::{DEFAULT_TOP_K, IngestConfig};
use crate::storage::StoreConfig;
use archassist_ai_embed::EmbedConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`RetrieverConfig::data_dir`].
pub const ENV_DATA_DIR: &str = "ARCHASSIST_DATA_DIR";

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Directory holding `vectors.index` and `documents.json`
    pub data_dir: PathBuf,
    /// Documents per query context
    pub top_k: usize,
    /// Content-hash dedup during ingestion
    pub skip_duplicates: bool,
    pub embedding: EmbedConfig,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            top_k: DEFAULT_TOP_K,
            skip_duplicates: true,
            embedding: EmbedConfig::default(),
        }
    }
}

impl RetrieverConfig {
    pub fn from_toml_str(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(path, &contents)
    }

    /// Defaults or `path`, overlaid with the process environment, validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with an explicit environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.apply_env_with(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `ARCHASSIST_DATA_DIR` plus the embedding variables.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self.embedding = self.embedding.apply_env_with(lookup)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be at least 1".to_string()));
        }
        self.embedding.validate()?;
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.data_dir, self.embedding.dimension)
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            skip_duplicates: self.skip_duplicates,
        }
    }
}
