//! Configuration for embedding providers

use crate::error::{EmbedError, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Default embedding dimension (matches `text-embedding-3-small`).
pub const DEFAULT_DIMENSION: usize = 1536;

/// Default remote embedding model.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Default base URL of the OpenAI-compatible API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default timeout for a single remote embedding request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable selecting the embedding mode.
pub const ENV_EMBEDDING_MODE: &str = "EMBEDDING_MODE";

/// Environment variable holding the API credential.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

/// How embeddings are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    /// Deterministic hash-seeded vectors, no network
    #[default]
    Mock,
    /// Remote OpenAI-compatible embedding API
    Live,
}

impl FromStr for EmbedMode {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(EmbedMode::Mock),
            "live" | "openai" | "remote" => Ok(EmbedMode::Live),
            other => Err(EmbedError::invalid_config(format!(
                "Unknown embedding mode '{other}' (expected 'mock' or 'live')"
            ))),
        }
    }
}

impl std::fmt::Display for EmbedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbedMode::Mock => write!(f, "mock"),
            EmbedMode::Live => write!(f, "live"),
        }
    }
}

/// Configuration for embedding providers
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(default)]
pub struct EmbedConfig {
    /// Which provider produces embeddings
    #[builder(default)]
    pub mode: EmbedMode,
    /// Remote model identifier sent with every request
    #[builder(default = r#"DEFAULT_MODEL.to_string()"#)]
    pub model_name: String,
    /// Dimension of every produced vector
    #[builder(default = "DEFAULT_DIMENSION")]
    pub dimension: usize,
    /// Base URL of the OpenAI-compatible API (without trailing `/embeddings`)
    #[builder(default = r#"DEFAULT_API_BASE.to_string()"#)]
    pub api_base: String,
    /// API credential, required in live mode. Never serialized.
    #[builder(default, setter(into, strip_option))]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[builder(default = "DEFAULT_TIMEOUT_SECS")]
    pub timeout_secs: u64,
}

impl EmbedConfig {
    /// Create a new embedding configuration using the builder
    pub fn builder() -> EmbedConfigBuilder {
        EmbedConfigBuilder::default()
    }

    /// Mock-mode configuration with the default dimension
    pub fn mock() -> Self {
        Self::default()
    }

    /// Live-mode configuration using the given API key
    pub fn live(api_key: impl Into<String>) -> Self {
        Self {
            mode: EmbedMode::Live,
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Default configuration overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values from an environment lookup function.
    ///
    /// `EMBEDDING_MODE` selects the mode and `OPENAI_API_KEY` supplies the
    /// credential. Empty values are ignored.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_EMBEDDING_MODE).filter(|v| !v.trim().is_empty()) {
            self.mode = mode.parse()?;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
        Ok(self)
    }

    /// Set the embedding dimension (builder style)
    pub fn with_dimension(self, dimension: usize) -> Self {
        Self { dimension, ..self }
    }

    /// Set the mode (builder style)
    pub fn with_mode(self, mode: EmbedMode) -> Self {
        Self { mode, ..self }
    }

    /// Set the API base URL (builder style)
    pub fn with_api_base<S: Into<String>>(self, api_base: S) -> Self {
        Self {
            api_base: api_base.into(),
            ..self
        }
    }

    /// Set the request timeout (builder style)
    pub fn with_timeout_secs(self, timeout_secs: u64) -> Self {
        Self {
            timeout_secs,
            ..self
        }
    }

    /// Get the model identifier
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of the embeddings endpoint
    pub fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.api_base.trim_end_matches('/'))
    }

    /// Validate the configuration for the selected mode
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(EmbedError::invalid_config(
                "Embedding dimension must be greater than zero",
            ));
        }

        if self.mode == EmbedMode::Live {
            if self.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
                tracing::error!("Live embedding mode selected without {}", ENV_API_KEY);
                return Err(EmbedError::invalid_config(format!(
                    "Live embedding mode requires an API key (set {ENV_API_KEY})"
                )));
            }
            if self.model_name.trim().is_empty() {
                return Err(EmbedError::invalid_config("Model name must not be empty"));
            }
            if self.timeout_secs == 0 {
                return Err(EmbedError::invalid_config(
                    "Request timeout must be greater than zero",
                ));
            }
        }

        tracing::debug!(
            "Embedding configuration valid: mode={}, dimension={}",
            self.mode,
            self.dimension
        );
        Ok(())
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            mode: EmbedMode::Mock,
            model_name: DEFAULT_MODEL.to_string(),
            dimension: DEFAULT_DIMENSION,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
