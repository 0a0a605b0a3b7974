//! Error types for generation and assistant setup

use archassist_ai_embed::EmbedError;
use archassist_ai_retriever::error::ConfigError;
use std::path::PathBuf;

/// Errors raised by a [`TextGenerator`](crate::generate::TextGenerator).
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The generator configuration is unusable
    #[error("Invalid generation configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP request never produced a response
    #[error("Generation request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// The generation service answered with a non-success status
    #[error("Generation service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The generation service answered 2xx without a usable completion
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Errors raised while building an [`Assistant`](crate::Assistant).
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Cannot read config file {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Retriever(#[from] ConfigError),

    #[error(transparent)]
    Embedding(#[from] EmbedError),

    #[error(transparent)]
    Generation(#[from] GenerateError),
}
