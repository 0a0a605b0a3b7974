//! Error types for the embedding system

/// Result type for embedding operations.
///
/// This is a convenience type alias that uses [`EmbedError`] as the error type.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Error type for all embedding operations.
///
/// Covers configuration problems, failures talking to a remote embedding
/// service, and responses that do not have the shape the caller asked for.
/// A rate-limited request is deliberately absent: providers recover from it
/// by falling back to the mock embedding instead of surfacing an error.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// Error when the embedding configuration is invalid
    #[error("Invalid embedding configuration: {message}")]
    InvalidConfig { message: String },

    /// The HTTP request never produced a response (connect error, timeout, ...)
    #[error("Embedding request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// The embedding service answered with a non-success status other than 429
    #[error("Embedding service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The embedding service answered 2xx but the body had no usable embedding
    #[error("Malformed embedding response: {message}")]
    MalformedResponse { message: String },

    /// The produced vector does not have the configured dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbedError {
    /// Create an invalid configuration error with a custom message.
    ///
    /// # Arguments
    /// * `message` - A descriptive error message explaining what's wrong with the configuration
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a malformed response error with a custom message.
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Whether the error came from the remote service rather than local setup.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Api { .. } | Self::MalformedResponse { .. }
        )
    }
}
