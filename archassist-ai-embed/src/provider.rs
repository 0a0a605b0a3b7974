//! Embedding provider trait and construction from configuration

use crate::config::{EmbedConfig, EmbedMode};
use crate::error::Result;
use crate::mock::MockEmbedProvider;
use crate::openai::OpenAiEmbedProvider;
use async_trait::async_trait;
use std::sync::Arc;

/// A single embedding vector.
pub type Embedding = Vec<f32>;

/// Result of embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    /// The generated embeddings, one per input text
    pub embeddings: Vec<Embedding>,
    /// The dimension of each embedding vector
    pub dimension: usize,
}

impl EmbeddingResult {
    /// Create a new embedding result.
    ///
    /// The dimension is inferred from the first embedding vector and
    /// defaults to 0 when there are none.
    pub fn new(embeddings: Vec<Embedding>) -> Self {
        let dimension = embeddings.first().map(|e| e.len()).unwrap_or(0);
        Self {
            embeddings,
            dimension,
        }
    }

    /// Returns the number of embedding vectors in this result.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Returns `true` if this result contains no embedding vectors.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

/// Trait for embedding providers that can generate embeddings from text
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding for a single text
    async fn embed_text(&self, text: &str) -> Result<Embedding>;

    /// Generate embeddings for multiple texts.
    ///
    /// Texts are embedded one request at a time, in order; the first failure
    /// aborts the whole call.
    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_text(text).await?);
        }
        Ok(EmbeddingResult::new(embeddings))
    }

    /// Get the dimension of embeddings produced by this provider
    fn embedding_dimension(&self) -> usize;

    /// Get the name/identifier of this provider
    fn provider_name(&self) -> &str;
}

/// Build the provider selected by `config.mode`.
///
/// The configuration is validated first, so a live provider without an API
/// key is reported here rather than on the first request.
pub fn provider_from_config(config: &EmbedConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    config.validate()?;

    let provider: Arc<dyn EmbeddingProvider> = match config.mode {
        EmbedMode::Mock => Arc::new(MockEmbedProvider::new(config.dimension)),
        EmbedMode::Live => Arc::new(OpenAiEmbedProvider::new(config.clone())?),
    };

    tracing::info!(
        "Using {} embedding provider (dimension {})",
        provider.provider_name(),
        provider.embedding_dimension()
    );
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_result() {
        let result = EmbeddingResult::new(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]);

        assert_eq!(result.len(), 2);
        assert_eq!(result.dimension, 3);
        assert!(!result.is_empty());

        let empty = EmbeddingResult::new(vec![]);
        assert!(empty.is_empty());
        assert_eq!(empty.dimension, 0);
    }

    #[test]
    fn test_provider_from_config() {
        let provider = provider_from_config(&EmbedConfig::mock().with_dimension(12)).unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.embedding_dimension(), 12);

        let provider = provider_from_config(&EmbedConfig::live("sk-test")).unwrap();
        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.embedding_dimension(), 1536);
    }

    #[test]
    fn test_provider_from_invalid_config() {
        let config = EmbedConfig::mock().with_mode(EmbedMode::Live);
        assert!(provider_from_config(&config).is_err());
    }
}
