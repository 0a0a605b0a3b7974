//! Deterministic offline embeddings.
//!
//! The text is hashed with BLAKE3 and the hasher's extendable output is read
//! as a stream of `u32` values, each scaled into `[0, 1)`. Identical text
//! always yields the identical vector, and distinct text yields an unrelated
//! vector, which is all retrieval tests and offline development need.

use crate::error::Result;
use crate::provider::{Embedding, EmbeddingProvider};
use async_trait::async_trait;

const MANTISSA_SCALE: f32 = (1u32 << 24) as f32;

/// Produce the mock embedding for `text` with `dimension` components.
pub fn mock_embedding(text: &str, dimension: usize) -> Embedding {
    let mut hasher = blake3::Hasher::new();
    hasher.update(text.as_bytes());
    let mut stream = hasher.finalize_xof();

    let mut bytes = vec![0u8; dimension * 4];
    stream.fill(&mut bytes);

    bytes
        .chunks_exact(4)
        .map(|word| {
            let value = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            // Top 24 bits fit the f32 mantissa exactly, so the result stays below 1.0
            (value >> 8) as f32 / MANTISSA_SCALE
        })
        .collect()
}

/// Embedding provider that never leaves the process.
#[derive(Debug, Clone)]
pub struct MockEmbedProvider {
    dimension: usize,
}

impl MockEmbedProvider {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedProvider {
    async fn embed_text(&self, text: &str) -> Result<Embedding> {
        Ok(mock_embedding(text, self.dimension))
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_embedding_is_deterministic() {
        let a = mock_embedding("Floor plans must include egress routes.", 1536);
        let b = mock_embedding("Floor plans must include egress routes.", 1536);
        assert_eq!(a, b);
        assert_eq!(a.len(), 1536);
    }

    #[test]
    fn test_mock_embedding_distinguishes_text() {
        let a = mock_embedding("timber frame", 64);
        let b = mock_embedding("timber frames", 64);
        let c = mock_embedding("", 64);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_mock_embedding_range() {
        let v = mock_embedding("concrete", 4096);
        assert!(v.iter().all(|x| (0.0..1.0).contains(x)));
        // Not degenerate
        assert!(v.iter().any(|&x| x > 0.5));
        assert!(v.iter().any(|&x| x < 0.5));
    }

    #[test]
    fn test_prefix_stability() {
        // The XOF stream is consumed in order, so shorter vectors are prefixes
        let long = mock_embedding("atrium", 32);
        let short = mock_embedding("atrium", 8);
        assert_eq!(&long[..8], &short[..]);
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockEmbedProvider::new(16);
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.embedding_dimension(), 16);

        let v = provider.embed_text("hello").await.unwrap();
        assert_eq!(v, mock_embedding("hello", 16));

        let texts = vec!["one".to_string(), "two".to_string()];
        let result = provider.embed_texts(&texts).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.dimension, 16);
        assert_eq!(result.embeddings[1], mock_embedding("two", 16));
    }
}
