//! # archassist-ai-embed
//!
//! Text embeddings for the architecture assistant's retrieval subsystem.
//! Two providers sit behind one async trait:
//!
//! - **Mock**: deterministic vectors derived from a BLAKE3 hash of the text.
//!   No network, no state, identical output on every run. Used for offline
//!   development and tests.
//! - **Live**: an OpenAI-compatible `/embeddings` endpoint with a bounded
//!   request timeout. When the service rate-limits a request (HTTP 429) the
//!   provider answers with the mock embedding instead of failing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use archassist_ai_embed::{EmbedConfig, provider_from_config};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = provider_from_config(&EmbedConfig::from_env()?)?;
//!
//! let texts = vec!["Stair width".to_string(), "Fire egress".to_string()];
//! let result = provider.embed_texts(&texts).await?;
//!
//! println!("Generated {} embeddings of dimension {}",
//!          result.len(), result.dimension);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`config`]: provider selection, model, dimension, credentials
//! - [`provider`]: the [`EmbeddingProvider`] trait and the factory
//! - [`mock`]: hash-seeded embeddings
//! - [`openai`]: remote embeddings with rate-limit fallback
//! - [`error`]: error types and result handling
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`] using the crate's [`EmbedError`] type.
//! Transport failures and non-429 error statuses are fatal to the caller;
//! there is no retry loop.

pub mod config;
pub mod error;
pub mod mock;
pub mod openai;
pub mod provider;

// Re-export main types for easy access
pub use config::{DEFAULT_DIMENSION, EmbedConfig, EmbedMode};
pub use error::{EmbedError, Result};
pub use mock::{MockEmbedProvider, mock_embedding};
pub use openai::OpenAiEmbedProvider;
pub use provider::{Embedding, EmbeddingProvider, EmbeddingResult, provider_from_config};
