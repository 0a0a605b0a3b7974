//! # archassist-ai-assistant
//!
//! Retrieval-augmented answers for the architecture assistant. Each flow
//! retrieves grounding context from the vector store built by
//! `archassist-ai-retriever` and hands it to a text generator.
//!
//! ## Flows
//!
//! - **ask**: free-form question answered from the ingested documents
//! - **design**: concept narrative for a design brief, followed by a
//!   compliance review of that narrative
//! - **compliance**: building code review of a design description
//!
//! None of the flows fail because retrieval, embedding or generation failed.
//! They fall back to ungrounded generation or a canned response and report
//! the underlying error in the `diagnostic` field of their response.
//!
//! ## Quick Start
//!
//! ```no_run
//! use archassist_ai_assistant::{Assistant, config::AssistantConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let assistant = Assistant::from_config(&AssistantConfig::load(None)?)?;
//! let response = assistant.ask("What is the minimum corridor width?").await;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! `LLM_MODE=mock|live` selects the generator, `EMBEDDING_MODE=mock|live` the
//! embedder, `OPENAI_API_KEY` supplies the credential for both and
//! `ARCHASSIST_DATA_DIR` points at the ingested store. See [`config`].

pub mod config;
pub mod error;
pub mod flows;
pub mod generate;
pub mod prompts;

use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::generate::{TextGenerator, generator_from_config};
use archassist_ai_embed::provider_from_config;
use archassist_ai_retriever::retrieval::Retriever;
use archassist_ai_retriever::storage::FlatFileStore;
use std::sync::Arc;
use tracing::info;

pub use flows::{
    AskResponse, ComplianceReport, ComplianceStatus, DesignRequest, DesignResponse,
};

/// Retriever and generator shared by all flows.
#[derive(Clone)]
pub struct Assistant {
    retriever: Retriever,
    generator: Arc<dyn TextGenerator>,
}

impl Assistant {
    pub fn new(retriever: Retriever, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Wire a file-backed store, embedder and generator from configuration.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let store = Arc::new(FlatFileStore::new(config.retriever.store_config()));
        let embedder = provider_from_config(&config.retriever.embedding)?;
        let generator = generator_from_config(&config.generation)?;

        info!(
            "Assistant ready: data_dir={}, embedder={}, generator={}",
            config.retriever.data_dir.display(),
            embedder.provider_name(),
            generator.generator_name()
        );

        let retriever = Retriever::new(store, embedder).with_top_k(config.retriever.top_k);
        Ok(Self::new(retriever, generator))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("retriever", &self.retriever)
            .field("generator", &self.generator.generator_name())
            .finish()
    }
}
