//! Query-time orchestration: embed, search, assemble context.

use crate::error::RetrieveError;
use crate::storage::{SearchHit, VectorStore, resolve_hits};
use archassist_ai_embed::EmbeddingProvider;
use std::sync::Arc;
use tracing::{debug, warn};

/// Number of documents returned when the caller does not choose.
pub const DEFAULT_TOP_K: usize = 3;

/// Separator placed between documents in an assembled context string.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Embeds queries and resolves them against a [`VectorStore`].
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// The `top_k` documents nearest to `query`, nearest first.
    ///
    /// Reads both persisted artifacts directly, so a store that has never
    /// been ingested fails with [`StoreError::NotFound`](crate::error::StoreError::NotFound).
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>, RetrieveError> {
        let query_vector = self.embedder.embed_text(query).await?;
        let index = self.store.load_index().await?;
        let documents = self.store.load_documents().await?;

        let neighbors = index.search(&query_vector, top_k)?;
        Ok(resolve_hits(&neighbors, &documents)
            .into_iter()
            .map(|hit| hit.document)
            .collect())
    }

    /// Ranked hits with distances, served through [`VectorStore::search`].
    ///
    /// An empty or uninitialized store yields no hits.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, RetrieveError> {
        let query_vector = self.embedder.embed_text(query).await?;
        let hits = self.store.search(&query_vector, top_k).await?;
        debug!("Query matched {} documents", hits.len());
        Ok(hits)
    }

    /// Context for a generation call: the top documents joined by a blank line.
    pub async fn try_retrieve_context(&self, query: &str) -> Result<String, RetrieveError> {
        let hits = self.search(query, self.top_k).await?;
        Ok(hits
            .iter()
            .map(|hit| hit.document.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR))
    }

    /// Like [`try_retrieve_context`](Self::try_retrieve_context) but never
    /// fails. An empty string means no grounding is available.
    pub async fn retrieve_context(&self, query: &str) -> String {
        match self.try_retrieve_context(query).await {
            Ok(context) => context,
            Err(e) => {
                warn!("Retrieval failed, continuing without context: {}", e);
                String::new()
            }
        }
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("embedder", &self.embedder.provider_name())
            .field("dimension", &self.store.dimension())
            .field("top_k", &self.top_k)
            .finish()
    }
}
