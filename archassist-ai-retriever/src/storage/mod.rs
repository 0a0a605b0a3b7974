//! Storage abstraction layer for archassist-ai-retriever
//!
//! A store pairs a numeric [`FlatIndex`] with a document list of the same
//! length: position *i* in the document list is the *i*-th vector added to
//! the index. Both halves are persisted together as two sibling files and
//! loaded together; one without the other means ingestion has not run.
//!
//! ## Key Components
//!
//! - **VectorStore**: async trait used by the retriever and the ingestion pipeline
//! - **FlatIndex**: exact squared-L2 index over contiguous `f32` rows
//! - **FlatFileStore**: file-backed implementation with reload-on-search
//!
//! ## Architecture
//!
//! ```text
//! IngestionPipeline ── add ──┐
//!                            ├─ VectorStore ── FlatFileStore ── vectors.index
//! Retriever ──── search ─────┘                               └─ documents.json
//! ```

use crate::error::StoreResult;
use archassist_ai_embed::Embedding;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;

pub mod flat_index;
pub mod flat_store;

pub use flat_index::{FlatIndex, Neighbor};
pub use flat_store::{DOCUMENTS_FILE_NAME, FlatFileStore, INDEX_FILE_NAME, StoreConfig};

/// A matched document with its position in the corpus and squared L2 distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub position: usize,
    pub distance: f32,
    pub document: String,
}

/// Snapshot of store size and persistence state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub documents: usize,
    pub vectors: usize,
    pub dimension: usize,
    pub data_dir: PathBuf,
    pub index_persisted: bool,
    pub documents_persisted: bool,
}

impl StoreStats {
    /// `populated` once at least one document is indexed, `uninitialized` before.
    pub fn state(&self) -> &'static str {
        if self.documents > 0 {
            "populated"
        } else {
            "uninitialized"
        }
    }
}

/// Append-only vector store with persisted state.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append a batch of documents and their vectors, then persist.
    ///
    /// The whole batch is rejected if any row has the wrong dimension or the
    /// two lists differ in length.
    async fn add(&self, texts: Vec<String>, vectors: Vec<Embedding>) -> StoreResult<()>;

    /// Persist the current index and document list.
    async fn save(&self) -> StoreResult<()>;

    /// Read the persisted index from disk.
    async fn load_index(&self) -> StoreResult<FlatIndex>;

    /// Read the persisted document list from disk.
    async fn load_documents(&self) -> StoreResult<Vec<String>>;

    /// Replace the in-memory snapshot with the persisted pair if both exist.
    ///
    /// Returns `true` when a snapshot was loaded.
    async fn refresh(&self) -> StoreResult<bool>;

    /// Nearest documents to `query`, nearest first, at most `top_k`.
    async fn search(&self, query: &[f32], top_k: usize) -> StoreResult<Vec<SearchHit>>;

    /// Number of documents currently held in memory.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Copy of the in-memory document list.
    async fn documents(&self) -> Vec<String>;

    /// Dimension every stored vector must have.
    fn dimension(&self) -> usize;
}

/// Map index neighbours to their documents.
///
/// Positions with no corresponding document are the "no match" sentinel and
/// are skipped.
pub fn resolve_hits(neighbors: &[Neighbor], documents: &[String]) -> Vec<SearchHit> {
    neighbors
        .iter()
        .filter_map(|n| {
            documents.get(n.position).map(|doc| SearchHit {
                position: n.position,
                distance: n.distance,
                document: doc.clone(),
            })
        })
        .collect()
}
