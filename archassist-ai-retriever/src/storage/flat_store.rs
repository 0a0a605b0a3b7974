//! File-backed implementation of [`VectorStore`].
//!
//! The store keeps its index and document list in memory behind one
//! `RwLock` and mirrors them to two files in the data directory:
//!
//! - `vectors.index`: the [`FlatIndex`] binary format
//! - `documents.json`: a JSON array of strings
//!
//! Every `add` persists immediately. Each file is written to a temporary
//! file in the same directory and renamed into place, so a reader sees
//! either the old or the new file, never a partial one.
//!
//! `search` always reloads from durable storage before querying, so a
//! process that only serves queries observes batches added by a separate
//! ingestion run without restarting.

use super::{FlatIndex, SearchHit, StoreStats, VectorStore, resolve_hits};
use crate::error::{Artifact, StoreError, StoreResult};
use archassist_ai_embed::Embedding;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// File name of the persisted index inside the data directory.
pub const INDEX_FILE_NAME: &str = "vectors.index";

/// File name of the persisted document list inside the data directory.
pub const DOCUMENTS_FILE_NAME: &str = "documents.json";

/// Location and shape of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub dimension: usize,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>, dimension: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            dimension,
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(INDEX_FILE_NAME)
    }

    pub fn documents_path(&self) -> PathBuf {
        self.data_dir.join(DOCUMENTS_FILE_NAME)
    }
}

#[derive(Debug)]
struct StoreState {
    index: FlatIndex,
    documents: Vec<String>,
}

/// Vector store persisted as two sibling files.
#[derive(Debug)]
pub struct FlatFileStore {
    config: StoreConfig,
    state: RwLock<StoreState>,
}

impl FlatFileStore {
    /// Create an empty, uninitialized store. Nothing is read or written.
    pub fn new(config: StoreConfig) -> Self {
        let state = StoreState {
            index: FlatIndex::new(config.dimension),
            documents: Vec::new(),
        };
        Self {
            config,
            state: RwLock::new(state),
        }
    }

    /// Create a store and load the persisted pair if it exists.
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        let store = Self::new(config);
        if store.refresh().await? {
            info!(
                "Opened store at {} with {} documents",
                store.config.data_dir.display(),
                store.len().await
            );
        } else {
            debug!(
                "No persisted store at {}, starting empty",
                store.config.data_dir.display()
            );
        }
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current size and whether the artifacts exist on disk.
    pub async fn stats(&self) -> StoreStats {
        let state = self.state.read().await;
        StoreStats {
            documents: state.documents.len(),
            vectors: state.index.len(),
            dimension: self.config.dimension,
            data_dir: self.config.data_dir.clone(),
            index_persisted: self.config.index_path().exists(),
            documents_persisted: self.config.documents_path().exists(),
        }
    }

    async fn persist(&self, state: &StoreState) -> StoreResult<()> {
        let index_bytes = state.index.encode();
        let documents_bytes = serde_json::to_vec(&state.documents)
            .map_err(|e| StoreError::corrupt(Artifact::Documents, self.config.documents_path(), e.to_string()))?;
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || -> StoreResult<()> {
            std::fs::create_dir_all(&config.data_dir)?;
            // Documents first: a reader racing this save sees the mismatch
            // and keeps its previous snapshot instead of a torn pair.
            write_atomically(&config.data_dir, &config.documents_path(), &documents_bytes)?;
            write_atomically(&config.data_dir, &config.index_path(), &index_bytes)?;
            Ok(())
        })
        .await??;

        debug!(
            "Saved {} vectors to {}",
            state.index.len(),
            self.config.data_dir.display()
        );
        Ok(())
    }
}

fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|e| e.error)?;
    Ok(())
}

async fn read_artifact(artifact: Artifact, path: &Path) -> StoreResult<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
            artifact,
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl VectorStore for FlatFileStore {
    async fn add(&self, texts: Vec<String>, vectors: Vec<Embedding>) -> StoreResult<()> {
        if texts.len() != vectors.len() {
            return Err(StoreError::BatchLengthMismatch {
                texts: texts.len(),
                vectors: vectors.len(),
            });
        }
        if vectors.is_empty() {
            debug!("Ignoring empty batch");
            return Ok(());
        }

        let mut state = self.state.write().await;
        state.index.validate_batch(&vectors)?;

        let previous_len = state.documents.len();
        state.index.add(&vectors)?;
        state.documents.extend(texts);

        if let Err(e) = self.persist(&state).await {
            warn!("Save failed, rolling back {} documents: {}", vectors.len(), e);
            state.index.truncate(previous_len);
            state.documents.truncate(previous_len);
            // The documents file may already hold the rejected batch
            if let Err(restore) = self.persist(&state).await {
                warn!("Could not restore persisted store after failed save: {}", restore);
            }
            return Err(e);
        }

        info!(
            "Added {} documents (corpus size {})",
            vectors.len(),
            state.documents.len()
        );
        Ok(())
    }

    async fn save(&self) -> StoreResult<()> {
        let state = self.state.read().await;
        self.persist(&state).await
    }

    async fn load_index(&self) -> StoreResult<FlatIndex> {
        let path = self.config.index_path();
        let bytes = read_artifact(Artifact::Index, &path).await?;
        FlatIndex::decode(&bytes).map_err(|message| StoreError::corrupt(Artifact::Index, path, message))
    }

    async fn load_documents(&self) -> StoreResult<Vec<String>> {
        let path = self.config.documents_path();
        let bytes = read_artifact(Artifact::Documents, &path).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::corrupt(Artifact::Documents, path, e.to_string()))
    }

    async fn refresh(&self) -> StoreResult<bool> {
        // Held across the reads so a concurrent `add` cannot persist between
        // the load and the swap and then be overwritten by the older pair.
        let mut state = self.state.write().await;
        if !(self.config.index_path().exists() && self.config.documents_path().exists()) {
            return Ok(false);
        }

        let index = self.load_index().await?;
        let documents = self.load_documents().await?;

        if index.dimension() != self.config.dimension {
            return Err(StoreError::corrupt(
                Artifact::Index,
                self.config.index_path(),
                format!(
                    "index dimension {} does not match configured dimension {}",
                    index.dimension(),
                    self.config.dimension
                ),
            ));
        }
        if index.len() != documents.len() {
            return Err(StoreError::Inconsistent {
                vectors: index.len(),
                documents: documents.len(),
            });
        }

        state.index = index;
        state.documents = documents;
        Ok(true)
    }

    async fn search(&self, query: &[f32], top_k: usize) -> StoreResult<Vec<SearchHit>> {
        if let Err(e) = self.refresh().await {
            warn!("Could not reload persisted store, searching in-memory snapshot: {}", e);
        }

        let state = self.state.read().await;
        if state.documents.is_empty() {
            debug!("Search on empty store");
            return Ok(Vec::new());
        }

        let k = top_k.min(state.documents.len());
        let neighbors = state.index.search(query, k)?;
        Ok(resolve_hits(&neighbors, &state.documents))
    }

    async fn len(&self) -> usize {
        self.state.read().await.documents.len()
    }

    async fn documents(&self) -> Vec<String> {
        self.state.read().await.documents.clone()
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}
