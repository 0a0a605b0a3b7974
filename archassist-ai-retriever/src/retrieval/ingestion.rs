//! Bulk loading of source documents into a [`VectorStore`].
//!
//! One run loads a directory, drops blank and duplicate documents, embeds
//! each remaining document with its own embedder call and appends the whole
//! batch with a single `add`. If any embedding fails nothing is stored.

use super::loader::{DocumentLoader, LoadFailure};
use crate::error::IngestError;
use crate::storage::VectorStore;
use archassist_ai_embed::EmbeddingProvider;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Content hash used for duplicate detection, over the trimmed text.
pub fn content_hash(text: &str) -> [u8; 32] {
    *blake3::hash(text.trim().as_bytes()).as_bytes()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Skip documents whose content is already in the store or earlier in
    /// the same run
    pub skip_duplicates: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            skip_duplicates: true,
        }
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    /// Documents embedded and added to the store
    pub ingested: usize,
    pub skipped_empty: usize,
    pub skipped_duplicate: usize,
    /// Files that matched a supported extension but could not be read
    pub failed: Vec<PathBuf>,
    /// Store size after the run
    pub corpus_size: usize,
}

struct PendingDocument {
    source: Option<PathBuf>,
    text: String,
}

/// Loads, deduplicates and embeds source documents, then adds them to the store in one batch.
pub struct IngestionPipeline {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    loader: DocumentLoader,
    config: IngestConfig,
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            loader: DocumentLoader,
            config: IngestConfig::default(),
        }
    }

    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest every `.txt` and `.pdf` file directly inside `dir`.
    pub async fn ingest(&self, dir: &Path) -> Result<IngestReport, IngestError> {
        info!("Ingesting documents from {}", dir.display());
        let loaded = self.loader.load_dir(dir).await?;

        let pending = loaded
            .documents
            .into_iter()
            .map(|doc| PendingDocument {
                source: Some(doc.path),
                text: doc.content,
            })
            .collect();
        let failed = loaded
            .failures
            .into_iter()
            .map(|LoadFailure { path, .. }| path)
            .collect();

        self.ingest_pending(pending, failed).await
    }

    /// Ingest texts that are already in memory.
    pub async fn ingest_texts(&self, texts: Vec<String>) -> Result<IngestReport, IngestError> {
        let pending = texts
            .into_iter()
            .map(|text| PendingDocument { source: None, text })
            .collect();
        self.ingest_pending(pending, Vec::new()).await
    }

    async fn ingest_pending(
        &self,
        pending: Vec<PendingDocument>,
        failed: Vec<PathBuf>,
    ) -> Result<IngestReport, IngestError> {
        // Pick up a corpus persisted by an earlier run so `add` appends to it
        self.store.refresh().await?;

        let mut report = IngestReport {
            failed,
            ..IngestReport::default()
        };

        let mut seen: HashSet<[u8; 32]> = if self.config.skip_duplicates {
            self.store
                .documents()
                .await
                .iter()
                .map(|doc| content_hash(doc))
                .collect()
        } else {
            HashSet::new()
        };

        let mut texts = Vec::new();
        let mut vectors = Vec::new();
        for doc in pending {
            let text = doc.text.trim();
            let label = doc
                .source
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<inline>".to_string());

            if text.is_empty() {
                debug!("Skipping empty document {}", label);
                report.skipped_empty += 1;
                continue;
            }
            if self.config.skip_duplicates {
                let hash = content_hash(text);
                if !seen.insert(hash) {
                    debug!(
                        "Skipping duplicate document {} ({})",
                        label,
                        hex::encode(&hash[..8])
                    );
                    report.skipped_duplicate += 1;
                    continue;
                }
            }

            let vector = self
                .embedder
                .embed_text(text)
                .await
                .map_err(|source| IngestError::Embedding {
                    path: doc.source.clone().unwrap_or_default(),
                    source,
                })?;
            texts.push(text.to_string());
            vectors.push(vector);
        }

        report.ingested = texts.len();
        self.store.add(texts, vectors).await?;
        report.corpus_size = self.store.len().await;

        info!("Ingested {} documents", report.ingested);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FlatFileStore, StoreConfig};
    use anyhow::Result;
    use archassist_ai_embed::{EmbedError, Embedding, MockEmbedProvider};
    use async_trait::async_trait;
    use tempfile::{TempDir, tempdir};
    use tracing_test::traced_test;

    const DIM: usize = 16;

    fn pipeline_in(dir: &TempDir) -> (Arc<FlatFileStore>, IngestionPipeline) {
        let store = Arc::new(FlatFileStore::new(StoreConfig::new(
            dir.path().join("data"),
            DIM,
        )));
        let pipeline = IngestionPipeline::new(store.clone(), Arc::new(MockEmbedProvider::new(DIM)));
        (store, pipeline)
    }

    fn write_sources(dir: &TempDir, files: &[(&str, &str)]) -> Result<PathBuf> {
        let source = dir.path().join("sources");
        std::fs::create_dir_all(&source)?;
        for (name, content) in files {
            std::fs::write(source.join(name), content)?;
        }
        Ok(source)
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed_text(&self, _text: &str) -> archassist_ai_embed::Result<Embedding> {
            Err(EmbedError::Api {
                status: 500,
                message: "upstream down".to_string(),
            })
        }

        fn embedding_dimension(&self) -> usize {
            DIM
        }

        fn provider_name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_content_hash_ignores_surrounding_whitespace() {
        assert_eq!(content_hash("setbacks"), content_hash("  setbacks\n"));
        assert_ne!(content_hash("setbacks"), content_hash("set backs"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_ingest_directory() -> Result<()> {
        let temp_dir = tempdir()?;
        let source = write_sources(
            &temp_dir,
            &[
                ("a.txt", "Fire exits every 30 m.\n"),
                ("b.txt", "Minimum ceiling height 2.4 m."),
                ("blank.txt", "   \n"),
                ("readme.md", "not ingested"),
            ],
        )?;
        let (store, pipeline) = pipeline_in(&temp_dir);

        let report = pipeline.ingest(&source).await?;
        assert_eq!(report.ingested, 2);
        assert_eq!(report.skipped_empty, 1);
        assert_eq!(report.corpus_size, 2);
        assert!(report.failed.is_empty());

        assert_eq!(
            store.load_documents().await?,
            vec!["Fire exits every 30 m.", "Minimum ceiling height 2.4 m."]
        );
        assert_eq!(store.load_index().await?.len(), 2);
        assert!(logs_contain("Ingested 2 documents"));
        Ok(())
    }

    #[tokio::test]
    async fn test_reingest_skips_duplicates() -> Result<()> {
        let temp_dir = tempdir()?;
        let source = write_sources(&temp_dir, &[("a.txt", "alpha"), ("b.txt", "beta")])?;
        let (_, pipeline) = pipeline_in(&temp_dir);
        pipeline.ingest(&source).await?;

        // A second process over the same data directory
        std::fs::write(source.join("c.txt"), "gamma")?;
        std::fs::write(source.join("copy.txt"), "  alpha  ")?;
        let (store, pipeline) = pipeline_in(&temp_dir);
        let report = pipeline.ingest(&source).await?;

        assert_eq!(report.ingested, 1);
        assert_eq!(report.skipped_duplicate, 3);
        assert_eq!(report.corpus_size, 3);
        assert_eq!(store.load_documents().await?, vec!["alpha", "beta", "gamma"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicates_appended_when_dedup_disabled() -> Result<()> {
        let temp_dir = tempdir()?;
        let (store, pipeline) = pipeline_in(&temp_dir);
        let pipeline = pipeline.with_config(IngestConfig {
            skip_duplicates: false,
        });

        pipeline
            .ingest_texts(vec!["same".to_string(), "same".to_string()])
            .await?;
        let report = pipeline.ingest_texts(vec!["same".to_string()]).await?;

        assert_eq!(report.skipped_duplicate, 0);
        assert_eq!(report.corpus_size, 3);
        assert_eq!(store.len().await, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_embedding_failure_stores_nothing() -> Result<()> {
        let temp_dir = tempdir()?;
        let source = write_sources(&temp_dir, &[("a.txt", "alpha")])?;
        let store = Arc::new(FlatFileStore::new(StoreConfig::new(
            temp_dir.path().join("data"),
            DIM,
        )));
        let pipeline = IngestionPipeline::new(store.clone(), Arc::new(FailingEmbedder));

        let err = pipeline.ingest(&source).await.unwrap_err();
        match err {
            IngestError::Embedding { path, .. } => assert!(path.ends_with("a.txt")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.is_empty().await);
        assert!(!store.config().index_path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_directory_ingests_nothing() -> Result<()> {
        let temp_dir = tempdir()?;
        let source = write_sources(&temp_dir, &[])?;
        let (store, pipeline) = pipeline_in(&temp_dir);

        let report = pipeline.ingest(&source).await?;
        assert_eq!(report, IngestReport::default());
        assert!(!store.config().documents_path().exists());
        Ok(())
    }
}
