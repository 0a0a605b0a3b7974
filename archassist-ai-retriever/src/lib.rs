//! archassist-ai-retriever: persistent vector store and retrieval for the
//! architecture assistant
//!
//! Documents are embedded once by an ingestion run and appended to a flat,
//! exact L2 index persisted next to the document list. At query time the
//! retriever embeds the question, searches the index and hands the nearest
//! documents to the generation layer as a context string.
//!
//! ## Key Modules
//!
//! - **[`storage`]**: the [`VectorStore`](storage::VectorStore) trait, flat index and file-backed store
//! - **[`retrieval`]**: document loading, ingestion pipeline, retriever
//! - **[`config`]**: TOML + environment configuration
//! - **[`error`]**: error types per operation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use archassist_ai_embed::provider_from_config;
//! use archassist_ai_retriever::{
//!     config::RetrieverConfig,
//!     retrieval::{IngestionPipeline, Retriever},
//!     storage::FlatFileStore,
//! };
//! use std::{path::Path, sync::Arc};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RetrieverConfig::load(None)?;
//! let store = Arc::new(FlatFileStore::new(config.store_config()));
//! let embedder = provider_from_config(&config.embedding)?;
//!
//! IngestionPipeline::new(store.clone(), embedder.clone())
//!     .ingest(Path::new("docs"))
//!     .await?;
//!
//! let retriever = Retriever::new(store, embedder);
//! let context = retriever.retrieve_context("minimum stair width").await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Directory → DocumentLoader → Embedder → FlatFileStore.add → vectors.index + documents.json
//!                                                                     ↓
//!                  Query → Embedder → Retriever → FlatFileStore.search → context
//! ```

pub mod config;
pub mod error;
pub mod retrieval;
pub mod storage;
