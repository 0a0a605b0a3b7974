//! Loading, ingesting and retrieving documents.
//!
//! - [`loader`]: reads `.txt` and `.pdf` files from a directory
//! - [`ingestion`]: embeds loaded documents and bulk-adds them to a store
//! - [`retriever`]: embeds a query and assembles matching documents into context

pub mod ingestion;
pub mod loader;
pub mod retriever;

pub use ingestion::{IngestConfig, IngestReport, IngestionPipeline};
pub use loader::{DocumentKind, DocumentLoader, LoadedDocument};
pub use retriever::{CONTEXT_SEPARATOR, DEFAULT_TOP_K, Retriever};
