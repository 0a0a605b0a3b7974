//! End-to-end example of the ingest-then-query workflow
//!
//! This example shows how to:
//! 1. Write a few building-code notes to a source directory
//! 2. Ingest them into a fresh store with mock embeddings
//! 3. Query the store from a second, read-only store instance
//! 4. Assemble the context string handed to text generation

use anyhow::Result;
use archassist_ai_embed::MockEmbedProvider;
use archassist_ai_retriever::{
    retrieval::{IngestionPipeline, Retriever},
    storage::{FlatFileStore, StoreConfig},
};
use std::sync::Arc;
use tempfile::tempdir;

const DIMENSION: usize = 1536;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for better visibility
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("codes");
    let data_dir = temp_dir.path().join("data");
    std::fs::create_dir_all(&source)?;

    std::fs::write(
        source.join("egress.txt"),
        "Every habitable floor needs two independent means of egress.",
    )?;
    std::fs::write(
        source.join("stairs.txt"),
        "Stair risers may not exceed 180 mm; treads must be at least 280 mm.",
    )?;
    std::fs::write(
        source.join("daylight.txt"),
        "Habitable rooms need glazing of at least 10% of the floor area.",
    )?;

    let embedder = Arc::new(MockEmbedProvider::new(DIMENSION));
    let store = Arc::new(FlatFileStore::new(StoreConfig::new(&data_dir, DIMENSION)));

    let report = IngestionPipeline::new(store, embedder.clone())
        .ingest(&source)
        .await?;
    println!("Ingested {} documents into {}", report.ingested, data_dir.display());

    // A separate store instance sees the persisted corpus on its first search
    let reader = Arc::new(FlatFileStore::new(StoreConfig::new(&data_dir, DIMENSION)));
    let retriever = Retriever::new(reader, embedder).with_top_k(2);

    let query = "Stair risers may not exceed 180 mm; treads must be at least 280 mm.";
    for hit in retriever.search(query, 3).await? {
        println!("{:>10.4}  {}", hit.distance, hit.document);
    }

    println!("\nContext:\n{}", retriever.retrieve_context(query).await);
    Ok(())
}
