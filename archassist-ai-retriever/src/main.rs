use archassist_ai_embed::provider_from_config;
use archassist_ai_retriever::{
    config::RetrieverConfig,
    retrieval::{IngestionPipeline, Retriever},
    storage::{FlatFileStore, VectorStore},
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// A CLI tool to ingest documents into and query the archassist vector store.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding vectors.index and documents.json (overrides config and ARCHASSIST_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Embed every .txt and .pdf file in a directory and add it to the store
    Ingest {
        /// Source directory (not searched recursively)
        source: PathBuf,
        /// Append documents even if their content is already stored
        #[arg(long)]
        allow_duplicates: bool,
    },
    /// Search for the documents nearest to a query
    Search {
        query: String,
        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },
    /// Print the context string handed to the generation layer
    Context { query: String },
    /// Show store statistics
    Stats {
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },
    /// Print the embedding of a text as JSON
    Embed { text: String },
}

#[derive(Debug, Clone, PartialEq)]
enum OutputFormat {
    Summary,
    Full,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(OutputFormat::Summary),
            "full" => Ok(OutputFormat::Full),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {s}")),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingOutput {
    provider: String,
    dimension: usize,
    embedding: Vec<f32>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = RetrieverConfig::load(args.config.as_deref())?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    let store = Arc::new(FlatFileStore::new(config.store_config()));
    let embedder = provider_from_config(&config.embedding)?;

    match args.command {
        Commands::Ingest {
            source,
            allow_duplicates,
        } => {
            let mut ingest_config = config.ingest_config();
            if allow_duplicates {
                ingest_config.skip_duplicates = false;
            }
            let report = IngestionPipeline::new(store.clone(), embedder)
                .with_config(ingest_config)
                .ingest(&source)
                .await?;

            println!("Ingested {} documents", report.ingested);
            println!("  Skipped (empty): {}", report.skipped_empty);
            println!("  Skipped (duplicate): {}", report.skipped_duplicate);
            if !report.failed.is_empty() {
                println!("  Failed: {}", report.failed.len());
                for path in &report.failed {
                    println!("    {}", path.display());
                }
            }
            println!("  Corpus size: {}", report.corpus_size);
            Ok(())
        }
        Commands::Search {
            query,
            top_k,
            format,
        } => {
            let retriever = Retriever::new(store, embedder);
            let hits = retriever
                .search(&query, top_k.unwrap_or(config.top_k))
                .await?;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&hits)?);
                }
                OutputFormat::Summary => {
                    println!("Found {} documents:", hits.len());
                    for hit in hits {
                        println!(
                            "  Distance: {:.4} | Position: {} | {}",
                            hit.distance,
                            hit.position,
                            hit.document.chars().take(80).collect::<String>().replace('\n', " ")
                        );
                    }
                }
                OutputFormat::Full => {
                    for hit in hits {
                        println!("Distance: {:.4}", hit.distance);
                        println!("Position: {}", hit.position);
                        println!("Content:\n{}", hit.document);
                        println!("---");
                    }
                }
            }
            Ok(())
        }
        Commands::Context { query } => {
            let retriever = Retriever::new(store, embedder).with_top_k(config.top_k);
            println!("{}", retriever.retrieve_context(&query).await);
            Ok(())
        }
        Commands::Stats { format } => {
            if let Err(e) = store.refresh().await {
                tracing::warn!("Persisted store could not be loaded: {}", e);
            }
            let stats = store.stats().await;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
                OutputFormat::Summary | OutputFormat::Full => {
                    println!("Store Statistics:");
                    println!("  State: {}", stats.state());
                    println!("  Documents: {}", stats.documents);
                    println!("  Vectors: {}", stats.vectors);
                    println!("  Dimension: {}", stats.dimension);
                    println!("  Data directory: {}", stats.data_dir.display());
                    if format == OutputFormat::Full {
                        println!(
                            "  Index file: {}",
                            if stats.index_persisted { "present" } else { "missing" }
                        );
                        println!(
                            "  Documents file: {}",
                            if stats.documents_persisted { "present" } else { "missing" }
                        );
                    }
                }
            }
            Ok(())
        }
        Commands::Embed { text } => {
            let embedding = embedder.embed_text(&text).await?;
            let output = EmbeddingOutput {
                provider: embedder.provider_name().to_string(),
                dimension: embedding.len(),
                embedding,
            };
            println!("{}", serde_json::to_string(&output)?);
            Ok(())
        }
    }
}
