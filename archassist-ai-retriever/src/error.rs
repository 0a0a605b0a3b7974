//! Error types for storage, retrieval and ingestion

use archassist_ai_embed::EmbedError;
use std::fmt;
use std::path::PathBuf;

/// Result type for vector store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The two persisted artifacts that make up a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Binary vector index
    Index,
    /// Serialized document list
    Documents,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Index => write!(f, "vector index"),
            Artifact::Documents => write!(f, "document list"),
        }
    }
}

/// Errors raised by the vector store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A persisted artifact does not exist yet
    #[error("{artifact} not found at {}. Run ingestion first.", path.display())]
    NotFound { artifact: Artifact, path: PathBuf },

    /// A row in an `add` batch has the wrong number of components
    #[error("Embedding dimension mismatch in row {row}: expected {expected}, got {actual}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A search query vector has the wrong number of components
    #[error("Query dimension mismatch: expected {expected}, got {actual}")]
    QueryDimension { expected: usize, actual: usize },

    /// `add` was called with different numbers of texts and vectors
    #[error("Batch has {texts} texts but {vectors} vectors")]
    BatchLengthMismatch { texts: usize, vectors: usize },

    /// Both artifacts exist but do not describe the same corpus
    #[error("Persisted store is inconsistent: {vectors} vectors but {documents} documents")]
    Inconsistent { vectors: usize, documents: usize },

    /// An artifact exists but could not be decoded
    #[error("Corrupt {artifact} at {}: {message}", path.display())]
    Corrupt {
        artifact: Artifact,
        path: PathBuf,
        message: String,
    },

    /// IO errors while reading or writing artifacts
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Blocking persistence task failed
    #[error("Background task failed: {source}")]
    AsyncTask {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl StoreError {
    /// Whether this error means ingestion has not produced the artifacts yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn corrupt(artifact: Artifact, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            artifact,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while answering a query.
#[derive(Debug, thiserror::Error)]
pub enum RetrieveError {
    /// The query could not be embedded
    #[error(transparent)]
    Embedding(#[from] EmbedError),

    /// The store could not be loaded or searched
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RetrieveError {
    /// Whether the failure is the "ingestion has not run" precondition.
    pub fn is_not_ingested(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}

/// Errors raised by the ingestion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The source directory could not be listed
    #[error("Cannot read source directory {}: {source}", path.display())]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document could not be embedded; nothing from the run was stored
    #[error("Failed to embed {}: {source}", path.display())]
    Embedding {
        path: PathBuf,
        #[source]
        source: EmbedError,
    },

    /// The batch was rejected or could not be persisted
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while loading retriever configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema
    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The embedding section or its environment overlay is invalid
    #[error(transparent)]
    Embedding(#[from] EmbedError),
}
