//! Reading source documents from a directory.
//!
//! Only the top level of the directory is scanned. Files ending in `.txt`
//! are read as UTF-8; files ending in `.pdf` have the text of every page
//! extracted and concatenated. Everything else is ignored.

use crate::error::IngestError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
}

impl DocumentKind {
    /// Detect the kind from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("txt") {
            Some(Self::Text)
        } else if ext.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else {
            None
        }
    }
}

/// A source file and the text extracted from it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub content: String,
}

impl LoadedDocument {
    /// Whether the document has no content besides whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A file that matched a supported extension but could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything found in one directory scan.
#[derive(Debug, Default)]
pub struct LoadedDirectory {
    pub documents: Vec<LoadedDocument>,
    pub failures: Vec<LoadFailure>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load every supported file directly inside `dir`, sorted by file name.
    ///
    /// A missing or unreadable directory is an error. A single file that
    /// cannot be read or extracted is recorded in
    /// [`LoadedDirectory::failures`] and the scan continues.
    pub async fn load_dir(&self, dir: &Path) -> Result<LoadedDirectory, IngestError> {
        let source_err = |source| IngestError::SourceDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(source_err)?;
        let mut candidates = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(source_err)? {
            let path = entry.path();
            let Some(kind) = DocumentKind::from_path(&path) else {
                continue;
            };
            // Follows symlinks; subdirectories are skipped (non-recursive)
            match tokio::fs::metadata(&path).await {
                Ok(metadata) if metadata.is_file() => candidates.push((path, kind)),
                Ok(_) => debug!("Skipping non-file {}", path.display()),
                Err(e) => warn!("Cannot stat {}: {}", path.display(), e),
            }
        }
        candidates.sort_by(|(a, _), (b, _)| a.file_name().cmp(&b.file_name()));

        let mut loaded = LoadedDirectory::default();
        for (path, kind) in candidates {
            match self.load_file(&path, kind).await {
                Ok(content) => loaded.documents.push(LoadedDocument {
                    path,
                    kind,
                    content,
                }),
                Err(reason) => {
                    warn!("Failed to load {}: {}", path.display(), reason);
                    loaded.failures.push(LoadFailure { path, reason });
                }
            }
        }

        debug!(
            "Loaded {} documents from {} ({} failed)",
            loaded.documents.len(),
            dir.display(),
            loaded.failures.len()
        );
        Ok(loaded)
    }

    /// Read one file. The error string describes why it could not be read.
    pub async fn load_file(&self, path: &Path, kind: DocumentKind) -> Result<String, String> {
        match kind {
            DocumentKind::Text => {
                let bytes = tokio::fs::read(path).await.map_err(|e| e.to_string())?;
                String::from_utf8(bytes).map_err(|e| format!("not valid UTF-8: {e}"))
            }
            DocumentKind::Pdf => {
                let path = path.to_path_buf();
                // pdf-extract is synchronous and panics on some malformed input
                tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
                    .await
                    .map_err(|e| format!("PDF extraction aborted: {e}"))?
                    .map_err(|e| format!("PDF extraction failed: {e}"))
            }
        }
    }
}
