//! Build error type.

use std::path::PathBuf;

use hb_renderer::ParseError;
use hb_storage::StorageError;

use crate::manifest::ManifestError;

/// Error that aborts a site build.
///
/// Every variant is fatal; nothing is retried and no output is written.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Chapter source file does not exist.
    #[error("chapter '{chapter}': file not found: {path}")]
    NotFound { chapter: String, path: String },

    /// Chapter source file is not valid UTF-8.
    #[error("chapter '{chapter}': {path} is not valid UTF-8 (invalid byte at offset {offset})")]
    Encoding {
        chapter: String,
        path: String,
        offset: usize,
    },

    /// Chapter Markdown is malformed.
    #[error("chapter '{chapter}': {source}")]
    Parse {
        chapter: String,
        #[source]
        source: ParseError,
    },

    /// Navigation or chapter link points at a chapter that was not rendered.
    #[error("chapter '{chapter}': broken link to {target}")]
    BrokenLink { chapter: String, target: String },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Storage failure other than a missing file.
    #[error("chapter '{chapter}': {source}")]
    Storage {
        chapter: String,
        #[source]
        source: StorageError,
    },

    /// Failure writing build output.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output directory would replace the book's own sources.
    #[error("output directory {} overlaps the book sources in {}", output.display(), book.display())]
    OutputOverlapsBook { output: PathBuf, book: PathBuf },

    #[error("failed to start build workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Title of the chapter the error belongs to, if any.
    #[must_use]
    pub fn chapter(&self) -> Option<&str> {
        match self {
            Self::NotFound { chapter, .. }
            | Self::Encoding { chapter, .. }
            | Self::Parse { chapter, .. }
            | Self::BrokenLink { chapter, .. }
            | Self::Storage { chapter, .. } => Some(chapter),
            Self::Manifest(_)
            | Self::Io { .. }
            | Self::OutputOverlapsBook { .. }
            | Self::ThreadPool(_) => None,
        }
    }
}
