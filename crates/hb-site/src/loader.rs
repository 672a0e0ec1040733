//! Chapter loading from storage.
//!
//! [`Loader`] reads every chapter the manifest references through a
//! [`Storage`] backend rooted at the manifest directory. Reads run on the
//! rayon pool; results are collected in manifest order so the reported error
//! is always the one for the earliest failing chapter.

use std::sync::Arc;

use hb_storage::{Storage, StorageErrorKind};
use rayon::prelude::*;

use crate::error::BuildError;
use crate::manifest::{ChapterRef, Manifest};

const BOM: char = '\u{feff}';

/// Chapter source text, ready to parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub id: String,
    /// Source path relative to the book root.
    pub path: String,
    /// UTF-8 text with BOM removed and line endings normalized to `\n`.
    pub text: String,
}

/// Reads chapter sources.
pub struct Loader {
    storage: Arc<dyn Storage>,
}

impl Loader {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Load all chapters in manifest order.
    ///
    /// Fails fast: any missing or undecodable chapter aborts the load and no
    /// partial results are returned.
    pub fn load(&self, manifest: &Manifest) -> Result<Vec<Chapter>, BuildError> {
        self.load_with(manifest, Ok)
    }

    /// Load every chapter and pass it straight to `process`.
    ///
    /// Loading and processing of one chapter run on the same worker, so
    /// chapter text never has to be held for the whole book. The error
    /// reported is the one for the earliest failing chapter in manifest order.
    pub fn load_with<T, F>(&self, manifest: &Manifest, process: F) -> Result<Vec<T>, BuildError>
    where
        T: Send,
        F: Fn(Chapter) -> Result<T, BuildError> + Sync,
    {
        let results: Vec<Result<T, BuildError>> = manifest
            .chapters()
            .par_iter()
            .map(|chapter| self.load_chapter(chapter).and_then(&process))
            .collect();

        let processed = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        tracing::info!(chapters = processed.len(), "Loaded chapters");
        Ok(processed)
    }

    /// Chapters whose source file is missing, in manifest order.
    ///
    /// Unlike [`Loader::load`] this does not stop at the first problem.
    #[must_use]
    pub fn missing<'m>(&self, manifest: &'m Manifest) -> Vec<&'m ChapterRef> {
        manifest
            .chapters()
            .iter()
            .filter(|chapter| !self.storage.exists(&chapter.path))
            .collect()
    }

    /// Load a single chapter.
    pub fn load_chapter(&self, chapter: &ChapterRef) -> Result<Chapter, BuildError> {
        let bytes = self.storage.read(&chapter.path).map_err(|e| match e.kind {
            StorageErrorKind::NotFound => BuildError::NotFound {
                chapter: chapter.title.clone(),
                path: chapter.path.clone(),
            },
            _ => BuildError::Storage {
                chapter: chapter.title.clone(),
                source: e,
            },
        })?;

        let text = decode(bytes).map_err(|offset| BuildError::Encoding {
            chapter: chapter.title.clone(),
            path: chapter.path.clone(),
            offset,
        })?;

        tracing::debug!(chapter = %chapter.title, path = %chapter.path, bytes = text.len(), "Loaded chapter");

        Ok(Chapter {
            title: chapter.title.clone(),
            id: chapter.id.clone(),
            path: chapter.path.clone(),
            text,
        })
    }
}

/// Decode chapter bytes, returning the offset of the first invalid byte on failure.
fn decode(bytes: Vec<u8>) -> Result<String, usize> {
    let text = String::from_utf8(bytes).map_err(|e| e.utf8_error().valid_up_to())?;
    let text = text.strip_prefix(BOM).unwrap_or(&text);
    Ok(if text.contains('\r') {
        text.replace("\r\n", "\n")
    } else {
        text.to_owned()
    })
}
