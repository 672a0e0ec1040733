//! Storage trait and error types.
//!
//! All path parameters are `/`-separated paths relative to the storage root,
//! exactly as they appear in the manifest (e.g. `"loops.md"`,
//! `"chapters/functions.md"`).

use std::fmt;

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Chapter source does not exist.
    NotFound,
    /// Chapter source exists but cannot be read.
    PermissionDenied,
    /// Path is empty or escapes the storage root.
    InvalidPath,
    /// Any other backend failure.
    Other,
}

impl StorageErrorKind {
    fn describe(self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::InvalidPath => "invalid path",
            Self::Other => "read failed",
        }
    }
}

/// Error reading a chapter source.
///
/// Carries a semantic [`StorageErrorKind`] so callers can react to missing
/// files without knowing which backend produced the error.
#[derive(Debug)]
pub struct StorageError {
    pub kind: StorageErrorKind,
    /// Storage-relative path the operation was for.
    pub path: Option<String>,
    /// Backend identifier (e.g. `"Fs"`, `"Mock"`).
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Missing chapter source.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(err: std::io::Error, path: impl Into<String>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            _ => StorageErrorKind::Other,
        };
        Self::new(kind).with_path(path).with_source(err)
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "[Fs] chapters/loops.md: permission denied: <source>"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }
        if let Some(path) = &self.path {
            write!(f, "{path}: ")?;
        }
        f.write_str(self.kind.describe())?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Source of chapter bytes.
///
/// Backends return raw bytes; decoding is the caller's job so that encoding
/// failures can be reported against the chapter that caused them.
pub trait Storage: Send + Sync {
    /// Read the full contents of a chapter source.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file doesn't exist, the path is
    /// invalid, or the file can't be read.
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Whether a chapter source exists at `path`. Errors count as missing.
    fn exists(&self, path: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_storage_error_is_send_sync() {
        assert_send_sync::<StorageError>();
    }

    #[test]
    fn test_not_found_has_path() {
        let err = StorageError::not_found("chapters/loops.md");

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.path.as_deref(), Some("chapters/loops.md"));
        assert!(err.backend.is_none());
    }

    #[test]
    fn test_from_io_classifies_kind() {
        let cases = [
            (io::ErrorKind::NotFound, StorageErrorKind::NotFound),
            (io::ErrorKind::PermissionDenied, StorageErrorKind::PermissionDenied),
            (io::ErrorKind::InvalidData, StorageErrorKind::Other),
        ];
        for (io_kind, expected) in cases {
            let err = StorageError::from_io(io::Error::new(io_kind, "boom"), "loops.md");
            assert_eq!(err.kind, expected);
            assert!(err.source().is_some());
        }
    }

    #[test]
    fn test_display_minimal() {
        assert_eq!(
            StorageError::new(StorageErrorKind::InvalidPath).to_string(),
            "invalid path"
        );
    }

    #[test]
    fn test_display_full() {
        let err = StorageError::from_io(
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
            "chapters/loops.md",
        )
        .with_backend("Fs");

        assert_eq!(
            err.to_string(),
            "[Fs] chapters/loops.md: permission denied: access denied"
        );
    }
}
