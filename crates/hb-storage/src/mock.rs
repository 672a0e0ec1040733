//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;

use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores file contents in memory. Use the builder methods to configure the
/// mock with test data.
///
/// # Example
///
/// ```
/// use hb_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("loops.md", "# Loops\n\nContent.");
///
/// assert!(storage.exists("loops.md"));
/// assert_eq!(storage.read("loops.md").unwrap(), b"# Loops\n\nContent.");
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: HashMap<String, Vec<u8>>,
    denied: Vec<String>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a UTF-8 text file.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.with_bytes(path, content.into().into_bytes())
    }

    /// Add a file with arbitrary bytes.
    #[must_use]
    pub fn with_bytes(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Make reads of `path` fail with a permission error.
    #[must_use]
    pub fn with_denied(mut self, path: impl Into<String>) -> Self {
        self.denied.push(path.into());
        self
    }
}

impl Storage for MockStorage {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        if self.denied.iter().any(|p| p == path) {
            return Err(StorageError::new(StorageErrorKind::PermissionDenied)
                .with_path(path)
                .with_backend(BACKEND));
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}
