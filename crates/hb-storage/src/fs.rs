//! Filesystem storage implementation.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage rooted at a source directory.
///
/// Typically the directory containing the manifest, so manifest paths
/// resolve against it.
///
/// # Example
///
/// ```no_run
/// use std::path::PathBuf;
/// use hb_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("book"));
/// assert!(storage.exists("loops.md"));
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    /// Root directory for chapter sources.
    source_dir: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    /// Root directory this storage reads from.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Validate that a path stays inside the source directory.
    ///
    /// Rejects absolute paths and paths containing parent directory
    /// components (`..`).
    fn validate_path(raw: &str) -> Result<&Path, StorageError> {
        let path = Path::new(raw);
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

        if escapes || path.as_os_str().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(raw)
                .with_backend(BACKEND));
        }
        Ok(path)
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let relative = Self::validate_path(path)?;
        let full_path = self.source_dir.join(relative);
        tracing::debug!(path = %full_path.display(), "Reading source file");
        fs::read(&full_path).map_err(|e| StorageError::from_io(e, path).with_backend(BACKEND))
    }

    fn exists(&self, path: &str) -> bool {
        Self::validate_path(path).is_ok_and(|p| self.source_dir.join(p).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_storage_is_send_sync() {
        assert_send_sync::<FsStorage>();
    }

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_read_existing_file() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("loops.md"), "# Loops\n\nfor x in y").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read("loops.md").unwrap();

        assert_eq!(content, b"# Loops\n\nfor x in y");
    }

    #[test]
    fn test_read_nested_file() {
        let temp_dir = create_test_dir();
        let chapters = temp_dir.path().join("chapters");
        fs::create_dir(&chapters).unwrap();
        fs::write(chapters.join("functions.md"), "# Functions").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read("chapters/functions.md").unwrap();

        assert_eq!(content, b"# Functions");
    }

    #[test]
    fn test_read_returns_raw_bytes() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("latin1.md"), [0x63, 0x61, 0x66, 0xe9]).unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read("latin1.md").unwrap();

        assert_eq!(content, vec![0x63, 0x61, 0x66, 0xe9]);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let err = storage.read("nonexistent.md").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
        assert_eq!(err.path.as_deref(), Some("nonexistent.md"));
    }

    #[test]
    fn test_read_rejects_path_traversal() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let err = storage.read("../etc/passwd").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
        assert_eq!(err.to_string(), "[Fs] ../etc/passwd: invalid path");
    }

    #[test]
    fn test_read_rejects_absolute_path() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let err = storage.read("/etc/passwd").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
    }

    #[test]
    fn test_exists_returns_true_for_existing_file() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("loops.md"), "# Loops").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        assert!(storage.exists("loops.md"));
    }

    #[test]
    fn test_exists_returns_false_for_missing_file() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        assert!(!storage.exists("nonexistent.md"));
    }

    #[test]
    fn test_exists_returns_false_for_directory() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("chapters")).unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        assert!(!storage.exists("chapters"));
    }

    #[test]
    fn test_exists_rejects_path_traversal() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().join("sub"));

        assert!(!storage.exists("../loops.md"));
    }
}
