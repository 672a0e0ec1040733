//! Storage abstraction for hb chapter sources.
//!
//! This crate provides a [`Storage`] trait for reading chapter files from the
//! underlying backend, so the loader can be tested without touching the real
//! filesystem.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `read()` and `exists()` methods
//! - [`FsStorage`] implementation rooted at a source directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use hb_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("book"));
//! let bytes = storage.read("chapters/loops.md")?;
//! # Ok::<(), hb_storage::StorageError>(())
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
