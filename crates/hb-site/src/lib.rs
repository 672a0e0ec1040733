//! Handbook site generation.
//!
//! Turns a book manifest and its Markdown chapters into a static HTML site.
//!
//! # Architecture
//!
//! The build is a strict pipeline:
//! - [`Manifest`] lists chapters in reading order
//! - [`Loader`] reads chapter sources through a [`hb_storage::Storage`] backend
//! - chapters are parsed and rendered with `hb-renderer`
//! - [`Assembler`] stitches pages together with prev/next links and a
//!   table of contents page
//!
//! Per-chapter work runs in parallel on the rayon pool. Assembly waits for
//! every chapter and any error aborts the whole build.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use hb_site::{Manifest, SiteBuilder};
//!
//! let manifest = Manifest::load(Path::new("book/book.yaml"))?;
//! let site = SiteBuilder::new(manifest).build(Path::new("site"))?;
//! println!("{} pages", site.len());
//! # Ok::<(), hb_site::BuildError>(())
//! ```

mod assembler;
mod assets;
mod builder;
mod error;
mod loader;
mod manifest;
mod template;

pub use assembler::{
    AssembleOptions, Assembler, INDEX_FILE, NavLink, NavLinks, Page, RenderedChapter, Site,
    assemble,
};
pub use assets::{STYLESHEET, STYLESHEET_PATH};
pub use builder::{BuildOptions, SiteBuilder};
pub use error::BuildError;
pub use loader::{Chapter, Loader};
pub use manifest::{ChapterRef, Manifest, ManifestError};
