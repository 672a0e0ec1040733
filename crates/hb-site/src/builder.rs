//! End-to-end site build.
//!
//! [`SiteBuilder`] runs load, parse, render and assembly in memory, then
//! writes the finished site. Output goes to a sibling staging directory
//! first and is moved into place only once every file is written, so a
//! failed build never leaves a half-written output directory behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use hb_renderer::{HtmlRenderer, LinkMap, parse};
use hb_storage::{FsStorage, Storage};

use crate::assembler::{AssembleOptions, Assembler, RenderedChapter, Site};
use crate::error::BuildError;
use crate::loader::{Chapter, Loader};
use crate::manifest::{ChapterRef, Manifest};

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Build settings.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Fail on `.md` links that match no chapter.
    pub strict_links: bool,
    /// Group adjacent code blocks in different languages into comparison panels.
    pub compare_code: bool,
    /// Overrides the manifest's book title.
    pub site_title: Option<String>,
    /// Worker threads for chapter processing (0 = rayon default pool).
    pub jobs: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strict_links: true,
            compare_code: true,
            site_title: None,
            jobs: 0,
        }
    }
}

/// Runs the build pipeline for one manifest.
pub struct SiteBuilder {
    manifest: Manifest,
    storage: Arc<dyn Storage>,
    options: BuildOptions,
}

impl SiteBuilder {
    /// Create a builder reading chapters from the manifest's directory.
    #[must_use]
    pub fn new(manifest: Manifest) -> Self {
        let storage = Arc::new(FsStorage::new(manifest.root().to_path_buf()));
        Self {
            manifest,
            storage,
            options: BuildOptions::default(),
        }
    }

    /// Read chapters from a different storage backend.
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Manifest chapters whose source file does not exist.
    #[must_use]
    pub fn missing_chapters(&self) -> Vec<&ChapterRef> {
        Loader::new(Arc::clone(&self.storage)).missing(&self.manifest)
    }

    /// Run the full pipeline without writing anything.
    pub fn check(&self) -> Result<Site, BuildError> {
        let start = Instant::now();
        let site = self.render_site()?;
        tracing::info!(pages = site.len(), elapsed_ms = elapsed_ms(start), "Check passed");
        Ok(site)
    }

    /// Build the site and write it to `output_dir`, replacing previous output.
    ///
    /// Refuses an `output_dir` that is the book root, contains it, or holds
    /// any chapter source, since the previous output is deleted on success.
    pub fn build(&self, output_dir: &Path) -> Result<Site, BuildError> {
        let start = Instant::now();
        self.check_output_dir(output_dir)?;
        let site = self.render_site()?;
        write_site(&site, output_dir)?;
        tracing::info!(
            pages = site.len(),
            output = %output_dir.display(),
            elapsed_ms = elapsed_ms(start),
            "Built site"
        );
        Ok(site)
    }

    fn check_output_dir(&self, output_dir: &Path) -> Result<(), BuildError> {
        let root = self.manifest.root();
        let root = if root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            root
        };
        let book = resolve_path(root)?;
        let output = resolve_path(output_dir)?;

        let overlaps = book.starts_with(&output)
            || output.strip_prefix(&book).is_ok_and(|inner| {
                self.manifest
                    .chapters()
                    .iter()
                    .any(|chapter| Path::new(&chapter.path).starts_with(inner))
            });
        if overlaps {
            return Err(BuildError::OutputOverlapsBook { output, book });
        }
        Ok(())
    }

    fn render_site(&self) -> Result<Site, BuildError> {
        if self.options.jobs == 0 {
            return self.run_pipeline();
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs)
            .build()?;
        pool.install(|| self.run_pipeline())
    }

    fn run_pipeline(&self) -> Result<Site, BuildError> {
        let loader = Loader::new(Arc::clone(&self.storage));
        let links = self.link_map();

        let rendered =
            loader.load_with(&self.manifest, |chapter| self.render_chapter(&chapter, &links))?;

        Assembler::new(AssembleOptions {
            strict_links: self.options.strict_links,
            site_title: self.options.site_title.clone(),
        })
        .assemble(&self.manifest, rendered)
    }

    fn render_chapter(
        &self,
        chapter: &Chapter,
        links: &LinkMap,
    ) -> Result<RenderedChapter, BuildError> {
        let doc = parse(&chapter.text).map_err(|source| BuildError::Parse {
            chapter: chapter.title.clone(),
            source,
        })?;
        let document = HtmlRenderer::new()
            .with_code_comparison(self.options.compare_code)
            .with_links(links, &chapter.path)
            .render(&doc);

        tracing::debug!(
            chapter = %chapter.title,
            code_blocks = doc.code_blocks().count(),
            "Rendered chapter"
        );

        Ok(RenderedChapter {
            id: chapter.id.clone(),
            document,
        })
    }

    fn link_map(&self) -> LinkMap {
        let mut map = LinkMap::new();
        for chapter in self.manifest.chapters() {
            map.insert(&chapter.path, chapter.file_name());
        }
        map
    }
}

/// Write all site files into `output_dir` via a staging directory.
fn write_site(site: &Site, output_dir: &Path) -> Result<(), BuildError> {
    let (staging, backup) = sibling_dirs(output_dir)?;

    remove_dir_if_exists(&staging)?;
    if let Err(err) = write_files(site, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(err);
    }

    if output_dir.exists() {
        remove_dir_if_exists(&backup)?;
        fs::rename(output_dir, &backup).map_err(|e| BuildError::io(output_dir, e))?;
    }
    if let Err(e) = fs::rename(&staging, output_dir) {
        if backup.exists() {
            let _ = fs::rename(&backup, output_dir);
        }
        let _ = fs::remove_dir_all(&staging);
        return Err(BuildError::io(output_dir, e));
    }
    remove_dir_if_exists(&backup)?;

    tracing::debug!(output = %output_dir.display(), "Replaced output directory");
    Ok(())
}

fn write_files(site: &Site, dir: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
    for (relative, contents) in site.files() {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        fs::write(&path, contents).map_err(|e| BuildError::io(&path, e))?;
    }
    Ok(())
}

/// Staging and backup directories next to `output_dir`.
fn sibling_dirs(output_dir: &Path) -> Result<(PathBuf, PathBuf), BuildError> {
    let name = output_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            BuildError::io(
                output_dir,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "output path must name a directory",
                ),
            )
        })?;
    let parent = output_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;

    Ok((
        parent.join(format!(".{name}.staging")),
        parent.join(format!(".{name}.old")),
    ))
}

/// Canonicalize `path`, resolving through its nearest existing ancestor
/// when it does not exist yet.
fn resolve_path(path: &Path) -> Result<PathBuf, BuildError> {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(resolved) => return Ok(missing.iter().rev().fold(resolved, |p, c| p.join(c))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(BuildError::io(path, e));
                };
                missing.push(name);
                existing = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            Err(e) => return Err(BuildError::io(path, e)),
        }
    }
}

fn remove_dir_if_exists(path: &Path) -> Result<(), BuildError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::io(path, e)),
    }
}
