//! Book manifest.
//!
//! The manifest is a YAML file listing chapters in reading order:
//!
//! ```yaml
//! title: Python Mastery Handbook
//! chapters:
//!   - title: Loops
//!     path: loops.md
//!   - title: Functions
//!     path: chapters/functions.md
//!     id: functions
//! ```
//!
//! Chapter paths are relative to the manifest's directory. A chapter's id
//! names its output page (`<id>.html`) and defaults to the slug of its title.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use hb_renderer::slugify;
use serde::Deserialize;

/// Id reserved for the table of contents page.
const RESERVED_ID: &str = "index";

/// Error loading or validating a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest: {0}")]
    Parse(String),
    #[error("manifest lists no chapters")]
    Empty,
    #[error("chapter {index} has an empty title")]
    EmptyTitle { index: usize },
    #[error("duplicate chapter title: {0}")]
    DuplicateTitle(String),
    #[error("chapter '{chapter}' has invalid path '{path}': must be relative and stay inside the book")]
    InvalidPath { chapter: String, path: String },
    #[error(
        "chapter '{chapter}' has invalid id '{id}': use lowercase letters, digits, '-' or '_'"
    )]
    InvalidId { chapter: String, id: String },
    #[error("duplicate chapter id: {0}")]
    DuplicateId(String),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    chapters: Vec<RawChapter>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawChapter {
    title: String,
    path: String,
    #[serde(default)]
    id: Option<String>,
}

/// Reference to one chapter in the manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterRef {
    /// Display title.
    pub title: String,
    /// Source path relative to the manifest directory, `/`-separated.
    pub path: String,
    /// Output page id.
    pub id: String,
}

impl ChapterRef {
    /// Output file name for this chapter.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.html", self.id)
    }
}

/// Ordered list of chapters plus optional book title.
#[derive(Clone, Debug)]
pub struct Manifest {
    title: Option<String>,
    root: PathBuf,
    chapters: Vec<ChapterRef>,
}

impl Manifest {
    /// Read and validate a manifest file.
    ///
    /// Chapter paths resolve against the manifest's parent directory.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_yaml(&content, root)
    }

    /// Parse and validate manifest YAML with chapter paths rooted at `root`.
    pub fn from_yaml(yaml: &str, root: impl Into<PathBuf>) -> Result<Self, ManifestError> {
        let raw: RawManifest =
            serde_yaml::from_str(yaml).map_err(|e| ManifestError::Parse(e.to_string()))?;
        Self::from_raw(raw, root.into())
    }

    fn from_raw(raw: RawManifest, root: PathBuf) -> Result<Self, ManifestError> {
        if raw.chapters.is_empty() {
            return Err(ManifestError::Empty);
        }

        let mut titles = HashSet::new();
        let mut ids = HashSet::new();
        let mut chapters = Vec::with_capacity(raw.chapters.len());

        for (index, chapter) in raw.chapters.into_iter().enumerate() {
            let title = chapter.title.trim().to_owned();
            if title.is_empty() {
                return Err(ManifestError::EmptyTitle { index: index + 1 });
            }
            if !titles.insert(title.clone()) {
                return Err(ManifestError::DuplicateTitle(title));
            }

            let path = normalize_chapter_path(&chapter.path).ok_or_else(|| {
                ManifestError::InvalidPath {
                    chapter: title.clone(),
                    path: chapter.path.clone(),
                }
            })?;

            let id = chapter.id.unwrap_or_else(|| slugify(&title));
            if !is_valid_id(&id) {
                return Err(ManifestError::InvalidId { chapter: title, id });
            }
            if !ids.insert(id.clone()) {
                return Err(ManifestError::DuplicateId(id));
            }

            chapters.push(ChapterRef { title, path, id });
        }

        Ok(Self {
            title: raw.title.filter(|t| !t.trim().is_empty()),
            root,
            chapters,
        })
    }

    /// Book title, if the manifest sets one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Directory chapter paths are relative to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Chapters in reading order.
    #[must_use]
    pub fn chapters(&self) -> &[ChapterRef] {
        &self.chapters
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Normalize a chapter path to `/`-separated relative form.
///
/// Returns `None` for empty, absolute, or parent-escaping paths.
fn normalize_chapter_path(path: &str) -> Option<String> {
    let path = path.trim().replace('\\', "/");
    let mut parts = Vec::new();
    for component in Path::new(&path).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Ids name output files, so they are lowercase to stay distinct on
/// case-insensitive filesystems.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != RESERVED_ID
        && id
            .chars()
            .all(|c| (c.is_alphanumeric() && !c.is_uppercase()) || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(yaml: &str) -> Result<Manifest, ManifestError> {
        Manifest::from_yaml(yaml, "book")
    }

    #[test]
    fn test_parse_manifest_in_order() {
        let manifest = parse(
            "title: Python Mastery Handbook\nchapters:\n  - title: Loops\n    path: loops.md\n  - title: Functions\n    path: chapters/functions.md\n    id: funcs\n",
        )
        .unwrap();

        assert_eq!(manifest.title(), Some("Python Mastery Handbook"));
        assert_eq!(manifest.root(), Path::new("book"));
        assert_eq!(
            manifest.chapters(),
            &[
                ChapterRef {
                    title: "Loops".to_owned(),
                    path: "loops.md".to_owned(),
                    id: "loops".to_owned(),
                },
                ChapterRef {
                    title: "Functions".to_owned(),
                    path: "chapters/functions.md".to_owned(),
                    id: "funcs".to_owned(),
                },
            ]
        );
        assert_eq!(manifest.chapters()[1].file_name(), "funcs.html");
    }

    #[test]
    fn test_id_defaults_to_title_slug() {
        let manifest =
            parse("chapters:\n  - title: List Comprehensions\n    path: lc.md\n").unwrap();
        assert_eq!(manifest.chapters()[0].id, "list-comprehensions");
        assert_eq!(manifest.title(), None);
    }

    #[test]
    fn test_path_normalized() {
        let manifest = parse("chapters:\n  - title: A\n    path: ./part1//a.md\n").unwrap();
        assert_eq!(manifest.chapters()[0].path, "part1/a.md");
    }

    #[test]
    fn test_empty_manifest_rejected() {
        assert!(matches!(parse("chapters: []\n"), Err(ManifestError::Empty)));
        assert!(matches!(parse("title: Book\n"), Err(ManifestError::Empty)));
    }

    #[test]
    fn test_empty_title_rejected() {
        let err = parse("chapters:\n  - title: A\n    path: a.md\n  - title: '  '\n    path: b.md\n")
            .unwrap_err();
        assert!(matches!(err, ManifestError::EmptyTitle { index: 2 }));
    }

    #[test]
    fn test_duplicate_title_rejected() {
        let err = parse("chapters:\n  - title: Loops\n    path: a.md\n  - title: Loops\n    path: b.md\n")
            .unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateTitle(t) if t == "Loops"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = parse(
            "chapters:\n  - title: Loops\n    path: a.md\n  - title: More\n    path: b.md\n    id: loops\n",
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateId(id) if id == "loops"));
    }

    #[test]
    fn test_uppercase_id_rejected() {
        let err = parse(
            "chapters:\n  - title: Loops\n    path: a.md\n  - title: More loops\n    path: b.md\n    id: Loops\n",
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidId { ref id, .. } if id == "Loops"));
        assert!(err.to_string().contains("lowercase"));
    }

    #[test]
    fn test_reserved_and_invalid_ids_rejected() {
        let err = parse("chapters:\n  - title: Index\n    path: a.md\n").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidId { .. }));

        let err = parse("chapters:\n  - title: A\n    path: a.md\n    id: a/b\n").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidId { .. }));
    }

    #[test]
    fn test_escaping_paths_rejected() {
        for path in ["../outside.md", "/etc/passwd", "a/../../b.md", "''"] {
            let yaml = format!("chapters:\n  - title: A\n    path: {path}\n");
            assert!(
                matches!(parse(&yaml), Err(ManifestError::InvalidPath { .. })),
                "{path}"
            );
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse("chapters:\n  - title: A\n    path: a.md\n    draft: true\n").unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.yaml");
        std::fs::write(&path, "chapters:\n  - title: Loops\n    path: loops.md\n").unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.root(), dir.path());
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Manifest::load(Path::new("/nonexistent/book.yaml")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/book.yaml"));
    }
}
