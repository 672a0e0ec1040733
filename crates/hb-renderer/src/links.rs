//! Chapter link rewriting.
//!
//! Chapters link to each other by source path (`[Functions](functions.md)`).
//! A [`LinkMap`] maps each chapter's source path to the page it is rendered
//! to, so the renderer can point those links at the generated HTML.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

/// Source path to output page mapping, built from the manifest.
#[derive(Clone, Debug, Default)]
pub struct LinkMap {
    pages: HashMap<String, String>,
}

/// Outcome of resolving a link destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    /// Not a chapter link; emit as written.
    External,
    /// Chapter link rewritten to its output page.
    Page(String),
    /// Chapter link to a source path with no known page.
    Unresolved(String),
}

impl LinkMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chapter source path (relative to the book root) and its page href.
    pub fn insert(&mut self, source_path: &str, href: impl Into<String>) {
        self.pages.insert(normalize_path(source_path), href.into());
    }

    /// Number of registered chapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Resolve a link destination written in the chapter at `from`.
    ///
    /// Only relative or root-relative links ending in `.md` (optionally with
    /// a `#fragment`) are chapter links. External URLs, fragment-only links
    /// and links to other file types are [`LinkTarget::External`].
    #[allow(clippy::case_sensitive_file_extension_comparisons)]
    #[must_use]
    pub fn resolve(&self, dest: &str, from: &str) -> LinkTarget {
        if is_external(dest) {
            return LinkTarget::External;
        }

        let (path_part, fragment) = match dest.find('#') {
            Some(pos) => (&dest[..pos], &dest[pos..]),
            None => (dest, ""),
        };
        if !path_part.ends_with(".md") {
            return LinkTarget::External;
        }

        let decoded = percent_decode_str(path_part).decode_utf8_lossy();
        let resolved = match decoded.strip_prefix('/') {
            Some(absolute) => normalize_path(absolute),
            None => join_relative(parent_dir(from), &decoded),
        };

        match self.pages.get(&resolved) {
            Some(href) => LinkTarget::Page(format!("{href}{fragment}")),
            None => LinkTarget::Unresolved(resolved),
        }
    }
}

fn is_external(url: &str) -> bool {
    url.is_empty()
        || url.starts_with('#')
        || url.starts_with("//")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
        || url.contains("://")
}

fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |pos| &path[..pos])
}

/// Resolve `relative` against directory `base`, handling `.` and `..`.
///
/// `..` never climbs above the book root.
fn join_relative(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(component),
        }
    }
    segments.join("/")
}

fn normalize_path(path: &str) -> String {
    join_relative("", &path.replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn book() -> LinkMap {
        let mut map = LinkMap::new();
        map.insert("loops.md", "loops.html");
        map.insert("chapters/functions.md", "functions.html");
        map.insert("chapters/async io.md", "async-io.html");
        map
    }

    #[test]
    fn test_resolves_sibling_link() {
        assert_eq!(
            book().resolve("functions.md", "chapters/classes.md"),
            LinkTarget::Page("functions.html".to_owned())
        );
    }

    #[test]
    fn test_resolves_parent_and_dot_segments() {
        let map = book();
        assert_eq!(
            map.resolve("../loops.md", "chapters/functions.md"),
            LinkTarget::Page("loops.html".to_owned())
        );
        assert_eq!(
            map.resolve("./chapters/functions.md", "loops.md"),
            LinkTarget::Page("functions.html".to_owned())
        );
    }

    #[test]
    fn test_keeps_fragment() {
        assert_eq!(
            book().resolve("loops.md#for-loops", "intro.md"),
            LinkTarget::Page("loops.html#for-loops".to_owned())
        );
    }

    #[test]
    fn test_root_relative_link() {
        assert_eq!(
            book().resolve("/chapters/functions.md", "loops.md"),
            LinkTarget::Page("functions.html".to_owned())
        );
    }

    #[test]
    fn test_percent_encoded_path() {
        assert_eq!(
            book().resolve("async%20io.md", "chapters/functions.md"),
            LinkTarget::Page("async-io.html".to_owned())
        );
    }

    #[test]
    fn test_unknown_chapter_is_unresolved() {
        assert_eq!(
            book().resolve("generators.md", "chapters/functions.md"),
            LinkTarget::Unresolved("chapters/generators.md".to_owned())
        );
    }

    #[test]
    fn test_non_chapter_links_untouched() {
        let map = book();
        for dest in [
            "https://docs.python.org/3/",
            "http://example.com/readme.md",
            "#section",
            "mailto:team@example.com",
            "images/diagram.png",
            "notes.txt",
            "",
        ] {
            assert_eq!(map.resolve(dest, "loops.md"), LinkTarget::External, "{dest}");
        }
    }

    #[test]
    fn test_parent_dir_cannot_escape_root() {
        assert_eq!(join_relative("a", "../../b.md"), "b.md");
    }

    #[test]
    fn test_insert_normalizes_source_path() {
        let mut map = LinkMap::new();
        map.insert("./guide/../loops.md", "loops.html");
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.resolve("loops.md", "intro.md"),
            LinkTarget::Page("loops.html".to_owned())
        );
    }
}
