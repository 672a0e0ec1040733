//! Site assembly.
//!
//! Stitches rendered chapters into complete pages in manifest order, wires
//! up previous/next navigation, and builds the table of contents page.

use std::collections::HashMap;

use hb_renderer::RenderedDocument;

use crate::assets::{STYLESHEET, STYLESHEET_PATH};
use crate::error::BuildError;
use crate::manifest::Manifest;
use crate::template::{
    IndexEntryData, NavItemData, PageData, PageLinkData, render_index, render_page,
};

/// Book title used when neither the config nor the manifest sets one.
const DEFAULT_BOOK_TITLE: &str = "Handbook";

/// File name of the table of contents page.
pub const INDEX_FILE: &str = "index.html";

/// A chapter after rendering, keyed by its manifest id.
#[derive(Clone, Debug)]
pub struct RenderedChapter {
    pub id: String,
    pub document: RenderedDocument,
}

/// Link to a neighboring chapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub title: String,
    pub href: String,
}

/// Previous/next links of a chapter page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavLinks {
    pub prev: Option<NavLink>,
    pub next: Option<NavLink>,
}

/// A complete output page.
#[derive(Clone, Debug)]
pub struct Page {
    pub id: String,
    pub title: String,
    /// Output file name relative to the site root.
    pub file_name: String,
    pub nav: NavLinks,
    /// Full HTML document.
    pub html: String,
}

/// Assembled site: chapter pages in manifest order plus the contents page.
#[derive(Clone, Debug)]
pub struct Site {
    title: String,
    pages: Vec<Page>,
    index: HashMap<String, usize>,
    toc: Page,
}

impl Site {
    /// Book title shown in page headers.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Chapter pages in manifest order.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Number of chapter pages (excludes the contents page).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Position of a chapter in reading order, by title.
    #[must_use]
    pub fn position(&self, title: &str) -> Option<usize> {
        self.index.get(title).copied()
    }

    /// Chapter page by title.
    #[must_use]
    pub fn page(&self, title: &str) -> Option<&Page> {
        self.position(title).and_then(|i| self.pages.get(i))
    }

    /// Table of contents page (`index.html`).
    #[must_use]
    pub fn toc(&self) -> &Page {
        &self.toc
    }

    /// Every output file as `(relative path, contents)`, in a fixed order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        std::iter::once((self.toc.file_name.as_str(), self.toc.html.as_str()))
            .chain(
                self.pages
                    .iter()
                    .map(|page| (page.file_name.as_str(), page.html.as_str())),
            )
            .chain(std::iter::once((STYLESHEET_PATH, STYLESHEET)))
    }
}

/// Assembly settings.
#[derive(Clone, Debug)]
pub struct AssembleOptions {
    /// Fail on `.md` links that match no chapter instead of warning.
    pub strict_links: bool,
    /// Overrides the manifest's book title.
    pub site_title: Option<String>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            strict_links: true,
            site_title: None,
        }
    }
}

/// Assemble a site with default options.
pub fn assemble(manifest: &Manifest, rendered: Vec<RenderedChapter>) -> Result<Site, BuildError> {
    Assembler::new(AssembleOptions::default()).assemble(manifest, rendered)
}

/// Builds a [`Site`] from rendered chapters.
#[derive(Clone, Debug, Default)]
pub struct Assembler {
    options: AssembleOptions,
}

impl Assembler {
    #[must_use]
    pub fn new(options: AssembleOptions) -> Self {
        Self { options }
    }

    /// Assemble rendered chapters into a site.
    ///
    /// Every manifest chapter must have a rendered counterpart; a missing one
    /// is a [`BuildError::BrokenLink`]. Rendered chapters the manifest does
    /// not list are ignored.
    pub fn assemble(
        &self,
        manifest: &Manifest,
        rendered: Vec<RenderedChapter>,
    ) -> Result<Site, BuildError> {
        let book_title = self
            .options
            .site_title
            .as_deref()
            .or(manifest.title())
            .unwrap_or(DEFAULT_BOOK_TITLE)
            .to_owned();

        let mut by_id: HashMap<String, RenderedDocument> = rendered
            .into_iter()
            .map(|chapter| (chapter.id, chapter.document))
            .collect();

        let chapters = manifest.chapters();
        let file_names: Vec<String> = chapters.iter().map(|c| c.file_name()).collect();

        let mut documents = Vec::with_capacity(chapters.len());
        for (chapter, file_name) in chapters.iter().zip(&file_names) {
            let document = by_id.remove(&chapter.id).ok_or_else(|| BuildError::BrokenLink {
                chapter: chapter.title.clone(),
                target: file_name.clone(),
            })?;
            self.check_links(&chapter.title, &document)?;
            documents.push(document);
        }
        if !by_id.is_empty() {
            tracing::debug!(count = by_id.len(), "Ignoring rendered chapters not in manifest");
        }

        let mut pages = Vec::with_capacity(chapters.len());
        let mut index = HashMap::with_capacity(chapters.len());

        for (position, (chapter, document)) in chapters.iter().zip(&documents).enumerate() {
            let nav = NavLinks {
                prev: position.checked_sub(1).map(|i| NavLink {
                    title: chapters[i].title.clone(),
                    href: file_names[i].clone(),
                }),
                next: chapters.get(position + 1).map(|next| NavLink {
                    title: next.title.clone(),
                    href: file_names[position + 1].clone(),
                }),
            };

            let navigation = navigation(manifest, &file_names, Some(position));
            let html = render_page(&PageData {
                book_title: &book_title,
                title: &chapter.title,
                html_content: &document.html,
                toc: &document.outline,
                navigation: &navigation,
                prev: nav.prev.as_ref().map(|link| PageLinkData {
                    title: &link.title,
                    href: &link.href,
                }),
                next: nav.next.as_ref().map(|link| PageLinkData {
                    title: &link.title,
                    href: &link.href,
                }),
            });

            index.insert(chapter.title.clone(), position);
            pages.push(Page {
                id: chapter.id.clone(),
                title: chapter.title.clone(),
                file_name: file_names[position].clone(),
                nav,
                html,
            });
        }

        let entries: Vec<IndexEntryData<'_>> = chapters
            .iter()
            .zip(&documents)
            .zip(&file_names)
            .map(|((chapter, document), file_name)| IndexEntryData {
                id: &chapter.id,
                title: &chapter.title,
                href: file_name.clone(),
                sections: &document.outline,
            })
            .collect();
        let toc = Page {
            id: "index".to_owned(),
            title: book_title.clone(),
            file_name: INDEX_FILE.to_owned(),
            nav: NavLinks::default(),
            html: render_index(&book_title, &navigation(manifest, &file_names, None), &entries),
        };

        tracing::info!(pages = pages.len(), "Assembled site");

        Ok(Site {
            title: book_title,
            pages,
            index,
            toc,
        })
    }

    fn check_links(&self, chapter: &str, document: &RenderedDocument) -> Result<(), BuildError> {
        let Some(target) = document.unresolved_links.first() else {
            return Ok(());
        };
        if self.options.strict_links {
            return Err(BuildError::BrokenLink {
                chapter: chapter.to_owned(),
                target: target.clone(),
            });
        }
        for target in &document.unresolved_links {
            tracing::warn!(chapter, target = %target, "Link to unknown chapter");
        }
        Ok(())
    }
}

fn navigation<'a>(
    manifest: &'a Manifest,
    file_names: &[String],
    active: Option<usize>,
) -> Vec<NavItemData<'a>> {
    manifest
        .chapters()
        .iter()
        .zip(file_names)
        .enumerate()
        .map(|(i, (chapter, file_name))| NavItemData {
            title: &chapter.title,
            href: file_name.clone(),
            is_active: active == Some(i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use hb_renderer::{HtmlRenderer, parse};
    use pretty_assertions::assert_eq;

    use super::*;

    static_assertions::assert_impl_all!(Site: Send, Sync);

    fn manifest(titles: &[&str]) -> Manifest {
        let mut yaml = String::from("title: Python Mastery Handbook\nchapters:\n");
        for title in titles {
            yaml.push_str(&format!("  - title: {title}\n    path: {}.md\n", title.to_lowercase()));
        }
        Manifest::from_yaml(&yaml, "").unwrap()
    }

    fn rendered(id: &str, markdown: &str) -> RenderedChapter {
        RenderedChapter {
            id: id.to_owned(),
            document: HtmlRenderer::new().render(&parse(markdown).unwrap()),
        }
    }

    fn rendered_all(manifest: &Manifest) -> Vec<RenderedChapter> {
        manifest
            .chapters()
            .iter()
            .map(|c| rendered(&c.id, &format!("# {}\n\nBody.", c.title)))
            .collect()
    }

    #[test]
    fn test_loops_functions_navigation() {
        let manifest = manifest(&["Loops", "Functions"]);
        let site = assemble(&manifest, rendered_all(&manifest)).unwrap();

        let loops = site.page("Loops").unwrap();
        let functions = site.page("Functions").unwrap();

        assert_eq!(loops.nav.prev, None);
        assert_eq!(
            loops.nav.next,
            Some(NavLink {
                title: "Functions".to_owned(),
                href: "functions.html".to_owned(),
            })
        );
        assert_eq!(
            functions.nav.prev,
            Some(NavLink {
                title: "Loops".to_owned(),
                href: "loops.html".to_owned(),
            })
        );
        assert_eq!(functions.nav.next, None);
        assert!(loops.html.contains("rel=\"next\""));
        assert!(!loops.html.contains("rel=\"prev\""));
    }

    #[test]
    fn test_next_links_follow_manifest_order() {
        let titles = ["Basics", "Loops", "Functions", "Classes", "Modules"];
        let manifest = manifest(&titles);
        let site = assemble(&manifest, rendered_all(&manifest)).unwrap();

        assert_eq!(site.len(), titles.len());
        for (i, page) in site.pages().iter().enumerate() {
            assert_eq!(site.position(&page.title), Some(i));
            assert_eq!(
                page.nav.next.as_ref().map(|l| l.title.as_str()),
                titles.get(i + 1).copied()
            );
        }
        assert!(site.pages()[0].nav.prev.is_none());
    }

    #[test]
    fn test_rendered_order_does_not_matter() {
        let manifest = manifest(&["Loops", "Functions"]);
        let mut chapters = rendered_all(&manifest);
        chapters.reverse();

        let site = assemble(&manifest, chapters).unwrap();
        let titles: Vec<_> = site.pages().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Loops", "Functions"]);
    }

    #[test]
    fn test_missing_rendered_chapter_is_broken_link() {
        let manifest = manifest(&["Loops", "Functions"]);
        let chapters = vec![rendered("loops", "# Loops")];

        let err = assemble(&manifest, chapters).unwrap_err();
        match err {
            BuildError::BrokenLink { chapter, target } => {
                assert_eq!(chapter, "Functions");
                assert_eq!(target, "functions.html");
            }
            other => panic!("expected BrokenLink, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_link_strict_and_lenient() {
        let manifest = manifest(&["Loops"]);
        let mut map = hb_renderer::LinkMap::new();
        map.insert("loops.md", "loops.html");
        let doc = parse("See [generators](generators.md).").unwrap();
        let chapter = || RenderedChapter {
            id: "loops".to_owned(),
            document: HtmlRenderer::new().with_links(&map, "loops.md").render(&doc),
        };

        let err = assemble(&manifest, vec![chapter()]).unwrap_err();
        assert!(matches!(
            err,
            BuildError::BrokenLink { ref target, .. } if target == "generators.md"
        ));

        let lenient = Assembler::new(AssembleOptions {
            strict_links: false,
            site_title: None,
        });
        assert!(lenient.assemble(&manifest, vec![chapter()]).is_ok());
    }

    #[test]
    fn test_toc_page_lists_chapters_in_order() {
        let manifest = manifest(&["Loops", "Functions"]);
        let site = assemble(&manifest, rendered_all(&manifest)).unwrap();
        let toc = &site.toc().html;

        assert_eq!(site.toc().file_name, "index.html");
        let loops = toc.find("id=\"chapter-loops\"").unwrap();
        let functions = toc.find("id=\"chapter-functions\"").unwrap();
        assert!(loops < functions);
        assert!(toc.contains("<h1>Python Mastery Handbook</h1>"));
    }

    #[test]
    fn test_site_title_override() {
        let manifest = manifest(&["Loops"]);
        let assembler = Assembler::new(AssembleOptions {
            strict_links: true,
            site_title: Some("Custom".to_owned()),
        });
        let site = assembler.assemble(&manifest, rendered_all(&manifest)).unwrap();
        assert_eq!(site.title(), "Custom");
        assert!(site.pages()[0].html.contains("<title>Loops - Custom</title>"));
    }

    #[test]
    fn test_files_cover_every_page() {
        let manifest = manifest(&["Loops", "Functions", "Classes"]);
        let site = assemble(&manifest, rendered_all(&manifest)).unwrap();

        let paths: Vec<_> = site.files().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            [
                "index.html",
                "loops.html",
                "functions.html",
                "classes.html",
                "assets/style.css"
            ]
        );
    }

    #[test]
    fn test_active_chapter_marked_in_sidebar() {
        let manifest = manifest(&["Loops", "Functions"]);
        let site = assemble(&manifest, rendered_all(&manifest)).unwrap();
        let functions = &site.page("Functions").unwrap().html;
        assert!(functions.contains("<a href=\"functions.html\" class=\"active\""));
        assert!(!functions.contains("<a href=\"loops.html\" class=\"active\""));
    }
}
