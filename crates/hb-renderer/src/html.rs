//! HTML rendering for parsed chapters.
//!
//! Produces semantic HTML5 with:
//! - `<pre data-lang="L"><code class="language-L">` for code blocks
//! - `<div class="code-compare">` around runs of code blocks in different languages
//! - GitHub-style alert containers for `> [!NOTE]` quotes
//! - Chapter `.md` links rewritten through a [`LinkMap`]

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::Write;

use crate::document::{
    AlertKind, Alignment, Block, CodeBlock, Document, Inline, List, OutlineEntry, Table,
};
use crate::links::{LinkMap, LinkTarget};
use crate::util::escape_html;

/// Result of rendering a chapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Rendered HTML body content.
    pub html: String,
    /// Title from the first H1, if any.
    pub title: Option<String>,
    /// Level 2 and 3 headings for the "On this page" panel.
    pub outline: Vec<OutlineEntry>,
    /// Source paths of `.md` links that matched no chapter.
    pub unresolved_links: Vec<String>,
}

/// Renders a [`Document`] to HTML.
///
/// Rendering is pure: the same document and settings always produce the
/// same output.
///
/// # Example
///
/// ```
/// use hb_renderer::{HtmlRenderer, parse};
///
/// let doc = parse("```python\nprint('hi')\n```").unwrap();
/// let rendered = HtmlRenderer::new().render(&doc);
/// assert_eq!(
///     rendered.html,
///     r#"<pre data-lang="python"><code class="language-python">print(&#x27;hi&#x27;)
/// </code></pre>"#
/// );
/// ```
#[derive(Clone, Debug)]
pub struct HtmlRenderer<'a> {
    compare_code: bool,
    links: Option<(&'a LinkMap, &'a str)>,
}

impl<'a> HtmlRenderer<'a> {
    /// Create a renderer with code comparison panels enabled and no link map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            compare_code: true,
            links: None,
        }
    }

    /// Enable or disable wrapping runs of different-language code blocks
    /// in a comparison panel.
    #[must_use]
    pub fn with_code_comparison(mut self, enabled: bool) -> Self {
        self.compare_code = enabled;
        self
    }

    /// Rewrite chapter links using `map`, resolving relative paths against
    /// `source_path` (the rendered chapter's own source path).
    #[must_use]
    pub fn with_links(mut self, map: &'a LinkMap, source_path: &'a str) -> Self {
        self.links = Some((map, source_path));
        self
    }

    /// Render a document.
    #[must_use]
    pub fn render(&self, doc: &Document) -> RenderedDocument {
        let mut writer = HtmlWriter {
            renderer: self,
            out: String::with_capacity(4096),
            unresolved: Vec::new(),
        };
        writer.blocks(doc.blocks());

        RenderedDocument {
            html: writer.out,
            title: doc.title().map(ToOwned::to_owned),
            outline: doc.outline().to_vec(),
            unresolved_links: writer.unresolved,
        }
    }

    fn link_href<'d>(&self, dest: &'d str, unresolved: &mut Vec<String>) -> Cow<'d, str> {
        let Some((map, from)) = self.links else {
            return Cow::Borrowed(dest);
        };
        match map.resolve(dest, from) {
            LinkTarget::External => Cow::Borrowed(dest),
            LinkTarget::Page(href) => Cow::Owned(href),
            LinkTarget::Unresolved(path) => {
                if !unresolved.contains(&path) {
                    unresolved.push(path);
                }
                Cow::Borrowed(dest)
            }
        }
    }
}

impl Default for HtmlRenderer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

struct HtmlWriter<'r, 'a> {
    renderer: &'r HtmlRenderer<'a>,
    out: String,
    unresolved: Vec<String>,
}

impl HtmlWriter<'_, '_> {
    fn blocks(&mut self, blocks: &[Block]) {
        let mut index = 0;
        while index < blocks.len() {
            if self.renderer.compare_code {
                let run = compare_run(&blocks[index..]);
                if run.len() >= 2 {
                    self.out.push_str(r#"<div class="code-compare">"#);
                    for code in &run {
                        self.code_block(code);
                    }
                    self.out.push_str("</div>");
                    index += run.len();
                    continue;
                }
            }
            self.block(&blocks[index]);
            index += 1;
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading(heading) => {
                let _ = write!(
                    self.out,
                    r#"<h{} id="{}">"#,
                    heading.level,
                    escape_html(&heading.id)
                );
                self.inlines(&heading.content);
                let _ = write!(self.out, "</h{}>", heading.level);
            }
            Block::Paragraph(content) => {
                self.out.push_str("<p>");
                self.inlines(content);
                self.out.push_str("</p>");
            }
            Block::Plain(content) => self.inlines(content),
            Block::CodeBlock(code) => self.code_block(code),
            Block::List(list) => self.list(list),
            Block::Table(table) => self.table(table),
            Block::BlockQuote { kind: None, blocks } => {
                self.out.push_str("<blockquote>");
                self.blocks(blocks);
                self.out.push_str("</blockquote>");
            }
            Block::BlockQuote {
                kind: Some(kind),
                blocks,
            } => {
                let (class, title) = alert_class_and_title(*kind);
                let _ = write!(
                    self.out,
                    r#"<div class="alert alert-{class}"><div class="alert-title">{title}</div><div class="alert-content">"#
                );
                self.blocks(blocks);
                self.out.push_str("</div></div>");
            }
            Block::Rule => self.out.push_str("<hr>"),
            Block::Html(html) => self.out.push_str(html),
        }
    }

    fn code_block(&mut self, code: &CodeBlock) {
        let lang = escape_html(&code.language);
        let _ = write!(self.out, r#"<pre data-lang="{lang}""#);
        if let Some(title) = code.attr("title") {
            let _ = write!(self.out, r#" data-title="{}""#, escape_html(title));
        }
        let _ = write!(
            self.out,
            r#"><code class="language-{lang}">{}</code></pre>"#,
            escape_html(&code.text)
        );
    }

    fn list(&mut self, list: &List) {
        match list.start {
            None => self.out.push_str("<ul>"),
            Some(1) => self.out.push_str("<ol>"),
            Some(start) => {
                let _ = write!(self.out, r#"<ol start="{start}">"#);
            }
        }
        for item in &list.items {
            self.out.push_str("<li>");
            match item.task {
                Some(true) => self.out.push_str(r#"<input type="checkbox" checked disabled> "#),
                Some(false) => self.out.push_str(r#"<input type="checkbox" disabled> "#),
                None => {}
            }
            self.blocks(&item.blocks);
            self.out.push_str("</li>");
        }
        self.out
            .push_str(if list.start.is_some() { "</ol>" } else { "</ul>" });
    }

    fn table(&mut self, table: &Table) {
        self.out.push_str("<table><thead><tr>");
        for (index, cell) in table.head.iter().enumerate() {
            self.table_cell("th", table.alignments.get(index).copied(), cell);
        }
        self.out.push_str("</tr></thead><tbody>");
        for row in &table.rows {
            self.out.push_str("<tr>");
            for (index, cell) in row.iter().enumerate() {
                self.table_cell("td", table.alignments.get(index).copied(), cell);
            }
            self.out.push_str("</tr>");
        }
        self.out.push_str("</tbody></table>");
    }

    fn table_cell(&mut self, tag: &str, alignment: Option<Alignment>, content: &[Inline]) {
        match alignment {
            Some(Alignment::Left) => {
                let _ = write!(self.out, r#"<{tag} style="text-align:left">"#);
            }
            Some(Alignment::Center) => {
                let _ = write!(self.out, r#"<{tag} style="text-align:center">"#);
            }
            Some(Alignment::Right) => {
                let _ = write!(self.out, r#"<{tag} style="text-align:right">"#);
            }
            Some(Alignment::None) | None => {
                let _ = write!(self.out, "<{tag}>");
            }
        }
        self.inlines(content);
        let _ = write!(self.out, "</{tag}>");
    }

    fn inlines(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            self.inline(inline);
        }
    }

    fn inline(&mut self, inline: &Inline) {
        match inline {
            Inline::Text(text) => self.out.push_str(&escape_html(text)),
            Inline::Code(code) => {
                let _ = write!(self.out, "<code>{}</code>", escape_html(code));
            }
            Inline::Emphasis(children) => self.wrapped("em", children),
            Inline::Strong(children) => self.wrapped("strong", children),
            Inline::Strikethrough(children) => self.wrapped("s", children),
            Inline::Link {
                dest,
                title,
                content,
            } => {
                let href = self.renderer.link_href(dest, &mut self.unresolved);
                let _ = write!(self.out, r#"<a href="{}""#, escape_html(&href));
                if !title.is_empty() {
                    let _ = write!(self.out, r#" title="{}""#, escape_html(title));
                }
                self.out.push('>');
                self.inlines(content);
                self.out.push_str("</a>");
            }
            Inline::Image { src, title, alt } => {
                let _ = write!(self.out, r#"<img src="{}""#, escape_html(src));
                if !title.is_empty() {
                    let _ = write!(self.out, r#" title="{}""#, escape_html(title));
                }
                let _ = write!(self.out, r#" alt="{}">"#, escape_html(alt));
            }
            Inline::SoftBreak => self.out.push('\n'),
            Inline::HardBreak => self.out.push_str("<br>"),
            Inline::Html(html) => self.out.push_str(html),
        }
    }

    fn wrapped(&mut self, tag: &str, children: &[Inline]) {
        let _ = write!(self.out, "<{tag}>");
        self.inlines(children);
        let _ = write!(self.out, "</{tag}>");
    }
}

/// Leading run of adjacent code blocks whose languages are all distinct.
fn compare_run(blocks: &[Block]) -> Vec<&CodeBlock> {
    let mut seen = HashSet::new();
    blocks
        .iter()
        .map_while(|block| match block {
            Block::CodeBlock(code) if seen.insert(code.language.as_str()) => Some(code),
            _ => None,
        })
        .collect()
}

fn alert_class_and_title(kind: AlertKind) -> (&'static str, &'static str) {
    match kind {
        AlertKind::Note => ("note", "Note"),
        AlertKind::Tip => ("tip", "Tip"),
        AlertKind::Important => ("important", "Important"),
        AlertKind::Warning => ("warning", "Warning"),
        AlertKind::Caution => ("caution", "Caution"),
    }
}

/// Code block recovered from rendered HTML.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedCode {
    pub language: String,
    pub text: String,
}

/// Recover code blocks from HTML produced by [`HtmlRenderer`].
///
/// Scans for `<pre data-lang=...><code ...>` elements in document order and
/// unescapes their content, returning the original code text byte-for-byte.
#[must_use]
pub fn extract_code_blocks(html: &str) -> Vec<ExtractedCode> {
    const PRE: &str = r#"<pre data-lang=""#;

    let mut blocks = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find(PRE) {
        rest = &rest[start + PRE.len()..];
        let Some(lang_end) = rest.find('"') else {
            break;
        };
        let language = unescape(&rest[..lang_end]);
        rest = &rest[lang_end..];

        let Some(code_open) = rest.find("<code") else {
            break;
        };
        rest = &rest[code_open..];
        let Some(content_start) = rest.find('>') else {
            break;
        };
        rest = &rest[content_start + 1..];
        let Some(content_end) = rest.find("</code>") else {
            break;
        };
        let text = unescape(&rest[..content_end]);
        rest = &rest[content_end..];

        blocks.push(ExtractedCode { language, text });
    }
    blocks
}

fn unescape(raw: &str) -> String {
    quick_xml::escape::unescape(raw).map_or_else(|_| raw.to_owned(), Cow::into_owned)
}
