//! Markdown to [`Document`] parser.
//!
//! Drives pulldown-cmark's event stream and folds it into a block tree.
//! Fenced code blocks keep their language tag and verbatim text; a fence
//! that is never closed is reported as [`ParseError::UnterminatedFence`].

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::document::{
    AlertKind, Alignment, Block, CodeBlock, Document, Heading, Inline, List, ListItem,
    OutlineEntry, PLAIN_LANGUAGE, Table, plain_text,
};
use crate::error::ParseError;
use crate::fence::{has_closing_fence, parse_fence_info};
use crate::util::{LineIndex, UniqueSlugs, heading_level_to_num};

/// Parse chapter Markdown with default options (GFM enabled).
///
/// # Example
///
/// ```
/// use hb_renderer::{Block, parse};
///
/// let doc = parse("```python\nfor x in xs:\n    pass\n```\n").unwrap();
/// let Block::CodeBlock(code) = &doc.blocks()[0] else { panic!() };
/// assert_eq!(code.language, "python");
/// ```
pub fn parse(markdown: &str) -> Result<Document, ParseError> {
    MarkdownParser::new().parse(markdown)
}

/// Configurable Markdown parser.
#[derive(Clone, Debug)]
pub struct MarkdownParser {
    gfm: bool,
}

impl MarkdownParser {
    /// Create a new parser with GFM enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Alerts (`> [!NOTE]`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Parse Markdown text into a [`Document`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnterminatedFence`] if a fenced code block has
    /// no closing fence.
    pub fn parse(&self, markdown: &str) -> Result<Document, ParseError> {
        let mut builder = TreeBuilder::new(markdown);
        for (event, range) in Parser::new_ext(markdown, self.parser_options()).into_offset_iter() {
            builder.process_event(event, range)?;
        }
        Ok(builder.finish())
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Open block container.
enum BlockFrame {
    Root(Vec<Block>),
    Quote {
        kind: Option<AlertKind>,
        blocks: Vec<Block>,
    },
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item {
        task: Option<bool>,
        blocks: Vec<Block>,
    },
}

/// Open inline container.
enum InlineFrame {
    Leaf(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        dest: String,
        title: String,
        content: Vec<Inline>,
    },
    Image {
        src: String,
        title: String,
        alt: String,
    },
}

#[derive(Default)]
struct TableFrame {
    alignments: Vec<Alignment>,
    head: Vec<Vec<Inline>>,
    rows: Vec<Vec<Vec<Inline>>>,
    row: Vec<Vec<Inline>>,
}

/// Folds pulldown-cmark events into a [`Document`].
struct TreeBuilder<'s> {
    source: &'s str,
    lines: LineIndex,
    blocks: Vec<BlockFrame>,
    inlines: Vec<InlineFrame>,
    /// The bottom inline frame was opened for a tight list item, not a paragraph.
    implicit_plain: bool,
    heading_level: Option<u8>,
    code: Option<CodeBlock>,
    html_block: Option<String>,
    table: Option<TableFrame>,
    slugs: UniqueSlugs,
    title: Option<String>,
    outline: Vec<OutlineEntry>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            blocks: vec![BlockFrame::Root(Vec::new())],
            inlines: Vec::new(),
            implicit_plain: false,
            heading_level: None,
            code: None,
            html_block: None,
            table: None,
            slugs: UniqueSlugs::default(),
            title: None,
            outline: Vec::new(),
        }
    }

    fn finish(mut self) -> Document {
        self.flush_plain();
        let blocks = match self.blocks.pop() {
            Some(BlockFrame::Root(blocks)) => blocks,
            _ => Vec::new(),
        };
        Document::new(blocks, self.title, self.outline)
    }

    fn process_event(&mut self, event: Event<'_>, range: Range<usize>) -> Result<(), ParseError> {
        match event {
            Event::Start(tag) => self.start_tag(tag, range)?,
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(Inline::Code(code.into_string())),
            Event::Html(html) => match self.html_block.as_mut() {
                Some(buffer) => buffer.push_str(&html),
                None => self.push_inline(Inline::Html(html.into_string())),
            },
            Event::InlineHtml(html) => self.push_inline(Inline::Html(html.into_string())),
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => {
                self.flush_plain();
                self.push_block(Block::Rule);
            }
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
        Ok(())
    }

    fn start_tag(&mut self, tag: Tag<'_>, range: Range<usize>) -> Result<(), ParseError> {
        match tag {
            Tag::Paragraph => {
                self.flush_plain();
                self.inlines.push(InlineFrame::Leaf(Vec::new()));
            }
            Tag::Heading { level, .. } => {
                self.flush_plain();
                self.heading_level = Some(heading_level_to_num(level));
                self.inlines.push(InlineFrame::Leaf(Vec::new()));
            }
            Tag::BlockQuote(kind) => {
                self.flush_plain();
                self.blocks.push(BlockFrame::Quote {
                    kind: kind.map(AlertKind::from),
                    blocks: Vec::new(),
                });
            }
            Tag::CodeBlock(kind) => {
                self.flush_plain();
                let line = self.lines.line_of(range.start);
                let (language, attrs) = match kind {
                    CodeBlockKind::Fenced(info) => {
                        if !has_closing_fence(self.source, range) {
                            return Err(ParseError::UnterminatedFence { line });
                        }
                        parse_fence_info(&info)
                    }
                    CodeBlockKind::Indented => (PLAIN_LANGUAGE.to_owned(), Vec::new()),
                };
                self.code = Some(CodeBlock {
                    language,
                    attrs,
                    text: String::new(),
                    line,
                });
            }
            Tag::HtmlBlock => {
                self.flush_plain();
                self.html_block = Some(String::new());
            }
            Tag::List(start) => {
                self.flush_plain();
                self.blocks.push(BlockFrame::List {
                    start,
                    items: Vec::new(),
                });
            }
            Tag::Item => {
                self.blocks.push(BlockFrame::Item {
                    task: None,
                    blocks: Vec::new(),
                });
            }
            Tag::Table(alignments) => {
                self.flush_plain();
                self.table = Some(TableFrame {
                    alignments: alignments.into_iter().map(Alignment::from).collect(),
                    ..TableFrame::default()
                });
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Tag::TableCell => self.inlines.push(InlineFrame::Leaf(Vec::new())),
            Tag::Emphasis => self.open_inline(InlineFrame::Emphasis(Vec::new())),
            Tag::Strong => self.open_inline(InlineFrame::Strong(Vec::new())),
            Tag::Strikethrough => self.open_inline(InlineFrame::Strikethrough(Vec::new())),
            Tag::Link {
                dest_url, title, ..
            } => self.open_inline(InlineFrame::Link {
                dest: dest_url.into_string(),
                title: title.into_string(),
                content: Vec::new(),
            }),
            Tag::Image {
                dest_url, title, ..
            } => self.open_inline(InlineFrame::Image {
                src: dest_url.into_string(),
                title: title.into_string(),
                alt: String::new(),
            }),
            Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::MetadataBlock(_)
            | Tag::Superscript
            | Tag::Subscript => {}
        }
        Ok(())
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                let content = self.close_leaf();
                self.push_block(Block::Paragraph(content));
            }
            TagEnd::Heading(_) => {
                let content = self.close_leaf();
                let level = self.heading_level.take().unwrap_or(1);
                self.finish_heading(level, content);
            }
            TagEnd::BlockQuote(_) => {
                self.flush_plain();
                if let Some(BlockFrame::Quote { kind, blocks }) = self.blocks.pop() {
                    self.push_block(Block::BlockQuote { kind, blocks });
                }
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.push_block(Block::CodeBlock(code));
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html_block.take() {
                    self.push_block(Block::Html(html));
                }
            }
            TagEnd::List(_) => {
                if let Some(BlockFrame::List { start, items }) = self.blocks.pop() {
                    self.push_block(Block::List(List { start, items }));
                }
            }
            TagEnd::Item => {
                self.flush_plain();
                if let Some(BlockFrame::Item { task, blocks }) = self.blocks.pop()
                    && let Some(BlockFrame::List { items, .. }) = self.blocks.last_mut()
                {
                    items.push(ListItem { task, blocks });
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.push_block(Block::Table(Table {
                        alignments: table.alignments,
                        head: table.head,
                        rows: table.rows,
                    }));
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.head = std::mem::take(&mut table.row);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::TableCell => {
                let cell = self.close_leaf();
                if let Some(table) = self.table.as_mut() {
                    table.row.push(cell);
                }
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image => self.close_inline(),
            TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::MetadataBlock(_)
            | TagEnd::Superscript
            | TagEnd::Subscript => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.text.push_str(text);
        } else if let Some(html) = self.html_block.as_mut() {
            html.push_str(text);
        } else {
            self.push_inline(Inline::Text(text.to_owned()));
        }
    }

    fn task_list_marker(&mut self, checked: bool) {
        let item_task = self.blocks.iter_mut().rev().find_map(|frame| match frame {
            BlockFrame::Item { task, .. } => Some(task),
            _ => None,
        });
        if let Some(task) = item_task {
            *task = Some(checked);
        }
    }

    fn finish_heading(&mut self, level: u8, content: Vec<Inline>) {
        let text = plain_text(&content);
        let id = self.slugs.next(&text);

        if level == 1 && self.title.is_none() {
            self.title = Some(text.trim().to_owned());
        }
        if matches!(level, 2 | 3) {
            self.outline.push(OutlineEntry {
                level,
                title: text.trim().to_owned(),
                id: id.clone(),
            });
        }

        self.push_block(Block::Heading(Heading { level, id, content }));
    }

    fn push_block(&mut self, block: Block) {
        match self.blocks.last_mut() {
            Some(
                BlockFrame::Root(blocks)
                | BlockFrame::Quote { blocks, .. }
                | BlockFrame::Item { blocks, .. },
            ) => blocks.push(block),
            Some(BlockFrame::List { .. }) | None => {}
        }
    }

    /// Open a leaf for inline content that arrives outside any paragraph
    /// (tight list items).
    fn ensure_leaf(&mut self) {
        if self.inlines.is_empty() {
            self.inlines.push(InlineFrame::Leaf(Vec::new()));
            self.implicit_plain = true;
        }
    }

    /// Close an implicit tight-list leaf and emit it as a [`Block::Plain`].
    fn flush_plain(&mut self) {
        if !self.implicit_plain {
            return;
        }
        self.implicit_plain = false;
        if let Some(InlineFrame::Leaf(content)) = self.inlines.pop()
            && !content.is_empty()
        {
            self.push_block(Block::Plain(content));
        }
    }

    fn close_leaf(&mut self) -> Vec<Inline> {
        match self.inlines.pop() {
            Some(InlineFrame::Leaf(content)) => content,
            _ => Vec::new(),
        }
    }

    fn open_inline(&mut self, frame: InlineFrame) {
        self.ensure_leaf();
        self.inlines.push(frame);
    }

    fn close_inline(&mut self) {
        let inline = match self.inlines.pop() {
            Some(InlineFrame::Emphasis(children)) => Inline::Emphasis(children),
            Some(InlineFrame::Strong(children)) => Inline::Strong(children),
            Some(InlineFrame::Strikethrough(children)) => Inline::Strikethrough(children),
            Some(InlineFrame::Link {
                dest,
                title,
                content,
            }) => Inline::Link {
                dest,
                title,
                content,
            },
            Some(InlineFrame::Image { src, title, alt }) => Inline::Image { src, title, alt },
            Some(leaf @ InlineFrame::Leaf(_)) => {
                self.inlines.push(leaf);
                return;
            }
            None => return,
        };
        self.push_inline(inline);
    }

    fn push_inline(&mut self, inline: Inline) {
        self.ensure_leaf();
        match self.inlines.last_mut() {
            Some(InlineFrame::Image { alt, .. }) => {
                alt.push_str(&plain_text(std::slice::from_ref(&inline)));
            }
            Some(
                InlineFrame::Leaf(children)
                | InlineFrame::Emphasis(children)
                | InlineFrame::Strong(children)
                | InlineFrame::Strikethrough(children)
                | InlineFrame::Link {
                    content: children, ..
                },
            ) => push_merged(children, inline),
            None => {}
        }
    }
}

/// Append an inline, merging adjacent text runs.
fn push_merged(children: &mut Vec<Inline>, inline: Inline) {
    if let (Some(Inline::Text(prev)), Inline::Text(next)) = (children.last_mut(), &inline) {
        prev.push_str(next);
        return;
    }
    children.push(inline);
}
