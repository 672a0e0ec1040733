//! Structured chapter document.
//!
//! A [`Document`] is an ordered sequence of [`Block`] nodes produced by the
//! parser. Block order matches source order and nodes are never mutated
//! after the parser hands the document out.

use pulldown_cmark::{Alignment as CmarkAlignment, BlockQuoteKind};

/// Parsed representation of one chapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
    title: Option<String>,
    outline: Vec<OutlineEntry>,
}

impl Document {
    pub(crate) fn new(blocks: Vec<Block>, title: Option<String>, outline: Vec<OutlineEntry>) -> Self {
        Self {
            blocks,
            title,
            outline,
        }
    }

    /// Top-level blocks in source order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Plain text of the first level-1 heading, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Level 2 and 3 headings in source order.
    #[must_use]
    pub fn outline(&self) -> &[OutlineEntry] {
        &self.outline
    }

    /// All code blocks in source order, including nested ones.
    pub fn code_blocks(&self) -> impl Iterator<Item = &CodeBlock> + '_ {
        let mut found = Vec::new();
        collect_code_blocks(&self.blocks, &mut found);
        found.into_iter()
    }
}

fn collect_code_blocks<'a>(blocks: &'a [Block], out: &mut Vec<&'a CodeBlock>) {
    for block in blocks {
        match block {
            Block::CodeBlock(code) => out.push(code),
            Block::BlockQuote { blocks, .. } => collect_code_blocks(blocks, out),
            Block::List(list) => {
                for item in &list.items {
                    collect_code_blocks(&item.blocks, out);
                }
            }
            _ => {}
        }
    }
}

/// A heading entry in the chapter outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Heading level (2 or 3).
    pub level: u8,
    /// Plain heading text.
    pub title: String,
    /// Anchor id, unique within the document.
    pub id: String,
}

/// Block-level node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// ATX or setext heading.
    Heading(Heading),
    /// Paragraph of inline content.
    Paragraph(Vec<Inline>),
    /// Inline content of a tight list item, rendered without `<p>`.
    Plain(Vec<Inline>),
    /// Fenced or indented code block.
    CodeBlock(CodeBlock),
    /// Ordered or bullet list.
    List(List),
    /// GFM table.
    Table(Table),
    /// Block quote, optionally a GFM alert (`> [!NOTE]`).
    BlockQuote {
        /// Alert kind, `None` for a regular quote.
        kind: Option<AlertKind>,
        /// Quoted blocks.
        blocks: Vec<Block>,
    },
    /// Thematic break.
    Rule,
    /// Raw HTML block, passed through verbatim.
    Html(String),
}

/// Heading node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    /// Level 1-6.
    pub level: u8,
    /// Anchor id, unique within the document.
    pub id: String,
    /// Inline content.
    pub content: Vec<Inline>,
}

/// Language tag given to code blocks whose fence has no info string.
pub const PLAIN_LANGUAGE: &str = "plain";

/// Code block node.
///
/// `text` is the verbatim block content; no escaping is applied here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language tag (first word of the fence info string, or `"plain"`).
    pub language: String,
    /// Remaining info string words as `key=value` or bare flags.
    pub attrs: Vec<(String, Option<String>)>,
    /// Raw code text.
    pub text: String,
    /// 1-based source line of the opening fence.
    pub line: usize,
}

impl CodeBlock {
    /// Look up an info string attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }
}

/// List node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct List {
    /// Start number for ordered lists, `None` for bullet lists.
    pub start: Option<u64>,
    /// List items.
    pub items: Vec<ListItem>,
}

/// List item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    /// Task list checkbox state, `None` for plain items.
    pub task: Option<bool>,
    /// Item content.
    pub blocks: Vec<Block>,
}

/// Table node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    /// Column alignments.
    pub alignments: Vec<Alignment>,
    /// Header cells.
    pub head: Vec<Vec<Inline>>,
    /// Body rows of cells.
    pub rows: Vec<Vec<Vec<Inline>>>,
}

/// Table column alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl From<CmarkAlignment> for Alignment {
    fn from(value: CmarkAlignment) -> Self {
        match value {
            CmarkAlignment::None => Self::None,
            CmarkAlignment::Left => Self::Left,
            CmarkAlignment::Center => Self::Center,
            CmarkAlignment::Right => Self::Right,
        }
    }
}

/// GFM alert kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(value: BlockQuoteKind) -> Self {
        match value {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

/// Inline node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
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
    SoftBreak,
    HardBreak,
    Html(String),
}

/// Concatenate the plain text of inline nodes.
#[must_use]
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children)
            | Inline::Link {
                content: children, ..
            } => push_plain_text(children, out),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::Html(_) => {}
        }
    }
}
