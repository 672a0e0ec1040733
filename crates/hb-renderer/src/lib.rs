//! Markdown chapter parser and HTML renderer.
//!
//! Chapters go through two pure stages:
//!
//! 1. [`parse`] turns Markdown into a [`Document`], an ordered tree of
//!    [`Block`] nodes. Fenced code blocks keep their language tag (`"plain"`
//!    when the fence has none) and their verbatim text.
//! 2. [`HtmlRenderer`] turns a [`Document`] into HTML. Code blocks become
//!    `<pre data-lang="L"><code class="language-L">` so a client-side
//!    highlighter can pick them up; adjacent blocks in different languages
//!    are grouped into a side-by-side comparison panel.
//!
//! [`extract_code_blocks`] is the inverse of code block rendering and
//! recovers the original code text from the HTML.
//!
//! # Example
//!
//! ```
//! use hb_renderer::{HtmlRenderer, extract_code_blocks, parse};
//!
//! let markdown = "# Loops\n\n```python\nfor x in xs:\n    print(x)\n```\n\n```javascript\nfor (const x of xs) console.log(x);\n```\n";
//! let doc = parse(markdown).unwrap();
//! let rendered = HtmlRenderer::new().render(&doc);
//!
//! assert_eq!(rendered.title.as_deref(), Some("Loops"));
//! let code = extract_code_blocks(&rendered.html);
//! assert_eq!(code[0].language, "python");
//! assert_eq!(code[1].language, "javascript");
//! ```

mod document;
mod error;
mod fence;
mod html;
mod links;
mod parser;
mod util;

pub use document::{
    AlertKind, Alignment, Block, CodeBlock, Document, Heading, Inline, List, ListItem,
    OutlineEntry, PLAIN_LANGUAGE, Table, plain_text,
};
pub use error::ParseError;
pub use html::{ExtractedCode, HtmlRenderer, RenderedDocument, extract_code_blocks};
pub use links::{LinkMap, LinkTarget};
pub use parser::{MarkdownParser, parse};
pub use util::{escape_html, slugify};
