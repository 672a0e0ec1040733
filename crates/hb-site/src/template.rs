//! HTML page templates for the generated site.
//!
//! Every chapter page shares one layout: a sidebar listing all chapters
//! with the current one highlighted, the chapter content, an "On this page"
//! panel built from the chapter outline, and a previous/next footer.

use std::fmt::Write;

use hb_renderer::{OutlineEntry, escape_html as escape};

use crate::assets::STYLESHEET_PATH;

/// Sidebar entry.
pub(crate) struct NavItemData<'a> {
    pub title: &'a str,
    pub href: String,
    pub is_active: bool,
}

/// Previous/next footer link.
pub(crate) struct PageLinkData<'a> {
    pub title: &'a str,
    pub href: &'a str,
}

/// All data needed to render a chapter page.
pub(crate) struct PageData<'a> {
    pub book_title: &'a str,
    pub title: &'a str,
    pub html_content: &'a str,
    pub toc: &'a [OutlineEntry],
    pub navigation: &'a [NavItemData<'a>],
    pub prev: Option<PageLinkData<'a>>,
    pub next: Option<PageLinkData<'a>>,
}

/// Table of contents entry on the index page.
pub(crate) struct IndexEntryData<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub href: String,
    pub sections: &'a [OutlineEntry],
}

/// Render a chapter page.
pub(crate) fn render_page(page: &PageData<'_>) -> String {
    let mut html = String::with_capacity(page.html_content.len() + 4096);

    let title = format!("{} - {}", page.title, page.book_title);
    render_head(&mut html, &title);

    html.push_str("<div class=\"layout\">\n");
    render_sidebar(&mut html, page.book_title, page.navigation);

    html.push_str("<div class=\"content\">\n<main>\n<article>\n");
    html.push_str(page.html_content);
    html.push_str("\n</article>\n");
    render_page_nav(&mut html, page.prev.as_ref(), page.next.as_ref());
    html.push_str("</main>\n");

    render_toc(&mut html, page.toc);

    html.push_str("</div>\n</div>\n</body>\n</html>\n");
    html
}

/// Render the book's table of contents page.
pub(crate) fn render_index(
    book_title: &str,
    navigation: &[NavItemData<'_>],
    entries: &[IndexEntryData<'_>],
) -> String {
    let mut html = String::with_capacity(4096);
    render_head(&mut html, book_title);

    html.push_str("<div class=\"layout\">\n");
    render_sidebar(&mut html, book_title, navigation);

    html.push_str("<div class=\"content\">\n<main>\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape(book_title));
    html.push_str("<ol class=\"book-toc\">\n");
    for entry in entries {
        let _ = write!(
            html,
            "<li id=\"chapter-{}\"><a href=\"{}\">{}</a>",
            escape(entry.id),
            escape(&entry.href),
            escape(entry.title),
        );
        let sections: Vec<_> = entry.sections.iter().filter(|s| s.level == 2).collect();
        if !sections.is_empty() {
            html.push_str("\n<ul>\n");
            for section in sections {
                let _ = writeln!(
                    html,
                    "<li><a href=\"{}#{}\">{}</a></li>",
                    escape(&entry.href),
                    escape(&section.id),
                    escape(&section.title),
                );
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ol>\n</main>\n</div>\n</div>\n</body>\n</html>\n");
    html
}

fn render_head(html: &mut String, title: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(title));
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{STYLESHEET_PATH}\">");
    html.push_str("</head>\n<body>\n");
}

fn render_sidebar(html: &mut String, book_title: &str, items: &[NavItemData<'_>]) {
    html.push_str("<aside class=\"sidebar\">\n");
    let _ = writeln!(
        html,
        "<a href=\"index.html\" class=\"book-title\">{}</a>",
        escape(book_title)
    );
    html.push_str("<nav>\n<ol>\n");
    for item in items {
        if item.is_active {
            let _ = writeln!(
                html,
                "<li><a href=\"{}\" class=\"active\" aria-current=\"page\">{}</a></li>",
                escape(&item.href),
                escape(item.title),
            );
        } else {
            let _ = writeln!(
                html,
                "<li><a href=\"{}\">{}</a></li>",
                escape(&item.href),
                escape(item.title),
            );
        }
    }
    html.push_str("</ol>\n</nav>\n</aside>\n");
}

fn render_page_nav(
    html: &mut String,
    prev: Option<&PageLinkData<'_>>,
    next: Option<&PageLinkData<'_>>,
) {
    if prev.is_none() && next.is_none() {
        return;
    }
    html.push_str("<nav class=\"page-nav\">\n");
    if let Some(prev) = prev {
        let _ = writeln!(
            html,
            "<a href=\"{}\" class=\"prev\" rel=\"prev\">&larr; {}</a>",
            escape(prev.href),
            escape(prev.title),
        );
    }
    if let Some(next) = next {
        let _ = writeln!(
            html,
            "<a href=\"{}\" class=\"next\" rel=\"next\">{} &rarr;</a>",
            escape(next.href),
            escape(next.title),
        );
    }
    html.push_str("</nav>\n");
}

fn render_toc(html: &mut String, toc: &[OutlineEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<aside class=\"page-toc\">\n");
    html.push_str("<h3>On this page</h3>\n<ul>\n");
    for entry in toc {
        let _ = writeln!(
            html,
            "<li class=\"level-{}\"><a href=\"#{}\">{}</a></li>",
            entry.level,
            escape(&entry.id),
            escape(&entry.title),
        );
    }
    html.push_str("</ul>\n</aside>\n");
}
