//! Shared utility functions for parsing and rendering.

use std::collections::HashMap;

use pulldown_cmark::HeadingLevel;

/// Escape HTML special characters.
///
/// # Examples
///
/// ```
/// use hb_renderer::escape_html;
///
/// assert_eq!(escape_html("a < b && c"), "a &lt; b &amp;&amp; c");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Convert text into a URL-safe anchor slug.
///
/// Lowercases, keeps alphanumerics, and collapses every other run of
/// characters into a single `-`. Returns `"section"` when nothing is left.
///
/// # Examples
///
/// ```
/// use hb_renderer::slugify;
///
/// assert_eq!(slugify("List Comprehensions"), "list-comprehensions");
/// assert_eq!(slugify("`for` vs. `forEach()`"), "for-vs-foreach");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "section".to_owned()
    } else {
        slug
    }
}

/// Hands out unique slugs, suffixing repeats with `-1`, `-2`, ...
#[derive(Debug, Default)]
pub(crate) struct UniqueSlugs {
    seen: HashMap<String, usize>,
}

impl UniqueSlugs {
    pub(crate) fn next(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        slug
    }
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Maps byte offsets to 1-based line numbers.
pub(crate) struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    pub(crate) fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_special_characters() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("\"hello\""), "&quot;hello&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Loops"), "loops");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
        assert_eq!(slugify("Async/Await"), "async-await");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify("!!!"), "section");
        assert_eq!(slugify(""), "section");
    }

    #[test]
    fn test_slugify_unicode() {
        assert_eq!(slugify("Ünïcode Strings"), "ünïcode-strings");
    }

    #[test]
    fn test_unique_slugs_suffixes_repeats() {
        let mut slugs = UniqueSlugs::default();
        assert_eq!(slugs.next("FAQ"), "faq");
        assert_eq!(slugs.next("FAQ"), "faq-1");
        assert_eq!(slugs.next("Other"), "other");
        assert_eq!(slugs.next("faq"), "faq-2");
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("one\ntwo\n\nfour");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 1);
        assert_eq!(index.line_of(4), 2);
        assert_eq!(index.line_of(8), 3);
        assert_eq!(index.line_of(9), 4);
        assert_eq!(index.line_of(12), 4);
    }
}
