//! Code fence helpers.
//!
//! Code fences in `CommonMark` can use backticks or tildes (three or more).
//! The closing fence must use the same character and be at least as long
//! as the opening fence.

use std::ops::Range;

use crate::document::PLAIN_LANGUAGE;

/// Detect if a line starts a code fence.
///
/// Returns the fence character and length if found.
pub(crate) fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    if count >= 3 { Some((first, count)) } else { None }
}

/// Check if a line is a valid closing fence.
///
/// The closing fence must:
/// - Use the same character as opening
/// - Be at least as long as opening
/// - Contain only fence characters (optionally followed by whitespace)
pub(crate) fn is_fence_line(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    let first = match trimmed.chars().next() {
        Some(c) if c == expected_char => c,
        _ => return false,
    };

    let count = trimmed.chars().take_while(|&c| c == first).count();
    if count < min_len {
        return false;
    }

    // After fence chars, only whitespace is allowed
    trimmed[count..].chars().all(char::is_whitespace)
}

/// Container markup in front of an opening fence.
#[derive(Debug, PartialEq, Eq)]
enum Prefix {
    /// A `>` block quote marker with its optional following space.
    Quote,
    /// Columns of list-item or fence indentation.
    Indent(usize),
}

/// Split the text before an opening fence into container markers.
fn container_prefix(prefix: &str) -> Vec<Prefix> {
    let mut parts = Vec::new();
    let mut chars = prefix.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '>' {
            chars.next_if_eq(&' ');
            parts.push(Prefix::Quote);
        } else if let Some(Prefix::Indent(n)) = parts.last_mut() {
            *n += 1;
        } else {
            parts.push(Prefix::Indent(1));
        }
    }
    parts
}

/// Remove the containers of the opening fence from a later line.
///
/// Returns `None` when the line is outside a block quote the fence is in.
fn strip_prefix<'a>(mut line: &'a str, prefix: &[Prefix]) -> Option<&'a str> {
    for part in prefix {
        match part {
            Prefix::Quote => {
                line = strip_spaces(line, 3).strip_prefix('>')?;
                line = line.strip_prefix(' ').unwrap_or(line);
            }
            Prefix::Indent(n) => line = strip_spaces(line, *n),
        }
    }
    Some(line)
}

/// Strip at most `max` leading spaces.
fn strip_spaces(line: &str, max: usize) -> &str {
    let count = line.bytes().take(max).take_while(|&b| b == b' ').count();
    &line[count..]
}

fn is_blank(line: &str) -> bool {
    line.trim_matches(|c: char| c == '>' || c.is_whitespace()).is_empty()
}

/// Check whether a fenced code block ends with a closing fence.
///
/// `span` is the block's byte range in `source`, starting on the opening
/// fence line. Blocks cut off by end of input or by the end of their
/// enclosing container have no closing fence. A closing fence sits inside
/// the same containers as the opening one, indented at most three spaces.
pub(crate) fn has_closing_fence(source: &str, span: Range<usize>) -> bool {
    let line_start = source[..span.start].rfind('\n').map_or(0, |i| i + 1);
    let opening = source[line_start..].lines().next().unwrap_or_default();
    let Some(fence_at) = opening.find(['`', '~']) else {
        return false;
    };
    let Some((fence_char, fence_len)) = detect_fence(&opening[fence_at..]) else {
        return false;
    };
    let prefix = container_prefix(&opening[..fence_at]);

    let mut lines = source[span].lines();
    lines.next();
    lines
        .rfind(|line| !is_blank(line))
        .and_then(|last| strip_prefix(last, &prefix))
        .is_some_and(|last| is_fence_line(strip_spaces(last, 3), fence_char, fence_len))
}

/// Parse a fence info string into language tag and attributes.
///
/// The first word is the language; remaining words are `key=value` pairs
/// (values may be double-quoted) or bare flags. An empty info string yields
/// the `"plain"` language.
pub(crate) fn parse_fence_info(info: &str) -> (String, Vec<(String, Option<String>)>) {
    let mut words = split_info_words(info.trim()).into_iter();
    let language = words
        .next()
        .map_or_else(|| PLAIN_LANGUAGE.to_owned(), |w| w.trim_matches(['{', '}']).to_owned());
    let language = if language.is_empty() {
        PLAIN_LANGUAGE.to_owned()
    } else {
        language
    };

    let attrs = words
        .map(|word| match word.split_once('=') {
            Some((key, value)) => (key.to_owned(), Some(value.trim_matches('"').to_owned())),
            None => (word, None),
        })
        .collect();

    (language, attrs)
}

/// Split on whitespace, keeping double-quoted runs together.
fn split_info_words(info: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in info.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
