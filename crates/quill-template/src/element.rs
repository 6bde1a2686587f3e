//! Directive element scanning.
//!
//! Finds `<name ...>body</name>` and `<name .../>` elements in a document.
//! Tag names match ASCII case-insensitively and nested elements of the same
//! name are paired correctly.

use crate::attrs::{Attributes, parse_open_tag};

/// A directive element located in a text.
#[derive(Debug)]
pub(crate) struct Element<'a> {
    /// Byte offset of the opening `<`.
    pub(crate) start: usize,
    /// Byte offset just after the opening tag.
    pub(crate) open_end: usize,
    /// Byte offset just after the whole element.
    pub(crate) end: usize,
    /// Parsed attributes of the opening tag.
    pub(crate) attrs: Attributes,
    /// Inner text, `None` for self-closing tags.
    pub(crate) body: Option<&'a str>,
}

/// Position of an opening tag `<name` with a proper delimiter after the name.
///
/// Returns the offset just past the name.
fn match_open(text: &str, at: usize, name: &str) -> Option<usize> {
    let after_lt = at + 1;
    let name_end = after_lt + name.len();
    let candidate = text.get(after_lt..name_end)?;
    if !candidate.eq_ignore_ascii_case(name) {
        return None;
    }
    match text[name_end..].chars().next() {
        Some(c) if c.is_whitespace() || c == '>' || c == '/' => Some(name_end),
        _ => None,
    }
}

/// Position of a closing tag `</name>` at `at`, returning the offset after `>`.
fn match_close(text: &str, at: usize, name: &str) -> Option<usize> {
    let rest = text.get(at..)?.strip_prefix("</")?;
    let candidate = rest.get(..name.len())?;
    if !candidate.eq_ignore_ascii_case(name) {
        return None;
    }
    let after_name = &rest[name.len()..];
    let trimmed = after_name.trim_start();
    trimmed.starts_with('>').then(|| text.len() - trimmed.len() + 1)
}

/// Find the closing tag matching an element opened before `from`.
///
/// Returns `(close_start, close_end)`.
fn find_close(text: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut pos = from;

    while let Some(rel) = text.get(pos..)?.find('<') {
        let at = pos + rel;
        if let Some(close_end) = match_close(text, at, name) {
            if depth == 0 {
                return Some((at, close_end));
            }
            depth -= 1;
            pos = close_end;
        } else if let Some(name_end) = match_open(text, at, name) {
            match parse_open_tag(text, name_end) {
                Some((_, open_end, self_closing)) => {
                    if !self_closing {
                        depth += 1;
                    }
                    pos = open_end;
                }
                None => pos = name_end,
            }
        } else {
            pos = at + 1;
        }
    }

    None
}

/// Find the first complete `name` element at or after byte offset `from`.
///
/// Opening tags that are never terminated or never closed are skipped.
pub(crate) fn find<'a>(text: &'a str, name: &str, from: usize) -> Option<Element<'a>> {
    let mut pos = from;

    while let Some(rel) = text.get(pos..)?.find('<') {
        let start = pos + rel;
        let Some(name_end) = match_open(text, start, name) else {
            pos = start + 1;
            continue;
        };
        let Some((attrs, open_end, self_closing)) = parse_open_tag(text, name_end) else {
            pos = name_end;
            continue;
        };

        if self_closing {
            return Some(Element {
                start,
                open_end,
                end: open_end,
                attrs,
                body: None,
            });
        }

        match find_close(text, name, open_end) {
            Some((close_start, close_end)) => {
                return Some(Element {
                    start,
                    open_end,
                    end: close_end,
                    attrs,
                    body: Some(&text[open_end..close_start]),
                });
            }
            None => pos = open_end,
        }
    }

    None
}

/// Find the first element that has a body (self-closing tags are skipped).
pub(crate) fn find_block<'a>(text: &'a str, name: &str, from: usize) -> Option<Element<'a>> {
    let mut pos = from;
    while let Some(element) = find(text, name, pos) {
        if element.body.is_some() {
            return Some(element);
        }
        pos = element.end;
    }
    None
}

/// Rewrite every `name` element in `text`.
///
/// `rewrite` returns the replacement for an element, or `None` to keep it
/// verbatim. Scanning resumes after each element, so replacement text is never
/// rescanned.
pub(crate) fn replace_each<E>(
    text: &str,
    name: &str,
    mut rewrite: impl FnMut(&Element<'_>) -> Result<Option<String>, E>,
) -> Result<String, E> {
    let mut output = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(element) = find(text, name, pos) {
        output.push_str(&text[pos..element.start]);
        match rewrite(&element)? {
            Some(replacement) => output.push_str(&replacement),
            None => output.push_str(&text[element.start..element.end]),
        }
        pos = element.end;
    }

    output.push_str(&text[pos..]);
    Ok(output)
}
