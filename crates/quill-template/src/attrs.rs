//! Directive tag attribute parsing.
//!
//! Parses the attribute list of an opening tag such as
//! `<include src="card.html" title='Hello' wide>`.

/// Attributes of a directive tag, in source order.
///
/// # Example
///
/// ```ignore
/// let (attrs, end, self_closing) = parse_open_tag(r#"<include src="a.html" title='Hi'/>"#, 8).unwrap();
/// assert_eq!(attrs.get("src"), Some("a.html"));
/// assert_eq!(attrs.get("title"), Some("Hi"));
/// assert!(self_closing);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Attributes {
    items: Vec<(String, String)>,
}

impl Attributes {
    /// Get an attribute value by name.
    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate attributes in source order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.items.iter_mut().find(|(key, _)| key == name) {
            value.clone_into(&mut slot.1);
        } else {
            self.items.push((name.to_owned(), value.to_owned()));
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':')
}

/// Parse attributes of an opening tag starting at byte offset `pos` (just after the tag name).
///
/// Returns the attributes, the byte offset after the closing `>` and whether
/// the tag is self-closing, or `None` if the tag is never terminated.
///
/// Supports `key="value"`, `key='value'`, `key=value` and bare `key`.
pub(crate) fn parse_open_tag(text: &str, pos: usize) -> Option<(Attributes, usize, bool)> {
    let mut attrs = Attributes::default();
    let mut rest = text.get(pos..)?;

    loop {
        rest = rest.trim_start();
        let offset = text.len() - rest.len();
        let c = rest.chars().next()?;

        if c == '>' {
            return Some((attrs, offset + 1, false));
        }
        if rest.starts_with("/>") {
            return Some((attrs, offset + 2, true));
        }

        if is_name_char(c) {
            let name_end = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
            let name = &rest[..name_end];
            let after_name = rest[name_end..].trim_start();

            if let Some(after_eq) = after_name.strip_prefix('=') {
                let (value, remaining) = parse_value(after_eq.trim_start())?;
                attrs.insert(name, value);
                rest = remaining;
            } else {
                attrs.insert(name, "");
                rest = after_name;
            }
        } else {
            // Skip unrecognized character
            rest = &rest[c.len_utf8()..];
        }
    }
}

/// Parse an attribute value, returning it and the remaining text.
fn parse_value(s: &str) -> Option<(&str, &str)> {
    if let Some(stripped) = s.strip_prefix('"') {
        let end_quote = stripped.find('"')?;
        Some((&stripped[..end_quote], &stripped[end_quote + 1..]))
    } else if let Some(stripped) = s.strip_prefix('\'') {
        let end_quote = stripped.find('\'')?;
        Some((&stripped[..end_quote], &stripped[end_quote + 1..]))
    } else {
        // Unquoted value (until whitespace or tag end)
        let end = s
            .find(|c: char| c.is_whitespace() || c == '>')
            .unwrap_or(s.len());
        let end = if s[..end].ends_with('/') && s[end..].starts_with('>') {
            end - 1
        } else {
            end
        };
        Some((&s[..end], &s[end..]))
    }
}
