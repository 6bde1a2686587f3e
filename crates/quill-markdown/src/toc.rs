//! Table of contents extraction.

use serde::Serialize;

use crate::heading;

/// One heading in the table of contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading text.
    pub content: String,
    /// Anchor slug, identical to the rendered heading `id`.
    pub slug: String,
    /// Heading level (1-6).
    pub lvl: u8,
    /// Position of the heading in the document.
    pub i: usize,
    /// Number of earlier headings sharing the same base slug.
    pub seen: usize,
}

/// Extracted table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toc {
    /// Headings in document order.
    pub entries: Vec<TocEntry>,
    /// Nested Markdown list linking to every heading.
    pub markdown: String,
}

/// Extract the table of contents from Markdown.
///
/// The rendered list is indented two spaces per level below the shallowest
/// heading in the document.
#[must_use]
pub fn toc(markdown: &str) -> Toc {
    let events = heading::parse(markdown);
    let entries: Vec<TocEntry> = heading::collect(&events)
        .into_iter()
        .enumerate()
        .map(|(i, h)| TocEntry {
            content: h.text,
            slug: h.slug,
            lvl: h.level,
            i,
            seen: h.seen,
        })
        .collect();

    let min_level = entries.iter().map(|e| e.lvl).min().unwrap_or(1);
    let markdown = entries
        .iter()
        .map(|e| {
            let indent = "  ".repeat(usize::from(e.lvl - min_level));
            format!("{indent}- [{}](#{})", e.content, e.slug)
        })
        .collect::<Vec<_>>()
        .join("\n");

    Toc { entries, markdown }
}
