//! Heading discovery shared by the renderer and the TOC extractor.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::slug::Slugger;

/// Parser options used for all Markdown in this crate.
pub(crate) fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Parse Markdown into an owned event list.
pub(crate) fn parse(markdown: &str) -> Vec<Event<'_>> {
    Parser::new_ext(markdown, options()).collect()
}

/// A heading found in the event stream.
#[derive(Debug)]
pub(crate) struct Heading {
    /// Index of the `Start(Heading)` event.
    pub(crate) index: usize,
    /// Heading level (1-6).
    pub(crate) level: u8,
    /// Plain heading text.
    pub(crate) text: String,
    /// Unique anchor slug.
    pub(crate) slug: String,
    /// Number of earlier headings with the same base slug.
    pub(crate) seen: usize,
}

/// Collect headings in document order, assigning unique slugs.
pub(crate) fn collect(events: &[Event<'_>]) -> Vec<Heading> {
    let mut slugger = Slugger::default();
    let mut headings = Vec::new();
    let mut current: Option<(usize, u8, String)> = None;

    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((index, heading_level_to_num(*level), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, buf)) = current.as_mut() {
                    buf.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((index, level, text)) = current.take() {
                    let text = text.trim().to_owned();
                    let (slug, seen) = slugger.unique(&text);
                    headings.push(Heading {
                        index,
                        level,
                        text,
                        slug,
                        seen,
                    });
                }
            }
            _ => {}
        }
    }

    headings
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
