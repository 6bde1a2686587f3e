use pulldown_cmark::{CowStr, Event, Tag, html};

use crate::heading;

/// Render Markdown to HTML.
///
/// Tables are enabled and every heading gets an `id` attribute matching the
/// slug reported by [`crate::toc`], so TOC links resolve.
#[must_use]
pub fn render(markdown: &str) -> String {
    let mut events = heading::parse(markdown);

    for found in heading::collect(&events) {
        if let Some(Event::Start(Tag::Heading { id, .. })) = events.get_mut(found.index) {
            *id = Some(CowStr::from(found.slug));
        }
    }

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_paragraph() {
        assert_eq!(render("Hello *world*"), "<p>Hello <em>world</em></p>\n");
    }

    #[test]
    fn test_render_heading_ids() {
        let html = render("# Getting Started\n\n## FAQ\n\n## FAQ");

        assert!(html.contains(r#"<h1 id="getting-started">Getting Started</h1>"#));
        assert!(html.contains(r#"<h2 id="faq">FAQ</h2>"#));
        assert!(html.contains(r#"<h2 id="faq-1">FAQ</h2>"#));
    }

    #[test]
    fn test_render_table() {
        let html = render("| A | B |\n|---|---|\n| 1 | 2 |");

        assert!(html.contains("<table>"));
        assert!(html.contains("<th>A</th>"));
        assert!(html.contains("<td>2</td>"));
    }

    #[test]
    fn test_render_passes_inline_html() {
        let html = render("<include src=\"card.html\"/>\n\ntext");

        assert!(html.contains("<include src=\"card.html\"/>"));
    }
}
