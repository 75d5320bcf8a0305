//! Markdown to HTML rendering.
//!
//! Thin wrapper over pulldown-cmark with GFM extensions enabled. The first
//! H1 heading is captured as the document title but still rendered into
//! the body.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

/// Rendered document fragment.
#[derive(Debug)]
pub struct Rendered {
    /// HTML body fragment.
    pub html: String,
    /// Text of the first H1 heading, if any.
    pub title: Option<String>,
}

/// Render markdown into an HTML fragment, capturing the first H1.
#[must_use]
pub fn render_markdown(markdown: &str) -> Rendered {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM;

    let mut title: Option<String> = None;
    let mut in_first_h1 = false;
    let events: Vec<Event<'_>> = Parser::new_ext(markdown, options)
        .inspect(|event| match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if title.is_none() => {
                in_first_h1 = true;
                title = Some(String::new());
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                in_first_h1 = false;
            }
            Event::Text(text) | Event::Code(text) if in_first_h1 => {
                if let Some(t) = title.as_mut() {
                    t.push_str(text);
                }
            }
            _ => {}
        })
        .collect();

    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, events.into_iter());

    Rendered {
        html: out,
        title: title.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_first_h1_becomes_title_and_stays_in_body() {
        let rendered = render_markdown("# Getting Started\n\nHello.\n\n# Second");
        assert_eq!(rendered.title.as_deref(), Some("Getting Started"));
        assert!(rendered.html.contains("<h1>Getting Started</h1>"));
        assert!(rendered.html.contains("<h1>Second</h1>"));
    }

    #[test]
    fn test_no_h1_yields_no_title() {
        let rendered = render_markdown("## Only a subheading");
        assert_eq!(rendered.title, None);
    }

    #[test]
    fn test_title_with_inline_code() {
        let rendered = render_markdown("# Using `mdsite`\n");
        assert_eq!(rendered.title.as_deref(), Some("Using mdsite"));
    }

    #[test]
    fn test_gfm_table_renders() {
        let rendered = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(rendered.html.contains("<table>"));
    }
}
