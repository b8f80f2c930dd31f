//! Markdown to HTML rendering for analysis reports.
//!
//! Model output is untrusted. Raw HTML in it is escaped rather than passed
//! through, so the only live markup in a report comes from the Markdown
//! renderer and the badge spans.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::badge::{Badge, BadgeFormatter};

/// Opening tag of the report container.
pub const CONTAINER_OPEN: &str =
    r#"<div class="analysis-report" style="text-align: left; line-height: 1.6; font-size: 16px;">"#;
pub const CONTAINER_CLOSE: &str = "</div>";

/// Rendered report body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Container-wrapped HTML.
    pub html: String,
    pub badges: Vec<Badge>,
}

/// Render model output to HTML with badge spans and wrap it in the container.
pub fn render_report(markdown: &str, formatter: &BadgeFormatter) -> RenderedReport {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut badges = Vec::new();
    let mut events: Vec<Event> = Vec::new();
    let mut pending = String::new();
    // Image alt text only survives as plain text events, so no spans there.
    let mut image_depth = 0usize;

    for event in Parser::new_ext(markdown, options) {
        match event {
            // Text can arrive split across several events; badge lines must be
            // matched on the joined run, including across soft line breaks.
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                pending.push_str(&text);
            }
            Event::SoftBreak => pending.push(if image_depth > 0 { ' ' } else { '\n' }),
            Event::Start(Tag::Image { .. }) => {
                flush_text(&mut pending, &mut events, &mut badges, formatter, image_depth > 0);
                image_depth += 1;
                events.push(event);
            }
            Event::End(TagEnd::Image) => {
                flush_text(&mut pending, &mut events, &mut badges, formatter, true);
                image_depth = image_depth.saturating_sub(1);
                events.push(event);
            }
            other => {
                flush_text(&mut pending, &mut events, &mut badges, formatter, image_depth > 0);
                events.push(other);
            }
        }
    }
    flush_text(&mut pending, &mut events, &mut badges, formatter, false);

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, events.into_iter());

    RenderedReport {
        html: wrap_container(&body),
        badges,
    }
}

/// Wrap already-rendered markup in the report container.
pub fn wrap_container(inner: &str) -> String {
    format!("{}\n{}\n{}", CONTAINER_OPEN, inner.trim_end(), CONTAINER_CLOSE)
}

fn flush_text<'a>(
    pending: &mut String,
    events: &mut Vec<Event<'a>>,
    badges: &mut Vec<Badge>,
    formatter: &BadgeFormatter,
    plain: bool,
) {
    if pending.is_empty() {
        return;
    }
    let text = std::mem::take(pending);
    if plain {
        events.push(Event::Text(CowStr::from(text)));
        return;
    }

    let formatted = formatter.format(&escape_html(&text));
    if formatted.badges.is_empty() {
        // The HTML writer escapes text events itself.
        events.push(Event::Text(CowStr::from(text)));
    } else {
        badges.extend(formatted.badges);
        events.push(Event::Html(CowStr::from(formatted.text)));
    }
}

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
