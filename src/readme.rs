//! README rendering.
//!
//! Markdown goes through pulldown-cmark with raw HTML escaped rather than
//! passed through. reStructuredText has no renderer here and is shown as
//! escaped preformatted text. Plain text is escaped with line breaks kept.

use pulldown_cmark::{html, Event, Options, Parser};

use crate::models::ReadmeKind;

/// README names tried at the branch root, in order.
pub const CANDIDATES: [(&str, ReadmeKind); 3] = [
    ("README.md", ReadmeKind::Markdown),
    ("README.rst", ReadmeKind::Rst),
    ("README", ReadmeKind::Plain),
];

pub fn render(kind: ReadmeKind, source: &str) -> String {
    match kind {
        ReadmeKind::Markdown => render_markdown(source),
        ReadmeKind::Rst => format!("<pre>{}</pre>", html_escape::encode_safe(source)),
        ReadmeKind::Plain => html_escape::encode_safe(source).replace('\n', "<br/>"),
    }
}

fn render_markdown(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}
