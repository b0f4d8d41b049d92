//! Markdown to HTML conversion.
//!
//! Fenced code blocks are handed to a [`CodeBlockProcessor`] so a syntax
//! highlighter can be plugged in without touching the parser.

use maud::html;
use pulldown_cmark::{
    CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html,
};
use std::borrow::Cow;

/// Renders the contents of a fenced or indented code block.
pub trait CodeBlockProcessor: Sync {
    /// `language` is the first word of the fence info string, if any.
    fn render(&self, language: Option<&str>, code: &str) -> String;
}

/// `<pre><code class="language-x">` with the code escaped, no highlighting.
pub struct PlainCodeBlocks;

impl CodeBlockProcessor for PlainCodeBlocks {
    fn render(&self, language: Option<&str>, code: &str) -> String {
        let class = language.map(|lang| format!("language-{lang}"));
        html! {
            pre { code class=[class] { (code) } }
        }
        .into_string()
    }
}

/// A converted markdown body.
#[derive(Debug, Clone, Default)]
pub struct Markdown {
    pub html: String,
    /// Whitespace-collapsed text outside code blocks.
    pub text: String,
    /// Text of the first level-one heading.
    pub first_heading: Option<String>,
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Convert `source` to an HTML fragment.
pub fn render(source: &str, code_blocks: &dyn CodeBlockProcessor) -> Markdown {
    convert(source, code_blocks, false)
}

/// Like [`render`], for a body whose first level-one heading is its title:
/// that heading is left out of `html`.
pub fn render_untitled(source: &str, code_blocks: &dyn CodeBlockProcessor) -> Markdown {
    convert(source, code_blocks, true)
}

fn convert(source: &str, code_blocks: &dyn CodeBlockProcessor, strip_heading: bool) -> Markdown {
    let mut events = Vec::new();
    let mut text = TextCollector::default();
    let mut first_heading = None;
    let mut heading: Option<String> = None;
    let mut heading_start = None;
    let mut heading_span = None;
    let mut code: Option<(Option<String>, String)> = None;

    for event in Parser::new_ext(source, options()) {
        if code.is_some() {
            match event {
                Event::Text(t) => {
                    if let Some((_, buf)) = &mut code {
                        buf.push_str(&t);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, buf)) = code.take() {
                        let rendered = code_blocks.render(lang.as_deref(), &buf);
                        events.push(Event::Html(rendered.into()));
                    }
                }
                _ => {}
            }
            continue;
        }

        if is_block_break(&event) {
            text.space();
        }

        match &event {
            Event::Start(Tag::CodeBlock(kind)) => {
                code = Some((language(kind), String::new()));
                text.space();
                continue;
            }
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if first_heading.is_none() => {
                heading = Some(String::new());
                heading_start = Some(events.len());
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                if let Some(done) = heading.take() {
                    first_heading = Some(done.trim().to_owned());
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some(h) = &mut heading {
                    h.push_str(t);
                }
                text.push(t);
            }
            _ => {}
        }
        events.push(event);

        if first_heading.is_some()
            && let Some(start) = heading_start.take()
        {
            heading_span = Some(start..events.len());
        }
    }

    if strip_heading && let Some(span) = heading_span {
        events.drain(span);
    }

    let mut html = String::with_capacity(source.len() * 3 / 2);
    md_html::push_html(&mut html, events.into_iter());

    Markdown {
        html,
        text: text.finish(),
        first_heading,
    }
}

/// First `max_chars` characters of `text`, cut back to a word boundary
/// and ending in `…` when shortened.
pub fn excerpt(text: &str, max_chars: usize) -> Cow<'_, str> {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return Cow::Borrowed(text);
    };
    let head = &text[..cut];
    let head = match head.rfind(char::is_whitespace) {
        Some(space) if space > 0 => &head[..space],
        _ => head,
    };
    Cow::Owned(format!("{}…", head.trim_end()))
}

fn is_block_break(event: &Event<'_>) -> bool {
    matches!(
        event,
        Event::SoftBreak
            | Event::HardBreak
            | Event::End(
                TagEnd::Paragraph
                    | TagEnd::Heading(_)
                    | TagEnd::Item
                    | TagEnd::TableCell
                    | TagEnd::BlockQuote(_)
                    | TagEnd::List(_)
            )
    )
}

fn language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info
            .split_whitespace()
            .next()
            .map(|lang| lang.trim_matches(|c| c == '{' || c == '}' || c == '.'))
            .filter(|lang| !lang.is_empty())
            .map(str::to_owned),
        CodeBlockKind::Indented => None,
    }
}

/// Accumulates plain text, collapsing whitespace runs to one space.
#[derive(Default)]
struct TextCollector {
    buf: String,
    pending_space: bool,
}

impl TextCollector {
    fn push(&mut self, text: &str) {
        for word in text.split_whitespace() {
            if (self.pending_space || text.starts_with(char::is_whitespace)) && !self.buf.is_empty()
            {
                self.buf.push(' ');
            }
            self.pending_space = true;
            self.buf.push_str(word);
        }
        self.pending_space = text.ends_with(char::is_whitespace);
    }

    fn space(&mut self) {
        self.pending_space = true;
    }

    fn finish(self) -> String {
        self.buf
    }
}
