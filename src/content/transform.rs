use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::config::MarkdownConfig;
use crate::content::highlight::{escape_attr, SyntaxHighlighter};
use crate::content::slug::Slugger;
use crate::error::AppError;

/// Id given to headings whose text produces an empty slug.
const FALLBACK_HEADING_ID: &str = "section";

/// One step of the markup transformation chain.
///
/// Steps take the parsed markup as a flat event list and return the
/// rewritten list; they run in the order they were added.
pub trait DocumentTransformer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, AppError>;
}

/// Parser options for document bodies.
///
/// Only structural extensions; prose text is rendered as written.
pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Parse a markup body into events.
pub fn parse(source: &str) -> Vec<Event<'_>> {
    Parser::new_ext(source, markdown_options()).collect()
}

/// Gives every heading a stable id derived from its text.
///
/// Duplicates get numeric suffixes.
#[derive(Debug, Default)]
pub struct HeadingSlugger;

impl DocumentTransformer for HeadingSlugger {
    fn name(&self) -> &'static str {
        "heading-slug"
    }

    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, AppError> {
        let mut slugger = Slugger::new();
        let mut out = Vec::with_capacity(events.len());
        let mut open_heading: Option<usize> = None;
        let mut text = String::new();

        for event in events {
            match &event {
                Event::Start(Tag::Heading { .. }) => {
                    open_heading = Some(out.len());
                    text.clear();
                }
                Event::Text(t) | Event::Code(t) if open_heading.is_some() => text.push_str(t),
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(index) = open_heading.take() {
                        if let Event::Start(Tag::Heading { id, .. }) = &mut out[index] {
                            if id.is_none() {
                                let mut slug = slugger.slug(&text);
                                if slug.is_empty() {
                                    slug = slugger.reserve(FALLBACK_HEADING_ID.to_string());
                                }
                                *id = Some(CowStr::from(slug));
                            }
                        }
                    }
                }
                _ => {}
            }
            out.push(event);
        }

        Ok(out)
    }
}

/// Replaces code blocks with syntax-highlighted HTML.
pub struct CodeHighlighter {
    highlighter: SyntaxHighlighter,
}

impl CodeHighlighter {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            highlighter: SyntaxHighlighter::new(theme),
        }
    }
}

impl DocumentTransformer for CodeHighlighter {
    fn name(&self) -> &'static str {
        "code-highlight"
    }

    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, AppError> {
        let mut out = Vec::with_capacity(events.len());
        // (language, collected code) of the block being read
        let mut block: Option<(Option<String>, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|l| l.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    block = Some((lang, String::new()));
                }
                Event::Text(t) if block.is_some() => {
                    if let Some((_, code)) = block.as_mut() {
                        code.push_str(&t);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = block.take() {
                        let html = self.highlighter.highlight(&code, lang.as_deref())?;
                        out.push(Event::Html(CowStr::from(html)));
                    }
                }
                other => out.push(other),
            }
        }

        Ok(out)
    }
}

/// Wraps the content of every heading in a link to the heading itself.
pub struct HeadingAutolinker {
    class: String,
    aria_label: String,
}

impl HeadingAutolinker {
    pub fn new(class: impl Into<String>, aria_label: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            aria_label: aria_label.into(),
        }
    }

    fn open_tag(&self, id: &str) -> String {
        format!(
            "<a class=\"{}\" aria-label=\"{}\" href=\"#{}\">",
            escape_attr(&self.class),
            escape_attr(&self.aria_label),
            escape_attr(id)
        )
    }
}

impl DocumentTransformer for HeadingAutolinker {
    fn name(&self) -> &'static str {
        "heading-autolink"
    }

    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, AppError> {
        let mut out = Vec::with_capacity(events.len() + 8);
        let mut wrapped = false;

        for event in events {
            match &event {
                Event::Start(Tag::Heading { id, .. }) => {
                    let anchor = id.as_ref().map(|id| self.open_tag(id));
                    out.push(event);
                    wrapped = anchor.is_some();
                    if let Some(anchor) = anchor {
                        out.push(Event::InlineHtml(CowStr::from(anchor)));
                    }
                }
                Event::End(TagEnd::Heading(_)) => {
                    if wrapped {
                        out.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
                        wrapped = false;
                    }
                    out.push(event);
                }
                _ => out.push(event),
            }
        }

        Ok(out)
    }
}

/// Ordered transformation chain applied to every document body.
///
/// `prose` steps run first (none are configured by default), then the
/// `html` steps.
#[derive(Default)]
pub struct MarkdownPipeline {
    prose: Vec<Box<dyn DocumentTransformer>>,
    html: Vec<Box<dyn DocumentTransformer>>,
}

impl MarkdownPipeline {
    /// An empty pipeline: plain rendering.
    pub fn new() -> Self {
        Self::default()
    }

    /// The site chain: heading ids, code highlighting, heading self-links.
    pub fn from_config(config: &MarkdownConfig) -> Self {
        Self::new()
            .with_html_step(HeadingSlugger)
            .with_html_step(CodeHighlighter::new(config.theme.clone()))
            .with_html_step(HeadingAutolinker::new(
                config.autolink.class.clone(),
                config.autolink.aria_label.clone(),
            ))
    }

    pub fn with_prose_step(mut self, step: impl DocumentTransformer + 'static) -> Self {
        self.prose.push(Box::new(step));
        self
    }

    pub fn with_html_step(mut self, step: impl DocumentTransformer + 'static) -> Self {
        self.html.push(Box::new(step));
        self
    }

    /// Names of all steps, in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.prose
            .iter()
            .chain(self.html.iter())
            .map(|s| s.name())
            .collect()
    }

    /// Run every step over `events`.
    pub fn apply<'a>(&self, mut events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, AppError> {
        for step in self.prose.iter().chain(self.html.iter()) {
            events = step.transform(events)?;
            tracing::trace!("Applied markup step '{}'", step.name());
        }
        Ok(events)
    }

    /// Transform parsed events and render them to HTML.
    pub fn render_events(&self, events: Vec<Event<'_>>) -> Result<String, AppError> {
        let events = self.apply(events)?;
        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        Ok(html_output)
    }

    /// Parse, transform and render a markup body.
    pub fn render(&self, source: &str) -> Result<String, AppError> {
        self.render_events(parse(source))
    }
}
