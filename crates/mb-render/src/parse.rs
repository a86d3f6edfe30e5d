//! The markdown parse capability and its default pulldown-cmark backend.
//!
//! [`MarkdownParser`] is the narrow interface the rendering service
//! consumes: `(text, options) -> html`, with the composed renderer
//! supplying the formatting of each construct. The trait is an explicit
//! injected dependency — there is no ambient fallback lookup; a service
//! cannot be built without one.
//!
//! [`CmarkParser`] is the default backend. It walks the pulldown-cmark
//! event stream with a stack of buffers, one per open construct, and calls
//! the matching [`ComposedRenderer`] method when the construct closes.
//! Tables, task-list markers and raw HTML passthrough are rendered
//! generically and are not part of the overridable method set.

use std::collections::HashMap;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::escape::escape_html;
use crate::options::RenderOptions;
use crate::renderer::ComposedRenderer;

/// Error raised by a parse backend.
///
/// The default backend never faults; the variant exists for backends with
/// internal failure modes and for fault injection in tests. The rendering
/// service collapses it to empty output, it never reaches callers.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Internal parser fault (malformed input or formatting failure).
    #[error("parser fault: {0}")]
    Fault(String),
}

/// The opaque markdown parse capability.
pub trait MarkdownParser: Send + Sync {
    /// Parse `text` into an HTML fragment under the given options, using
    /// `renderer` to format each construct.
    fn parse(
        &self,
        text: &str,
        options: &RenderOptions,
        renderer: &ComposedRenderer,
    ) -> Result<String, ParseError>;
}

/// Default parse backend over pulldown-cmark.
#[derive(Clone, Copy, Debug, Default)]
pub struct CmarkParser;

impl CmarkParser {
    /// Map the resolved options onto pulldown-cmark parser extensions.
    #[must_use]
    pub fn parser_options(options: &RenderOptions) -> Options {
        if options.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }
}

impl MarkdownParser for CmarkParser {
    fn parse(
        &self,
        text: &str,
        options: &RenderOptions,
        renderer: &ComposedRenderer,
    ) -> Result<String, ParseError> {
        let parser = Parser::new_ext(text, Self::parser_options(options));
        let mut walker = Walker::new(options, renderer);
        for event in parser {
            walker.event(event);
        }
        Ok(walker.finish())
    }
}

/// One open construct: rendered children accumulate in `html`, their plain
/// text in `text` (used for heading slugs and image alt text).
struct Frame {
    kind: FrameKind,
    html: String,
    text: String,
}

enum FrameKind {
    Document,
    Paragraph,
    Heading(u8),
    Blockquote,
    /// Fenced or indented code; `text` holds the raw source.
    CodeBlock(Option<String>),
    List {
        ordered: bool,
        start: Option<u64>,
    },
    Item,
    Emphasis,
    Strong,
    Strikethrough,
    Link {
        href: String,
        title: Option<String>,
    },
    /// Children render into alt text only.
    Image {
        src: String,
        title: Option<String>,
    },
    Table,
    TableHead,
    TableRow,
    TableCell,
    /// Unsupported construct; children splice into the parent unchanged.
    Passthrough,
}

struct Walker<'a> {
    opts: &'a RenderOptions,
    renderer: &'a ComposedRenderer,
    frames: Vec<Frame>,
    /// Heading slug occurrence counts for `-1`/`-2` deduplication.
    slugs: HashMap<String, usize>,
    alignments: Vec<Alignment>,
    cell_index: usize,
    in_table_head: bool,
}

impl<'a> Walker<'a> {
    fn new(opts: &'a RenderOptions, renderer: &'a ComposedRenderer) -> Self {
        Self {
            opts,
            renderer,
            frames: vec![Frame::new(FrameKind::Document)],
            slugs: HashMap::new(),
            alignments: Vec::new(),
            cell_index: 0,
            in_table_head: false,
        }
    }

    fn finish(mut self) -> String {
        debug_assert_eq!(self.frames.len(), 1, "unbalanced construct frames");
        self.frames.pop().map(|frame| frame.html).unwrap_or_default()
    }

    fn top(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("document frame always present")
    }

    fn push(&mut self, kind: FrameKind) {
        self.frames.push(Frame::new(kind));
    }

    /// Close the top construct: render it and append to the parent.
    fn pop(&mut self) {
        let frame = self.frames.pop().expect("pop matches a prior push");
        let rendered = self.render_frame(&frame);
        let parent = self.top();
        parent.html.push_str(&rendered);
        parent.text.push_str(&frame.text);
    }

    fn render_frame(&mut self, frame: &Frame) -> String {
        let opts = self.opts;
        match &frame.kind {
            FrameKind::Document => frame.html.clone(),
            FrameKind::Paragraph => self.renderer.paragraph(opts, &frame.html),
            FrameKind::Heading(level) => {
                let slug = opts
                    .header_ids
                    .then(|| self.dedup_slug(&slugify(&frame.text)));
                self.renderer
                    .heading(opts, frame.html.trim(), *level, slug.as_deref())
            }
            FrameKind::Blockquote => self.renderer.blockquote(opts, &frame.html),
            FrameKind::CodeBlock(lang) => self.renderer.code(opts, &frame.text, lang.as_deref()),
            FrameKind::List { ordered, start } => {
                self.renderer.list(opts, &frame.html, *ordered, *start)
            }
            FrameKind::Item => self.renderer.list_item(opts, &frame.html),
            FrameKind::Emphasis => self.renderer.emphasis(opts, &frame.html),
            FrameKind::Strong => self.renderer.strong(opts, &frame.html),
            FrameKind::Strikethrough => self.renderer.strikethrough(opts, &frame.html),
            FrameKind::Link { href, title } => {
                self.renderer
                    .link(opts, href, title.as_deref(), &frame.html)
            }
            FrameKind::Image { src, title } => {
                self.renderer.image(opts, src, title.as_deref(), &frame.text)
            }
            FrameKind::Table => format!("<table>{}</tbody></table>", frame.html),
            FrameKind::TableHead => {
                format!("<thead><tr>{}</tr></thead><tbody>", frame.html)
            }
            FrameKind::TableRow => format!("<tr>{}</tr>", frame.html),
            FrameKind::TableCell => {
                let tag = if self.in_table_head { "th" } else { "td" };
                let align = self.alignment_style();
                format!("<{tag}{align}>{}</{tag}>", frame.html)
            }
            FrameKind::Passthrough => frame.html.clone(),
        }
    }

    fn alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align: left""#,
            Some(Alignment::Center) => r#" style="text-align: center""#,
            Some(Alignment::Right) => r#" style="text-align: right""#,
            _ => "",
        }
    }

    fn dedup_slug(&mut self, slug: &str) -> String {
        let count = self.slugs.entry(slug.to_owned()).or_insert(0);
        let unique = if *count == 0 {
            slug.to_owned()
        } else {
            format!("{slug}-{count}")
        };
        *count += 1;
        unique
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.top().html.push_str(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => {
                self.top().html.push_str("<br>");
                self.top().text.push(' ');
            }
            Event::Rule => {
                let rule = self.renderer.horizontal_rule(self.opts);
                self.top().html.push_str(&rule);
            }
            Event::TaskListMarker(checked) => {
                self.top().html.push_str(if checked {
                    r#"<input type="checkbox" checked disabled>"#
                } else {
                    r#"<input type="checkbox" disabled>"#
                });
            }
            // Footnotes and math are not enabled.
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.push(FrameKind::Paragraph),
            Tag::Heading { level, .. } => {
                self.push(FrameKind::Heading(heading_level_to_num(level)));
            }
            Tag::BlockQuote(_) => self.push(FrameKind::Blockquote),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) if !info.is_empty() => {
                        // Fence info may carry attributes after the language.
                        info.split_whitespace().next().map(str::to_owned)
                    }
                    _ => None,
                };
                self.push(FrameKind::CodeBlock(lang));
            }
            Tag::List(start) => self.push(FrameKind::List {
                ordered: start.is_some(),
                start,
            }),
            Tag::Item => self.push(FrameKind::Item),
            Tag::Emphasis => self.push(FrameKind::Emphasis),
            Tag::Strong => self.push(FrameKind::Strong),
            Tag::Strikethrough => self.push(FrameKind::Strikethrough),
            Tag::Link {
                dest_url, title, ..
            } => self.push(FrameKind::Link {
                href: dest_url.into_string(),
                title: (!title.is_empty()).then(|| title.into_string()),
            }),
            Tag::Image {
                dest_url, title, ..
            } => self.push(FrameKind::Image {
                src: dest_url.into_string(),
                title: (!title.is_empty()).then(|| title.into_string()),
            }),
            Tag::Table(alignments) => {
                self.alignments = alignments;
                self.push(FrameKind::Table);
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                self.push(FrameKind::TableHead);
            }
            Tag::TableRow => {
                self.cell_index = 0;
                self.push(FrameKind::TableRow);
            }
            Tag::TableCell => self.push(FrameKind::TableCell),
            _ => self.push(FrameKind::Passthrough),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::TableHead => {
                self.pop();
                self.in_table_head = false;
            }
            TagEnd::TableCell => {
                self.pop();
                self.cell_index += 1;
            }
            _ => self.pop(),
        }
    }

    fn text(&mut self, text: &str) {
        let frame = self.top();
        match frame.kind {
            // Code source and image alt text stay unescaped; the renderer
            // method escapes on output.
            FrameKind::CodeBlock(_) | FrameKind::Image { .. } => frame.text.push_str(text),
            _ => {
                frame.text.push_str(text);
                frame.html.push_str(&escape_html(text));
            }
        }
    }

    fn inline_code(&mut self, code: &str) {
        let rendered = self.renderer.codespan(self.opts, code);
        let frame = self.top();
        frame.text.push_str(code);
        if matches!(frame.kind, FrameKind::Image { .. }) {
            return;
        }
        frame.html.push_str(&rendered);
    }

    fn soft_break(&mut self) {
        let breaks = self.opts.breaks;
        let frame = self.top();
        match frame.kind {
            FrameKind::CodeBlock(_) => frame.text.push('\n'),
            _ => {
                frame.text.push(' ');
                frame.html.push_str(if breaks { "<br>" } else { "\n" });
            }
        }
    }
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            html: String::new(),
            text: String::new(),
        }
    }
}

/// Slugify heading text: lowercase alphanumerics, runs of anything else
/// collapse to a single `-`.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn heading_level_to_num(level: pulldown_cmark::HeadingLevel) -> u8 {
    use pulldown_cmark::HeadingLevel;
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
