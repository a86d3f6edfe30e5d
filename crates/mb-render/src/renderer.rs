//! Typed renderer-method overrides and build-time composition.
//!
//! The formatting of each markdown construct is a named method on
//! [`ComposedRenderer`]. Callers customize output by registering
//! replacements for a closed set of methods via [`RendererOverrides`];
//! methods without an override use the default HTML5 implementation.
//!
//! Composition happens once, when a service is built. After substitution
//! the `code` and `codespan` methods are additionally wrapped so their
//! output is enclosed in an inert container (see [`NON_BINDABLE_ATTR`])
//! that the host UI framework must not reinterpret as template syntax.
//! The wrap is unconditional: it applies to caller-supplied overrides too,
//! since rendered code routinely contains sequences a template interpreter
//! would try to evaluate.

use std::fmt;
use std::fmt::Write;
use std::sync::Arc;

use crate::escape::escape_html;
use crate::options::RenderOptions;

/// Marker attribute on the inert wrapper element.
///
/// The host framework treats a subtree carrying this attribute as opaque
/// text, never as template syntax.
pub const NON_BINDABLE_ATTR: &str = "data-non-bindable";

/// Enclose rendered markup in the inert wrapper element.
#[must_use]
pub fn wrap_non_bindable(html: &str) -> String {
    format!("<span {NON_BINDABLE_ATTR}>{html}</span>")
}

/// Heading method: `(options, inner html, level 1-6, slug id)`.
pub type HeadingFn = Arc<dyn Fn(&RenderOptions, &str, u8, Option<&str>) -> String + Send + Sync>;
/// Single-argument container method: `(options, inner html)`.
///
/// Shared shape for paragraph, blockquote, list item and the inline span
/// methods (emphasis, strong, strikethrough).
pub type SpanFn = Arc<dyn Fn(&RenderOptions, &str) -> String + Send + Sync>;
/// List method: `(options, inner html, ordered, start number)`.
pub type ListFn = Arc<dyn Fn(&RenderOptions, &str, bool, Option<u64>) -> String + Send + Sync>;
/// Fenced/indented code block method: `(options, source, language)`.
pub type CodeFn = Arc<dyn Fn(&RenderOptions, &str, Option<&str>) -> String + Send + Sync>;
/// Inline code method: `(options, source)`.
pub type CodespanFn = Arc<dyn Fn(&RenderOptions, &str) -> String + Send + Sync>;
/// Link method: `(options, href, title, inner html)`.
pub type LinkFn = Arc<dyn Fn(&RenderOptions, &str, Option<&str>, &str) -> String + Send + Sync>;
/// Image method: `(options, src, title, alt text)`.
pub type ImageFn = Arc<dyn Fn(&RenderOptions, &str, Option<&str>, &str) -> String + Send + Sync>;
/// Thematic break method: `(options)`.
pub type RuleFn = Arc<dyn Fn(&RenderOptions) -> String + Send + Sync>;

/// Replacement formatting methods, keyed by the construct they render.
///
/// The method set is closed: each slot has a fixed signature matching the
/// default it replaces, so an override bundle is validated by the type
/// system at configuration time. Slots left empty fall back to the default
/// implementation.
#[derive(Clone, Default)]
pub struct RendererOverrides {
    heading: Option<HeadingFn>,
    paragraph: Option<SpanFn>,
    blockquote: Option<SpanFn>,
    list: Option<ListFn>,
    list_item: Option<SpanFn>,
    code: Option<CodeFn>,
    codespan: Option<CodespanFn>,
    link: Option<LinkFn>,
    image: Option<ImageFn>,
    emphasis: Option<SpanFn>,
    strong: Option<SpanFn>,
    strikethrough: Option<SpanFn>,
    horizontal_rule: Option<RuleFn>,
}

macro_rules! override_setter {
    ($(#[$doc:meta])* $name:ident: $alias:ident, |$($arg:ident: $ty:ty),*|) => {
        $(#[$doc])*
        #[must_use]
        pub fn $name<F>(mut self, f: F) -> Self
        where
            F: Fn($($ty),*) -> String + Send + Sync + 'static,
        {
            self.$name = Some(Arc::new(f));
            self
        }
    };
}

impl RendererOverrides {
    /// Create an empty override bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    override_setter!(
        /// Replace heading rendering: `(options, inner html, level, id)`.
        heading: HeadingFn, |opts: &RenderOptions, html: &str, level: u8, id: Option<&str>|
    );
    override_setter!(
        /// Replace paragraph rendering: `(options, inner html)`.
        paragraph: SpanFn, |opts: &RenderOptions, html: &str|
    );
    override_setter!(
        /// Replace blockquote rendering: `(options, inner html)`.
        blockquote: SpanFn, |opts: &RenderOptions, html: &str|
    );
    override_setter!(
        /// Replace list rendering: `(options, inner html, ordered, start)`.
        list: ListFn, |opts: &RenderOptions, html: &str, ordered: bool, start: Option<u64>|
    );
    override_setter!(
        /// Replace list-item rendering: `(options, inner html)`.
        list_item: SpanFn, |opts: &RenderOptions, html: &str|
    );
    override_setter!(
        /// Replace code-block rendering: `(options, source, language)`.
        ///
        /// The composed output is still enclosed in the inert wrapper.
        code: CodeFn, |opts: &RenderOptions, src: &str, lang: Option<&str>|
    );
    override_setter!(
        /// Replace inline-code rendering: `(options, source)`.
        ///
        /// The composed output is still enclosed in the inert wrapper.
        codespan: CodespanFn, |opts: &RenderOptions, src: &str|
    );
    override_setter!(
        /// Replace link rendering: `(options, href, title, inner html)`.
        link: LinkFn, |opts: &RenderOptions, href: &str, title: Option<&str>, html: &str|
    );
    override_setter!(
        /// Replace image rendering: `(options, src, title, alt)`.
        image: ImageFn, |opts: &RenderOptions, src: &str, title: Option<&str>, alt: &str|
    );
    override_setter!(
        /// Replace emphasis rendering: `(options, inner html)`.
        emphasis: SpanFn, |opts: &RenderOptions, html: &str|
    );
    override_setter!(
        /// Replace strong rendering: `(options, inner html)`.
        strong: SpanFn, |opts: &RenderOptions, html: &str|
    );
    override_setter!(
        /// Replace strikethrough rendering: `(options, inner html)`.
        strikethrough: SpanFn, |opts: &RenderOptions, html: &str|
    );
    override_setter!(
        /// Replace thematic-break rendering: `(options)`.
        horizontal_rule: RuleFn, |opts: &RenderOptions|
    );
}

impl fmt::Debug for RendererOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<&str> = [
            ("heading", self.heading.is_some()),
            ("paragraph", self.paragraph.is_some()),
            ("blockquote", self.blockquote.is_some()),
            ("list", self.list.is_some()),
            ("list_item", self.list_item.is_some()),
            ("code", self.code.is_some()),
            ("codespan", self.codespan.is_some()),
            ("link", self.link.is_some()),
            ("image", self.image.is_some()),
            ("emphasis", self.emphasis.is_some()),
            ("strong", self.strong.is_some()),
            ("strikethrough", self.strikethrough.is_some()),
            ("horizontal_rule", self.horizontal_rule.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();
        f.debug_struct("RendererOverrides")
            .field("overridden", &set)
            .finish()
    }
}

/// The formatting strategy a render call runs with.
///
/// Built once per service via [`ComposedRenderer::compose`], read-only and
/// shared across all subsequent render calls.
#[derive(Clone)]
pub struct ComposedRenderer {
    heading: HeadingFn,
    paragraph: SpanFn,
    blockquote: SpanFn,
    list: ListFn,
    list_item: SpanFn,
    code: CodeFn,
    codespan: CodespanFn,
    link: LinkFn,
    image: ImageFn,
    emphasis: SpanFn,
    strong: SpanFn,
    strikethrough: SpanFn,
    horizontal_rule: RuleFn,
}

impl ComposedRenderer {
    /// Compose the default methods with an override bundle.
    ///
    /// Each overridden slot replaces its default, then `code` and
    /// `codespan` are wrapped with the inert container regardless of
    /// origin.
    #[must_use]
    pub fn compose(overrides: &RendererOverrides) -> Self {
        let code: CodeFn = overrides
            .code
            .clone()
            .unwrap_or_else(|| Arc::new(defaults::code));
        let codespan: CodespanFn = overrides
            .codespan
            .clone()
            .unwrap_or_else(|| Arc::new(defaults::codespan));

        Self {
            heading: overrides
                .heading
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::heading)),
            paragraph: overrides
                .paragraph
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::paragraph)),
            blockquote: overrides
                .blockquote
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::blockquote)),
            list: overrides
                .list
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::list)),
            list_item: overrides
                .list_item
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::list_item)),
            code: Arc::new(move |opts, src, lang| wrap_non_bindable(&code(opts, src, lang))),
            codespan: Arc::new(move |opts, src| wrap_non_bindable(&codespan(opts, src))),
            link: overrides
                .link
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::link)),
            image: overrides
                .image
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::image)),
            emphasis: overrides
                .emphasis
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::emphasis)),
            strong: overrides
                .strong
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::strong)),
            strikethrough: overrides
                .strikethrough
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::strikethrough)),
            horizontal_rule: overrides
                .horizontal_rule
                .clone()
                .unwrap_or_else(|| Arc::new(defaults::horizontal_rule)),
        }
    }

    /// Render a heading.
    #[must_use]
    pub fn heading(&self, opts: &RenderOptions, html: &str, level: u8, id: Option<&str>) -> String {
        (self.heading)(opts, html, level, id)
    }

    /// Render a paragraph.
    #[must_use]
    pub fn paragraph(&self, opts: &RenderOptions, html: &str) -> String {
        (self.paragraph)(opts, html)
    }

    /// Render a blockquote.
    #[must_use]
    pub fn blockquote(&self, opts: &RenderOptions, html: &str) -> String {
        (self.blockquote)(opts, html)
    }

    /// Render a list.
    #[must_use]
    pub fn list(&self, opts: &RenderOptions, html: &str, ordered: bool, start: Option<u64>) -> String {
        (self.list)(opts, html, ordered, start)
    }

    /// Render a list item.
    #[must_use]
    pub fn list_item(&self, opts: &RenderOptions, html: &str) -> String {
        (self.list_item)(opts, html)
    }

    /// Render a code block. Output carries the inert wrapper.
    #[must_use]
    pub fn code(&self, opts: &RenderOptions, src: &str, lang: Option<&str>) -> String {
        (self.code)(opts, src, lang)
    }

    /// Render inline code. Output carries the inert wrapper.
    #[must_use]
    pub fn codespan(&self, opts: &RenderOptions, src: &str) -> String {
        (self.codespan)(opts, src)
    }

    /// Render a link.
    #[must_use]
    pub fn link(&self, opts: &RenderOptions, href: &str, title: Option<&str>, html: &str) -> String {
        (self.link)(opts, href, title, html)
    }

    /// Render an image.
    #[must_use]
    pub fn image(&self, opts: &RenderOptions, src: &str, title: Option<&str>, alt: &str) -> String {
        (self.image)(opts, src, title, alt)
    }

    /// Render emphasis.
    #[must_use]
    pub fn emphasis(&self, opts: &RenderOptions, html: &str) -> String {
        (self.emphasis)(opts, html)
    }

    /// Render strong emphasis.
    #[must_use]
    pub fn strong(&self, opts: &RenderOptions, html: &str) -> String {
        (self.strong)(opts, html)
    }

    /// Render strikethrough.
    #[must_use]
    pub fn strikethrough(&self, opts: &RenderOptions, html: &str) -> String {
        (self.strikethrough)(opts, html)
    }

    /// Render a thematic break.
    #[must_use]
    pub fn horizontal_rule(&self, opts: &RenderOptions) -> String {
        (self.horizontal_rule)(opts)
    }
}

impl Default for ComposedRenderer {
    fn default() -> Self {
        Self::compose(&RendererOverrides::default())
    }
}

impl fmt::Debug for ComposedRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ComposedRenderer")
    }
}

/// Default HTML5 formatting methods.
mod defaults {
    use super::{RenderOptions, Write, escape_html};

    pub fn heading(opts: &RenderOptions, html: &str, level: u8, id: Option<&str>) -> String {
        match id.filter(|_| opts.header_ids) {
            Some(id) => format!(r#"<h{level} id="{id}">{html}</h{level}>"#),
            None => format!("<h{level}>{html}</h{level}>"),
        }
    }

    pub fn paragraph(_opts: &RenderOptions, html: &str) -> String {
        format!("<p>{html}</p>")
    }

    pub fn blockquote(_opts: &RenderOptions, html: &str) -> String {
        format!("<blockquote>{html}</blockquote>")
    }

    pub fn list(_opts: &RenderOptions, html: &str, ordered: bool, start: Option<u64>) -> String {
        if ordered {
            match start {
                Some(1) | None => format!("<ol>{html}</ol>"),
                Some(n) => format!(r#"<ol start="{n}">{html}</ol>"#),
            }
        } else {
            format!("<ul>{html}</ul>")
        }
    }

    pub fn list_item(_opts: &RenderOptions, html: &str) -> String {
        format!("<li>{html}</li>")
    }

    pub fn code(opts: &RenderOptions, src: &str, lang: Option<&str>) -> String {
        let body = match &opts.highlight {
            Some(highlight) => highlight(src, lang),
            None => escape_html(src),
        };
        match lang {
            Some(lang) => format!(
                r#"<pre><code class="{}{}">{body}</code></pre>"#,
                escape_html(&opts.lang_prefix),
                escape_html(lang)
            ),
            None => format!("<pre><code>{body}</code></pre>"),
        }
    }

    pub fn codespan(_opts: &RenderOptions, src: &str) -> String {
        format!("<code>{}</code>", escape_html(src))
    }

    pub fn link(_opts: &RenderOptions, href: &str, title: Option<&str>, html: &str) -> String {
        let mut out = format!(r#"<a href="{}""#, escape_html(href));
        if let Some(title) = title {
            write!(out, r#" title="{}""#, escape_html(title)).unwrap();
        }
        write!(out, ">{html}</a>").unwrap();
        out
    }

    pub fn image(_opts: &RenderOptions, src: &str, title: Option<&str>, alt: &str) -> String {
        let mut out = format!(r#"<img src="{}""#, escape_html(src));
        if let Some(title) = title {
            write!(out, r#" title="{}""#, escape_html(title)).unwrap();
        }
        write!(out, r#" alt="{}">"#, escape_html(alt)).unwrap();
        out
    }

    pub fn emphasis(_opts: &RenderOptions, html: &str) -> String {
        format!("<em>{html}</em>")
    }

    pub fn strong(_opts: &RenderOptions, html: &str) -> String {
        format!("<strong>{html}</strong>")
    }

    pub fn strikethrough(_opts: &RenderOptions, html: &str) -> String {
        format!("<s>{html}</s>")
    }

    pub fn horizontal_rule(_opts: &RenderOptions) -> String {
        "<hr>".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn opts() -> RenderOptions {
        RenderOptions::default()
    }

    #[test]
    fn test_default_code_is_wrapped() {
        let renderer = ComposedRenderer::default();
        assert_eq!(
            renderer.code(&opts(), "x = 1", Some("py")),
            r#"<span data-non-bindable><pre><code class="lang-py">x = 1</code></pre></span>"#
        );
    }

    #[test]
    fn test_default_codespan_is_wrapped_and_escaped() {
        let renderer = ComposedRenderer::default();
        assert_eq!(
            renderer.codespan(&opts(), "<b>"),
            "<span data-non-bindable><code>&lt;b&gt;</code></span>"
        );
    }

    #[test]
    fn test_overridden_code_still_wrapped() {
        let overrides =
            RendererOverrides::new().code(|_, src, _| format!("<div class=\"hl\">{src}</div>"));
        let renderer = ComposedRenderer::compose(&overrides);
        assert_eq!(
            renderer.code(&opts(), "x", None),
            r#"<span data-non-bindable><div class="hl">x</div></span>"#
        );
    }

    #[test]
    fn test_overridden_codespan_still_wrapped() {
        let overrides = RendererOverrides::new().codespan(|_, src| format!("<kbd>{src}</kbd>"));
        let renderer = ComposedRenderer::compose(&overrides);
        assert_eq!(
            renderer.codespan(&opts(), "q"),
            "<span data-non-bindable><kbd>q</kbd></span>"
        );
    }

    #[test]
    fn test_link_override_leaves_heading_default() {
        let overrides = RendererOverrides::new()
            .link(|_, href, _, html| format!(r#"<a href="{href}" target="_blank">{html}</a>"#));
        let renderer = ComposedRenderer::compose(&overrides);
        assert_eq!(
            renderer.link(&opts(), "http://example.com/", None, "x"),
            r#"<a href="http://example.com/" target="_blank">x</a>"#
        );
        assert_eq!(
            renderer.heading(&opts(), "Hi", 1, Some("hi")),
            r#"<h1 id="hi">Hi</h1>"#
        );
    }

    #[test]
    fn test_default_link_with_title() {
        let renderer = ComposedRenderer::default();
        assert_eq!(
            renderer.link(&opts(), "/a", Some("T"), "text"),
            r#"<a href="/a" title="T">text</a>"#
        );
    }

    #[test]
    fn test_default_image() {
        let renderer = ComposedRenderer::default();
        assert_eq!(
            renderer.image(&opts(), "i.png", None, "Alt"),
            r#"<img src="i.png" alt="Alt">"#
        );
    }

    #[test]
    fn test_heading_without_ids() {
        let renderer = ComposedRenderer::default();
        let mut no_ids = opts();
        no_ids.header_ids = false;
        assert_eq!(
            renderer.heading(&no_ids, "Hi", 2, Some("hi")),
            "<h2>Hi</h2>"
        );
    }

    #[test]
    fn test_highlight_callback_used_for_code_body() {
        let mut with_hl = opts();
        with_hl.highlight = Some(std::sync::Arc::new(|code, lang| {
            format!("<hl lang={}>{code}</hl>", lang.unwrap_or("?"))
        }));
        let renderer = ComposedRenderer::default();
        let out = renderer.code(&with_hl, "f()", Some("rs"));
        assert!(out.contains("<hl lang=rs>f()</hl>"));
    }

    #[test]
    fn test_ordered_list_start() {
        let renderer = ComposedRenderer::default();
        assert_eq!(
            renderer.list(&opts(), "<li>a</li>", true, Some(3)),
            r#"<ol start="3"><li>a</li></ol>"#
        );
        assert_eq!(
            renderer.list(&opts(), "<li>a</li>", true, Some(1)),
            "<ol><li>a</li></ol>"
        );
    }
}
