//! Markdown rendering pipeline with typed renderer overrides.
//!
//! This crate is the lower half of the reactive markdown binding stack:
//! it turns markdown text into sanitized HTML fragments under a resolved
//! option set, with a closed set of per-construct formatting methods that
//! callers may override.
//!
//! # Architecture
//!
//! - [`RenderOptions`] / [`OptionsPatch`]: resolved options and the
//!   shallow-merge partial bundles applied over them.
//! - [`RendererOverrides`] / [`ComposedRenderer`]: typed replacement slots
//!   for each construct, composed once at build time. Composition always
//!   wraps `code` and `codespan` output in an inert container
//!   ([`NON_BINDABLE_ATTR`]) so rendered code is never reinterpreted as
//!   host-framework template syntax.
//! - [`MarkdownParser`] / [`CmarkParser`]: the opaque parse capability and
//!   its default pulldown-cmark backend.
//! - [`strip_indent`]: common-indentation normalization for markdown
//!   embedded in indented markup.
//!
//! # Example
//!
//! ```
//! use mb_render::{CmarkParser, ComposedRenderer, MarkdownParser, RenderOptions};
//!
//! let renderer = ComposedRenderer::default();
//! let html = CmarkParser
//!     .parse("# Hi", &RenderOptions::default(), &renderer)
//!     .unwrap();
//! assert_eq!(html, r#"<h1 id="hi">Hi</h1>"#);
//! ```

mod escape;
mod normalize;
mod options;
mod parse;
mod renderer;

pub use escape::escape_html;
pub use normalize::strip_indent;
pub use options::{HighlightFn, OptionsPatch, RenderOptions};
pub use parse::{CmarkParser, MarkdownParser, ParseError};
pub use renderer::{
    CodeFn, CodespanFn, ComposedRenderer, HeadingFn, ImageFn, LinkFn, ListFn, NON_BINDABLE_ATTR,
    RendererOverrides, RuleFn, SpanFn, wrap_non_bindable,
};
