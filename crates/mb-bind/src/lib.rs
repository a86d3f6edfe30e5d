//! Reactive markdown binding layer.
//!
//! Connects the `mb-render` pipeline to a host UI framework: a
//! [`MarkdownService`] built once from application-startup configuration,
//! and per-element [`BindingController`]s that resolve where the markdown
//! text comes from, re-render on every change, and write the result into
//! the element.
//!
//! # Wiring
//!
//! At startup, assemble a [`RenderConfig`] (default options, renderer
//! overrides) and build the service from it plus a parse capability:
//!
//! ```
//! use std::sync::Arc;
//! use mb_bind::{CmarkParser, MarkdownService, OptionsPatch, RenderConfig};
//!
//! let mut config = RenderConfig::new();
//! config.set_options(OptionsPatch {
//!     breaks: Some(true),
//!     ..OptionsPatch::default()
//! });
//! let service = MarkdownService::new(Arc::new(CmarkParser), &config);
//! assert_eq!(service.render("a\nb", None), "<p>a<br>b</p>");
//! ```
//!
//! Per element, the host constructs [`BindingAttrs`] from the element's
//! configuration attributes and calls [`BindingController::bind`] with its
//! capability implementations (see [`Host`]). Every failure mode degrades
//! to empty output plus a log line or an `include_error` event; nothing in
//! this layer raises to the caller, so one bad document never halts the
//! reactive loop.

mod binding;
mod config;
mod host;
mod service;

pub use binding::{BindingAttrs, BindingController, BindingState, SourceMode};
pub use config::RenderConfig;
pub use host::{
    BindingEvents, ChangeSource, Element, FetchCallback, FetchError, Host, SubtreeCompiler,
    TemplateFetcher, WatchCallback, WatchHandle,
};
pub use service::MarkdownService;

// Re-export the rendering-pipeline surface callers configure against.
pub use mb_render::{
    CmarkParser, ComposedRenderer, HighlightFn, MarkdownParser, NON_BINDABLE_ATTR, OptionsPatch,
    ParseError, RenderOptions, RendererOverrides, strip_indent,
};
