//! Per-element reactive binding controller.
//!
//! A [`BindingController`] connects one live element to the rendering
//! service. At bind time it resolves which of three source modes supplies
//! the markdown text, subscribes to the relevant change notifications,
//! and re-renders into the element on every change:
//!
//! - **Bound**: a watched expression holds the markdown text. Reactive.
//! - **Remote**: a watched expression resolves to a template URL; the
//!   template is fetched asynchronously. Reactive, latest-wins.
//! - **Inline**: the element's own literal content at bind time. One-shot.
//!
//! Exactly one mode is active per binding, chosen once with priority
//! Bound > Remote > Inline.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mb_render::{OptionsPatch, strip_indent};

use crate::host::{
    BindingEvents, ChangeSource, Element, Host, SubtreeCompiler, TemplateFetcher, WatchHandle,
};
use crate::service::MarkdownService;

/// Configuration attributes read off the element at bind time.
#[derive(Debug, Default)]
pub struct BindingAttrs {
    /// Expression holding the markdown text (Bound mode when present).
    pub text_expr: Option<String>,
    /// Expression resolving to a template URL (Remote mode when present
    /// and no `text_expr`).
    pub src_expr: Option<String>,
    /// Per-binding option patch applied over the service defaults on
    /// every render.
    pub options: Option<OptionsPatch>,
    /// Hand the written subtree to the recursive compiler after each
    /// render. Off by default: compiling arbitrary rendered markdown as
    /// live template is an escalation of trust the caller must request.
    pub compile: bool,
}

/// Which input strategy supplies a binding's markdown text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceMode {
    /// One-shot literal element content.
    Inline,
    /// Watched text expression.
    Bound,
    /// Watched URL expression, fetched remotely.
    Remote,
}

impl SourceMode {
    /// Resolve the active mode from the present attributes.
    #[must_use]
    pub fn resolve(attrs: &BindingAttrs) -> Self {
        if attrs.text_expr.is_some() {
            Self::Bound
        } else if attrs.src_expr.is_some() {
            Self::Remote
        } else {
            Self::Inline
        }
    }
}

/// Observable state of a binding.
#[derive(Clone, Debug, Default)]
pub struct BindingState {
    /// Source text most recently rendered (after normalization).
    pub current_text: String,
    /// HTML most recently written to the element.
    pub last_rendered_html: String,
}

struct BindingInner {
    service: Rc<MarkdownService>,
    element: Rc<dyn Element>,
    compiler: Rc<dyn SubtreeCompiler>,
    events: Rc<dyn BindingEvents>,
    options: Option<OptionsPatch>,
    compile: bool,
    state: RefCell<BindingState>,
    /// Remote-mode fetch generation. Only the completion matching the
    /// latest generation may touch the element (latest-wins).
    fetch_generation: Cell<u64>,
}

impl BindingInner {
    /// Normalize, render, write, optionally compile.
    fn apply(&self, text: &str) {
        let text = strip_indent(text);
        let html = self.service.render(&text, self.options.as_ref());
        self.element.set_html(&html);
        {
            let mut state = self.state.borrow_mut();
            state.current_text = text;
            state.last_rendered_html = html;
        }
        if self.compile {
            self.compiler.compile(self.element.as_ref());
        }
    }

    fn next_generation(&self) -> u64 {
        let generation = self.fetch_generation.get().wrapping_add(1);
        self.fetch_generation.set(generation);
        generation
    }
}

/// Reactive controller binding one element to the rendering service.
///
/// Dropping the controller releases its change subscriptions and
/// invalidates any in-flight fetch completion.
pub struct BindingController {
    inner: Rc<BindingInner>,
    mode: SourceMode,
    _watches: Vec<WatchHandle>,
}

impl BindingController {
    /// Bind an element.
    ///
    /// Resolves the source mode once, performs the initial render (via the
    /// change source's immediate notification for the reactive modes) and
    /// subscribes to subsequent changes.
    #[must_use]
    pub fn bind(
        service: Rc<MarkdownService>,
        element: Rc<dyn Element>,
        attrs: BindingAttrs,
        host: &Host,
    ) -> Self {
        let mode = SourceMode::resolve(&attrs);
        let inner = Rc::new(BindingInner {
            service,
            element,
            compiler: Rc::clone(&host.compiler),
            events: Rc::clone(&host.events),
            options: attrs.options,
            compile: attrs.compile,
            state: RefCell::new(BindingState::default()),
            fetch_generation: Cell::new(0),
        });

        let mut watches = Vec::new();
        match mode {
            SourceMode::Bound => {
                let expr = attrs.text_expr.unwrap_or_default();
                let watcher = Rc::clone(&inner);
                watches.push(host.changes.watch(
                    &expr,
                    Box::new(move |value| {
                        // Undefined bound values render as empty markdown.
                        watcher.apply(value.as_deref().unwrap_or(""));
                    }),
                ));
            }
            SourceMode::Remote => {
                let expr = attrs.src_expr.unwrap_or_default();
                let watcher = Rc::clone(&inner);
                let fetcher = Rc::clone(&host.fetcher);
                watches.push(host.changes.watch(
                    &expr,
                    Box::new(move |url| {
                        let generation = watcher.next_generation();
                        let Some(url) = url else {
                            // No URL resolved yet; nothing to attempt.
                            watcher.apply("");
                            return;
                        };
                        let completion = Rc::clone(&watcher);
                        let attempted = url.clone();
                        fetcher.fetch(
                            &url,
                            true,
                            Box::new(move |result| {
                                if completion.fetch_generation.get() != generation {
                                    // Superseded by a newer notification.
                                    return;
                                }
                                match result {
                                    Ok(content) => completion.apply(&content),
                                    Err(error) => {
                                        tracing::warn!(
                                            url = %attempted,
                                            error = %error,
                                            "Template fetch failed"
                                        );
                                        completion.apply("");
                                        completion.events.include_error(&attempted);
                                    }
                                }
                            }),
                        );
                    }),
                ));
            }
            SourceMode::Inline => {
                let text = inner.element.inline_text();
                inner.apply(&text);
            }
        }

        Self {
            inner,
            mode,
            _watches: watches,
        }
    }

    /// The source mode resolved at bind time.
    #[must_use]
    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    /// Snapshot of the binding's observable state.
    #[must_use]
    pub fn state(&self) -> BindingState {
        self.inner.state.borrow().clone()
    }
}

impl Drop for BindingController {
    fn drop(&mut self) {
        // Invalidate any in-flight fetch; watch handles release themselves.
        self.inner.next_generation();
    }
}
