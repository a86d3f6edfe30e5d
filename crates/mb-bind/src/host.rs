//! Capabilities the host UI framework provides to bindings.
//!
//! The binding layer owns no I/O of its own: change detection, template
//! fetching, recursive compilation and event signalling are all consumed
//! through these narrow interfaces. Implementations are single-threaded
//! and shared by `Rc`, matching the cooperative event-driven model of the
//! host framework.

use std::rc::Rc;

/// Callback for a watched expression. Receives the new value, or `None`
/// when the expression currently evaluates to nothing.
pub type WatchCallback = Box<dyn FnMut(Option<String>)>;

/// Callback for a completed template fetch.
pub type FetchCallback = Box<dyn FnOnce(Result<String, FetchError>)>;

/// A live element a binding writes rendered HTML into.
pub trait Element {
    /// Literal text content of the element at bind time. Source text for
    /// inline-mode bindings.
    fn inline_text(&self) -> String;

    /// Replace the element's content with a rendered HTML fragment.
    fn set_html(&self, html: &str);
}

/// Change-notification capability of the host framework.
///
/// Contract: the callback is invoked once immediately with the current
/// value and again on every subsequent change, in change order.
pub trait ChangeSource {
    /// Subscribe to changes of `expr`. The subscription lives until the
    /// returned handle is dropped.
    fn watch(&self, expr: &str, callback: WatchCallback) -> WatchHandle;
}

/// Releases a [`ChangeSource`] subscription when dropped.
pub struct WatchHandle {
    release: Option<Box<dyn FnOnce()>>,
}

impl WatchHandle {
    /// Wrap a release action to run when the subscription ends.
    #[must_use]
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A handle with no release action, for sources that need none.
    #[must_use]
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WatchHandle")
    }
}

/// Error completing a remote template fetch.
#[derive(Debug, thiserror::Error)]
#[error("template fetch failed for {url}: {reason}")]
pub struct FetchError {
    /// The URL the fetch was attempted against.
    pub url: String,
    /// Host-reported failure reason.
    pub reason: String,
}

/// Remote template fetch capability.
///
/// Promise-like: `done` runs exactly once, synchronously or later.
/// Timeout and cancellation policy belong to the implementation.
pub trait TemplateFetcher {
    /// Fetch the template at `url`. `cacheable` permits serving a cached
    /// copy.
    fn fetch(&self, url: &str, cacheable: bool, done: FetchCallback);
}

/// Recursive-compilation capability: makes directive-like markup inside a
/// freshly written subtree live against the surrounding scope.
pub trait SubtreeCompiler {
    /// Compile the element's current content.
    fn compile(&self, element: &dyn Element);
}

/// Outbound binding events a surrounding component may react to.
pub trait BindingEvents {
    /// A remote template failed to load. `source` is the attempted source
    /// identifier.
    fn include_error(&self, source: &str);
}

/// The host capabilities handed to a binding at bind time.
#[derive(Clone)]
pub struct Host {
    /// Change-notification capability.
    pub changes: Rc<dyn ChangeSource>,
    /// Remote template fetch capability.
    pub fetcher: Rc<dyn TemplateFetcher>,
    /// Recursive-compilation capability.
    pub compiler: Rc<dyn SubtreeCompiler>,
    /// Outbound event sink.
    pub events: Rc<dyn BindingEvents>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_watch_handle_releases_on_drop() {
        let released = Rc::new(Cell::new(false));
        let flag = Rc::clone(&released);
        let handle = WatchHandle::new(move || flag.set(true));
        assert!(!released.get());
        drop(handle);
        assert!(released.get());
    }

    #[test]
    fn test_noop_handle() {
        drop(WatchHandle::noop());
    }

    #[test]
    fn test_fetch_error_display() {
        let error = FetchError {
            url: "partials/help.md".to_owned(),
            reason: "404".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "template fetch failed for partials/help.md: 404"
        );
    }
}
