//! Parser option bundles and their merge rules.
//!
//! Options exist in two forms: [`RenderOptions`], the fully resolved set a
//! render call runs with, and [`OptionsPatch`], a partial bundle whose
//! present fields replace whole values when applied. Effective options for
//! a call are built by applying patches left to right over the library
//! defaults: config-level defaults first, then the per-call patch.

use std::fmt;
use std::sync::Arc;

/// Syntax-highlight callback: `(source, language) -> HTML`.
///
/// Invoked by the default `code` renderer method for fenced code bodies.
/// The callback owns escaping of its output; when absent, code bodies are
/// HTML-escaped verbatim.
pub type HighlightFn = Arc<dyn Fn(&str, Option<&str>) -> String + Send + Sync>;

/// Resolved parser options for a single render call.
///
/// [`RenderOptions::default`] is the library baseline: GFM extensions on,
/// line breaks off, silent diagnostics on, `lang-` class prefix, header
/// ids generated.
#[derive(Clone)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown extensions (tables, strikethrough,
    /// task lists).
    pub gfm: bool,
    /// Render single newlines inside paragraphs as `<br>`.
    pub breaks: bool,
    /// Suppress recoverable parser syntax diagnostics.
    pub silent: bool,
    /// Class prefix for fenced code block languages, e.g. `lang-` yields
    /// `class="lang-rust"`.
    pub lang_prefix: String,
    /// Generate slugified `id` attributes on headings.
    pub header_ids: bool,
    /// Optional syntax-highlight callback for code blocks.
    pub highlight: Option<HighlightFn>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: false,
            silent: true,
            lang_prefix: "lang-".to_owned(),
            header_ids: true,
            highlight: None,
        }
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("gfm", &self.gfm)
            .field("breaks", &self.breaks)
            .field("silent", &self.silent)
            .field("lang_prefix", &self.lang_prefix)
            .field("header_ids", &self.header_ids)
            .field("highlight", &self.highlight.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Partial option bundle.
///
/// Present fields replace the corresponding resolved value wholesale; the
/// merge is shallow by design. Per-call patches therefore beat config-level
/// defaults, which beat the library baseline.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptionsPatch {
    /// Override GFM extension flag.
    pub gfm: Option<bool>,
    /// Override line-break handling.
    pub breaks: Option<bool>,
    /// Override silent-diagnostics flag.
    pub silent: Option<bool>,
    /// Override code language class prefix.
    pub lang_prefix: Option<String>,
    /// Override heading id generation.
    pub header_ids: Option<bool>,
    /// Override the highlight callback.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub highlight: Option<HighlightFn>,
}

impl OptionsPatch {
    /// Apply this patch over `base`, replacing every field the patch sets.
    pub fn apply(&self, base: &mut RenderOptions) {
        if let Some(gfm) = self.gfm {
            base.gfm = gfm;
        }
        if let Some(breaks) = self.breaks {
            base.breaks = breaks;
        }
        if let Some(silent) = self.silent {
            base.silent = silent;
        }
        if let Some(prefix) = &self.lang_prefix {
            base.lang_prefix = prefix.clone();
        }
        if let Some(header_ids) = self.header_ids {
            base.header_ids = header_ids;
        }
        if let Some(highlight) = &self.highlight {
            base.highlight = Some(Arc::clone(highlight));
        }
    }

    /// Resolve this patch against `base` into a new option set.
    #[must_use]
    pub fn merged(&self, base: &RenderOptions) -> RenderOptions {
        let mut resolved = base.clone();
        self.apply(&mut resolved);
        resolved
    }
}

impl fmt::Debug for OptionsPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsPatch")
            .field("gfm", &self.gfm)
            .field("breaks", &self.breaks)
            .field("silent", &self.silent)
            .field("lang_prefix", &self.lang_prefix)
            .field("header_ids", &self.header_ids)
            .field("highlight", &self.highlight.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
