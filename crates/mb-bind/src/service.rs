//! The callable markdown rendering service.

use std::sync::Arc;

use mb_render::{ComposedRenderer, MarkdownParser, OptionsPatch, ParseError, RenderOptions};

use crate::config::RenderConfig;

/// Markdown rendering entry point.
///
/// Construction snapshots the [`RenderConfig`]: config defaults are merged
/// over the library baseline once, and the renderer overrides are composed
/// once. Both are read-only afterwards and shared by every render call, so
/// concurrent bindings need no synchronization.
///
/// Rendering fails closed: a parse fault produces an empty string and one
/// diagnostic log line, never a panic or an error to the caller. A single
/// malformed document must not take down the surrounding reactive update
/// loop.
pub struct MarkdownService {
    parser: Arc<dyn MarkdownParser>,
    defaults: RenderOptions,
    renderer: ComposedRenderer,
}

impl MarkdownService {
    /// Build a service from a parse capability and the startup config.
    ///
    /// The parser is a required dependency; there is no fallback lookup.
    /// Later mutations of `config` do not affect this service.
    #[must_use]
    pub fn new(parser: Arc<dyn MarkdownParser>, config: &RenderConfig) -> Self {
        let mut defaults = RenderOptions::default();
        if let Some(patch) = config.defaults() {
            patch.apply(&mut defaults);
        }
        let renderer = config
            .renderer()
            .map_or_else(ComposedRenderer::default, ComposedRenderer::compose);

        Self {
            parser,
            defaults,
            renderer,
        }
    }

    /// Render markdown to an HTML fragment.
    ///
    /// Effective options are the construction-time defaults with the
    /// per-call patch applied on top (shallow merge, per-call wins). The
    /// composed renderer is not overridable per call.
    ///
    /// Returns an empty string if the parse capability faults; the fault
    /// is logged, never propagated.
    #[must_use]
    pub fn render(&self, text: &str, per_call: Option<&OptionsPatch>) -> String {
        match self.try_render(text, per_call) {
            Ok(html) => html,
            Err(error) => {
                tracing::error!(error = %error, "Markdown parse failed, rendering empty output");
                String::new()
            }
        }
    }

    /// Construction-time effective defaults.
    #[must_use]
    pub fn defaults(&self) -> &RenderOptions {
        &self.defaults
    }

    fn try_render(&self, text: &str, per_call: Option<&OptionsPatch>) -> Result<String, ParseError> {
        let options = match per_call {
            Some(patch) => patch.merged(&self.defaults),
            None => self.defaults.clone(),
        };
        self.parser.parse(text, &options, &self.renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mb_render::{CmarkParser, RendererOverrides};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service() -> MarkdownService {
        MarkdownService::new(Arc::new(CmarkParser), &RenderConfig::new())
    }

    /// Parse capability that faults for a marked input.
    struct FaultParser {
        calls: AtomicUsize,
    }

    impl MarkdownParser for FaultParser {
        fn parse(
            &self,
            text: &str,
            options: &RenderOptions,
            renderer: &ComposedRenderer,
        ) -> Result<String, ParseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("BAD") {
                return Err(ParseError::Fault("injected".to_owned()));
            }
            CmarkParser.parse(text, options, renderer)
        }
    }

    #[test]
    fn test_default_render_matches_backend() {
        let expected = CmarkParser
            .parse("# Hi", &RenderOptions::default(), &ComposedRenderer::default())
            .unwrap();
        assert_eq!(service().render("# Hi", None), expected);
    }

    #[test]
    fn test_render_heading_scenario() {
        assert_eq!(service().render("# Hi", None), r#"<h1 id="hi">Hi</h1>"#);
    }

    #[test]
    fn test_render_codespan_scenario() {
        assert_eq!(
            service().render("`code`", None),
            "<p><span data-non-bindable><code>code</code></span></p>"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let service = service();
        assert_eq!(
            service.render("**a** `b`", None),
            service.render("**a** `b`", None)
        );
    }

    #[test]
    fn test_config_defaults_applied() {
        let mut config = RenderConfig::new();
        config.set_options(OptionsPatch {
            breaks: Some(true),
            ..OptionsPatch::default()
        });
        let service = MarkdownService::new(Arc::new(CmarkParser), &config);
        assert_eq!(service.render("a\nb", None), "<p>a<br>b</p>");
    }

    #[test]
    fn test_per_call_patch_beats_config_default() {
        let mut config = RenderConfig::new();
        config.set_options(OptionsPatch {
            breaks: Some(true),
            ..OptionsPatch::default()
        });
        let service = MarkdownService::new(Arc::new(CmarkParser), &config);
        let per_call = OptionsPatch {
            breaks: Some(false),
            ..OptionsPatch::default()
        };
        assert_eq!(service.render("a\nb", Some(&per_call)), "<p>a\nb</p>");
    }

    #[test]
    fn test_renderer_override_from_config() {
        let mut config = RenderConfig::new();
        config.set_renderer(
            RendererOverrides::new()
                .link(|_, href, _, html| format!(r#"<a href="{href}" target="_blank">{html}</a>"#)),
        );
        let service = MarkdownService::new(Arc::new(CmarkParser), &config);
        let html = service.render("[x](http://e/)\n\n# H", None);
        assert!(html.contains(r#"target="_blank""#));
        // Heading rendering stays the default.
        assert!(html.contains(r#"<h1 id="h">H</h1>"#));
    }

    #[test]
    fn test_config_mutation_after_construction_has_no_effect() {
        let mut config = RenderConfig::new();
        let service = MarkdownService::new(Arc::new(CmarkParser), &config);
        config.set_options(OptionsPatch {
            breaks: Some(true),
            ..OptionsPatch::default()
        });
        assert_eq!(service.render("a\nb", None), "<p>a\nb</p>");
    }

    #[test]
    fn test_parse_fault_fails_closed() {
        let parser = Arc::new(FaultParser {
            calls: AtomicUsize::new(0),
        });
        let service = MarkdownService::new(Arc::clone(&parser) as Arc<dyn MarkdownParser>, &RenderConfig::new());
        assert_eq!(service.render("BAD input", None), "");
        // Healthy input still renders afterwards.
        assert_eq!(service.render("ok", None), "<p>ok</p>");
        assert_eq!(parser.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_code_wrap_survives_config_override() {
        let mut config = RenderConfig::new();
        config.set_renderer(
            RendererOverrides::new().code(|_, src, _| format!("<div class=\"hl\">{src}</div>")),
        );
        let service = MarkdownService::new(Arc::new(CmarkParser), &config);
        let html = service.render("```\nx\n```", None);
        assert_eq!(
            html,
            "<span data-non-bindable><div class=\"hl\">x\n</div></span>"
        );
    }
}
