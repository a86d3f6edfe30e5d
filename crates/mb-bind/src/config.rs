//! Application-level render configuration.

use mb_render::{OptionsPatch, RendererOverrides};

/// Render configuration assembled once at application startup.
///
/// Holds the two optional configuration bundles a deployment may install:
/// default options applied under every render call, and renderer-method
/// overrides. Both setters overwrite any prior value — last write wins, no
/// merging happens at this layer.
///
/// A [`MarkdownService`](crate::MarkdownService) snapshots the config at
/// construction. Mutating the config afterwards has no effect on services
/// already built from it; this mirrors the configure-then-construct phase
/// split and is a documented limitation, not an error.
#[derive(Clone, Debug, Default)]
pub struct RenderConfig {
    defaults: Option<OptionsPatch>,
    renderer: Option<RendererOverrides>,
}

impl RenderConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install default options applied under every render call.
    ///
    /// Replaces any previously installed bundle wholesale.
    pub fn set_options(&mut self, defaults: OptionsPatch) {
        self.defaults = Some(defaults);
    }

    /// Install renderer-method overrides.
    ///
    /// Replaces any previously installed bundle wholesale.
    pub fn set_renderer(&mut self, overrides: RendererOverrides) {
        self.renderer = Some(overrides);
    }

    /// Installed default options, if any.
    #[must_use]
    pub fn defaults(&self) -> Option<&OptionsPatch> {
        self.defaults.as_ref()
    }

    /// Installed renderer overrides, if any.
    #[must_use]
    pub fn renderer(&self) -> Option<&RendererOverrides> {
        self.renderer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = RenderConfig::new();
        assert!(config.defaults().is_none());
        assert!(config.renderer().is_none());
    }

    #[test]
    fn test_set_options_last_write_wins() {
        let mut config = RenderConfig::new();
        config.set_options(OptionsPatch {
            gfm: Some(false),
            breaks: Some(true),
            ..OptionsPatch::default()
        });
        config.set_options(OptionsPatch {
            gfm: Some(true),
            ..OptionsPatch::default()
        });

        let installed = config.defaults().expect("options installed");
        assert_eq!(installed.gfm, Some(true));
        // Second bundle replaced the first wholesale, no merge.
        assert_eq!(installed.breaks, None);
    }

    #[test]
    fn test_set_renderer_overwrites() {
        let mut config = RenderConfig::new();
        config.set_renderer(RendererOverrides::new().codespan(|_, s| format!("<x>{s}</x>")));
        config.set_renderer(RendererOverrides::new());
        assert!(config.renderer().is_some());
    }
}
