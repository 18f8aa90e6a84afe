//! Standalone HTML page generator.

use askama::Template;
use sc_common::ReportResult;
use tracing::{debug, info};

use crate::config::ReportConfig;
use crate::dom::Element;
use crate::error::Result;
use crate::features::ReportUiFeatures;
use crate::renderer::ReportRenderer;

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    title: &'a str,
    theme_class: &'a str,
    generator: &'a str,
    body: &'a str,
}

/// Renders results into self-contained HTML pages.
#[derive(Debug)]
pub struct ReportGenerator {
    config: ReportConfig,
    renderer: ReportRenderer,
}

impl ReportGenerator {
    /// Create a generator over the embedded templates.
    pub fn new(config: ReportConfig) -> Result<Self> {
        let mut renderer = ReportRenderer::standard().with_config(config.clone())?;
        renderer.set_ui_features(ReportUiFeatures::new(config.clone()));
        Ok(Self { config, renderer })
    }

    /// Create a generator with default configuration.
    pub fn default_config() -> Result<Self> {
        Self::new(ReportConfig::default())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn renderer(&self) -> &ReportRenderer {
        &self.renderer
    }

    /// Generate a page for `result`.
    pub fn generate(&self, result: &ReportResult) -> Result<String> {
        let body = Element::new("body");
        self.renderer.render_report(result, &body)?;
        debug!(audits = result.audit_count(), "Report tree built");

        let title = self.config.page_title();
        let generator = format!("sc-report {}", env!("CARGO_PKG_VERSION"));
        let body_html = body.inner_html();
        let page = PageTemplate {
            title: &title,
            theme_class: self.config.theme.css_class(),
            generator: &generator,
            body: &body_html,
        };
        let html = page.render()?;

        let output = if cfg!(debug_assertions) || !self.config.minify {
            html
        } else {
            let cfg = minify_html::Cfg {
                minify_js: true,
                minify_css: true,
                ..Default::default()
            };
            String::from_utf8(minify_html::minify(html.as_bytes(), &cfg)).unwrap_or(html)
        };

        info!(
            bytes = output.len(),
            title = %title,
            url = %result.final_url,
            "Report page generated"
        );
        Ok(output)
    }

    /// Generate a page from a JSON-encoded result.
    pub fn generate_from_json(&self, json: &str) -> Result<String> {
        let result: ReportResult = serde_json::from_str(json)?;
        self.generate(&result)
    }
}
