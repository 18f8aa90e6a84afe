//! Post-render interaction setup.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sc_common::ReportResult;
use tracing::debug;

use crate::config::ReportConfig;
use crate::dom::Element;
use crate::error::Result;
use crate::hooks::{self, selector};
use crate::util::filename_prefix;

/// Applies theme, export menu and collapse state to a freshly rendered
/// report.
#[derive(Debug, Clone)]
pub struct ReportUiFeatures {
    config: ReportConfig,
}

impl ReportUiFeatures {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn init_features(&self, result: &ReportResult, root: &Element) -> Result<()> {
        let theme = self.config.theme.css_class();
        if !theme.is_empty() {
            root.add_class(theme);
        }
        self.setup_export(result, root)?;
        self.apply_collapse_state(root)?;
        debug!(theme = theme, "Initialized report features");
        Ok(())
    }

    /// Fill in or remove the export menu. The header leaves the menu as
    /// cloned, so this is the only place its presence is decided.
    fn setup_export(&self, result: &ReportResult, root: &Element) -> Result<()> {
        let Some(export) = root.query_selector(&selector(hooks::EXPORT))? else {
            return Ok(());
        };
        let export_config = &self.config.export;
        if !export_config.enabled {
            export.remove();
            return Ok(());
        }

        let prefix = filename_prefix(&result.final_url, &result.generated_time);
        if let Some(link) = export.query_selector("[data-action=save-json]")? {
            if export_config.json {
                let json = serde_json::to_string_pretty(result)?;
                link.set_attribute(
                    "href",
                    format!("data:application/json;base64,{}", STANDARD.encode(json)),
                );
                link.set_attribute("download", format!("{prefix}.json"));
            } else {
                link.remove();
            }
        }
        if let Some(link) = export.query_selector("[data-action=save-html]")? {
            if export_config.html {
                link.set_attribute("download", format!("{prefix}.html"));
            } else {
                link.remove();
            }
        }
        if let Some(link) = export.query_selector("[data-action=print-summary]")? {
            if !export_config.print {
                link.remove();
            }
        }
        Ok(())
    }

    fn apply_collapse_state(&self, root: &Element) -> Result<()> {
        for section in root.query_selector_all("details.lh-passed-audits")? {
            if self.config.collapse_passed_audits {
                section.remove_attribute("open");
            } else {
                section.set_attribute("open", "");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExportConfig, ReportTheme};
    use crate::renderer::ReportRenderer;
    use serde_json::json;

    fn result() -> ReportResult {
        serde_json::from_value(json!({
            "requestedUrl": "https://example.com/",
            "finalUrl": "https://example.com/",
            "userAgent": "UA",
            "generatedTime": "2026-10-19T15:04:05Z",
            "reportCategories": [{
                "id": "performance", "name": "Performance", "score": 0.5,
                "audits": [{"id": "dom-size", "title": "DOM size", "score": 1,
                            "scoreDisplayMode": "numeric", "group": "perf-info"}]
            }]
        }))
        .unwrap()
    }

    fn render(config: ReportConfig) -> Element {
        let mut renderer = ReportRenderer::standard()
            .with_config(config.clone())
            .unwrap();
        renderer.set_ui_features(ReportUiFeatures::new(config));
        renderer.render_report(&result(), &Element::new("main")).unwrap()
    }

    #[test]
    fn test_json_export_link() {
        let root = render(ReportConfig::new());
        let link = root.query_selector("[data-action=save-json]").unwrap().unwrap();
        let href = link.attribute("href").unwrap();
        let encoded = href.strip_prefix("data:application/json;base64,").unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        let roundtrip: ReportResult = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(roundtrip, result());
        assert_eq!(
            link.attribute("download").as_deref(),
            Some("example.com_2026-10-19_15-04-05.json")
        );
    }

    #[test]
    fn test_json_export_keeps_unmodeled_fields() {
        let input = json!({
            "requestedUrl": "https://example.com/",
            "finalUrl": "https://example.com/",
            "userAgent": "UA",
            "generatedTime": "2026-10-19T15:04:05Z",
            "lighthouseVersion": "6.0.0",
            "runtimeConfig": {"environment": [], "blockedUrlPatterns": []},
            "runWarnings": [],
            "timing": {"total": 2345.6},
            "reportCategories": [{
                "id": "best-practices", "name": "Best Practices", "score": 0.5,
                "manualDescription": "Check by hand.",
                "audits": [{
                    "id": "deprecations", "title": "Deprecations", "description": "",
                    "score": 0.0, "scoreDisplayMode": "binary", "rawValue": false,
                    "details": {
                        "type": "table",
                        "headings": [{"key": "value", "label": "Deprecation", "valueType": "text"}],
                        "items": [{"value": "document.write"}],
                        "summary": {"wastedMs": 40}
                    }
                }]
            }]
        });
        let result: ReportResult = serde_json::from_value(input.clone()).unwrap();
        let config = ReportConfig::new();
        let mut renderer = ReportRenderer::standard().with_config(config.clone()).unwrap();
        renderer.set_ui_features(ReportUiFeatures::new(config));
        let root = renderer.render_report(&result, &Element::new("main")).unwrap();

        let link = root.query_selector("[data-action=save-json]").unwrap().unwrap();
        let href = link.attribute("href").unwrap();
        let encoded = href.strip_prefix("data:application/json;base64,").unwrap();
        let exported: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(encoded).unwrap()).unwrap();

        assert_eq!(exported["timing"], json!({"total": 2345.6}));
        assert_eq!(exported["reportCategories"][0]["audits"][0]["rawValue"], false);
        assert_eq!(
            exported["reportCategories"][0]["audits"][0]["details"]["summary"],
            json!({"wastedMs": 40})
        );
        assert_eq!(exported, input);
    }

    #[test]
    fn test_disabled_export_removes_menu() {
        let config = ReportConfig::new().with_export(ExportConfig {
            enabled: false,
            ..ExportConfig::default()
        });
        let root = render(config);
        assert!(root.query_selector(&selector(hooks::EXPORT)).unwrap().is_none());
        assert!(root.query_selector("[data-action=save-json]").unwrap().is_none());
    }

    #[test]
    fn test_export_toggles() {
        let config = ReportConfig::new().with_export(ExportConfig {
            enabled: true,
            json: false,
            html: true,
            print: false,
        });
        let root = render(config);
        assert!(root.query_selector("[data-action=save-json]").unwrap().is_none());
        assert!(root.query_selector("[data-action=print-summary]").unwrap().is_none());
        assert!(root.query_selector("[data-action=save-html]").unwrap().is_some());
    }

    #[test]
    fn test_theme_class() {
        let root = render(ReportConfig::new().with_theme(ReportTheme::Dark));
        assert!(root.has_class("lh-dark"));
        let root = render(ReportConfig::new());
        assert_eq!(root.class_list(), vec![hooks::REPORT_CONTAINER, hooks::SOLO_CATEGORY]);
    }

    #[test]
    fn test_passed_section_open_state() {
        let root = render(ReportConfig::new());
        let passed = root.query_selector("details.lh-passed-audits").unwrap().unwrap();
        assert!(!passed.has_attribute("open"));

        let root = render(ReportConfig::new().with_collapse_passed_audits(false));
        let passed = root.query_selector("details.lh-passed-audits").unwrap().unwrap();
        assert!(passed.has_attribute("open"));
    }
}
