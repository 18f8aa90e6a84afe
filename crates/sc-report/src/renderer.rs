//! Top-level report assembly.
//!
//! [`ReportRenderer`] builds header, navigation, warnings, category sections
//! and footer from a [`ReportResult`] and swaps the result into a caller
//! supplied container. The container is only touched once the whole report
//! has been built, so a fatal template error leaves any previous report in
//! place.

use indexmap::IndexMap;
use sc_common::{Category, ReportGroup, ReportResult};
use tracing::{info, warn};

use crate::category::{validate_category, CategoryRenderer, PerformanceCategoryRenderer};
use crate::config::ReportConfig;
use crate::details::DetailsRenderer;
use crate::dom::{Document, Dom, Element};
use crate::error::Result;
use crate::features::ReportUiFeatures;
use crate::hooks::{self, selector};
use crate::util::{calculate_rating, format_date_time, format_score};

/// Renders complete reports into a container element.
#[derive(Debug)]
pub struct ReportRenderer {
    dom: Dom,
    config: ReportConfig,
    category_renderer: CategoryRenderer,
    performance_renderer: PerformanceCategoryRenderer,
    ui_features: Option<ReportUiFeatures>,
}

impl ReportRenderer {
    /// Create a renderer over `dom`. The performance layout is built from
    /// the same collaborators as `category_renderer`.
    pub fn new(dom: Dom, category_renderer: CategoryRenderer) -> Self {
        let performance_renderer = PerformanceCategoryRenderer::new(category_renderer.clone());
        Self {
            dom,
            config: ReportConfig::default(),
            category_renderer,
            performance_renderer,
            ui_features: None,
        }
    }

    /// Renderer over the embedded report templates.
    pub fn standard() -> Self {
        let dom = Dom::new(Document::standard());
        let details = DetailsRenderer::new(dom.clone());
        let category_renderer = CategoryRenderer::new(dom.clone(), details);
        Self::new(dom, category_renderer)
    }

    pub fn with_config(mut self, config: ReportConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Interaction features applied to each newly rendered report.
    pub fn set_ui_features(&mut self, features: ReportUiFeatures) {
        self.ui_features = Some(features);
    }

    /// The document templates are currently cloned from.
    pub fn template_context(&self) -> Document {
        self.dom.document()
    }

    /// Clone templates from `document` on all subsequent renders.
    pub fn set_template_context(&mut self, document: Document) {
        self.dom.set_template_context(document);
    }

    /// Render `result` into `container`, replacing any report already there.
    ///
    /// Returns the root of the new report.
    pub fn render_report(&self, result: &ReportResult, container: &Element) -> Result<Element> {
        let report = self.render_report_tree(result)?;

        for previous in self.dom.find_all(&selector(hooks::REPORT_CONTAINER), container)? {
            previous.remove();
        }
        container.append_child(&report);

        if let Some(features) = &self.ui_features {
            features.init_features(result, &report)?;
        }

        info!(
            url = %result.final_url,
            categories = result.report_categories.len(),
            audits = result.audit_count(),
            warnings = result.run_warnings.len(),
            "Rendered report"
        );
        Ok(report)
    }

    fn render_report_tree(&self, result: &ReportResult) -> Result<Element> {
        let root = self.dom.create_element("div", Some(hooks::REPORT_CONTAINER));
        if result.report_categories.len() == 1 {
            root.add_class(hooks::SOLO_CATEGORY);
        }

        root.append_child(&self.render_report_header(result)?);
        root.append_child(&self.render_report_nav(result)?);

        let report = self.dom.create_child_of(&root, "div", Some(hooks::REPORT_BODY), &[]);
        if !result.run_warnings.is_empty() {
            report.append_child(&self.render_report_warnings(&result.run_warnings)?);
        }

        let categories = self.dom.create_child_of(&report, "div", Some(hooks::CATEGORIES), &[]);
        for category in &result.report_categories {
            categories.append_child(&self.render_category(category, &result.report_groups)?);
        }

        report.append_child(&self.render_report_footer(result)?);
        Ok(root)
    }

    fn render_category(
        &self,
        category: &Category,
        groups: &IndexMap<String, ReportGroup>,
    ) -> Result<Element> {
        let rendered = if category.id == self.config.performance_category_id {
            self.performance_renderer.render(category, groups)
        } else {
            self.category_renderer.render(category)
        };
        match rendered {
            Err(err) if err.is_item_defect() => {
                warn!(category_id = %category.id, error = %err, "Rendering malformed category placeholder");
                self.category_renderer.render_malformed_category(category, &err)
            }
            other => other,
        }
    }

    /// Header with URL, timestamp, runtime settings and export menu.
    ///
    /// The export menu is left as cloned; [`ReportUiFeatures`] configures or
    /// removes it.
    pub fn render_report_header(&self, result: &ReportResult) -> Result<Element> {
        let tmpl = self.dom.clone_template("#tmpl-lh-heading")?;

        let url = self.dom.find(&selector(hooks::METADATA_URL), &tmpl)?;
        self.dom.set_text_safe(&url, &result.final_url);
        url.set_attribute("href", result.final_url.as_str());
        if result.was_redirected() {
            url.set_attribute("title", format!("Redirected from {}", result.requested_url));
        }

        self.dom.set_text_safe(
            &self.dom.find(&selector(hooks::CONFIG_TIMESTAMP), &tmpl)?,
            &format_date_time(&result.generated_time),
        );
        self.dom.set_text_safe(
            &self.dom.find(&selector(hooks::USER_AGENT), &tmpl)?,
            &result.user_agent,
        );

        let env_list = self.dom.find(".lh-env__items", &tmpl)?;
        for entry in &result.runtime_config.environment {
            let item = self.dom.clone_template("#tmpl-lh-env__items")?;
            self.dom
                .set_text_safe(&self.dom.find(&selector(hooks::ENV_NAME), &item)?, &entry.name);
            self.dom.set_text_safe(
                &self.dom.find(&selector(hooks::ENV_DESCRIPTION), &item)?,
                &entry.description,
            );
            env_list.append_child(&item);
        }

        self.dom.find(".lh-header-container", &tmpl)
    }

    /// Left navigation with one entry per category.
    pub fn render_report_nav(&self, result: &ReportResult) -> Result<Element> {
        let nav = self.dom.create_element("nav", Some(hooks::LEFT_NAV));
        for category in &result.report_categories {
            let tmpl = self.dom.clone_template("#tmpl-lh-leftnav__items")?;
            let item = self.dom.find(&selector(hooks::LEFT_NAV_ITEM), &tmpl)?;
            item.set_attribute("href", format!("#{}", category.id));

            let name = if category.name.trim().is_empty() { &category.id } else { &category.name };
            self.dom
                .set_text_safe(&self.dom.find(&selector(hooks::LEFT_NAV_CATEGORY), &tmpl)?, name);

            let score = validate_category(category).ok().and(category.score);
            let score_el = self.dom.find(&selector(hooks::LEFT_NAV_SCORE), &tmpl)?;
            self.dom.set_text_safe(&score_el, &format_score(score));
            score_el.add_class(&format!("lh-score__value--{}", calculate_rating(score).as_str()));

            nav.append_child(&item);
        }
        Ok(nav)
    }

    /// Run warnings banner, one list item per warning.
    pub fn render_report_warnings(&self, warnings: &[String]) -> Result<Element> {
        let tmpl = self.dom.clone_template("#tmpl-lh-warnings--toplevel")?;
        self.dom.set_text_safe(
            &self.dom.find(".lh-warnings__msg", &tmpl)?,
            &format!("There were issues affecting this run of {}:", self.config.tool_name),
        );
        let banner = self.dom.find(&selector(hooks::RUN_WARNINGS), &tmpl)?;
        let list = self.dom.find("ul", &banner)?;
        for warning in warnings {
            let item_tmpl = self.dom.clone_template("#tmpl-lh-run-warning")?;
            let item = self.dom.find(".lh-run-warnings__item", &item_tmpl)?;
            self.dom.set_text_safe(&item, warning);
            list.append_child(&item);
        }
        Ok(banner)
    }

    /// Footer naming the tool, its version and the generation time.
    pub fn render_report_footer(&self, result: &ReportResult) -> Result<Element> {
        let tmpl = self.dom.clone_template("#tmpl-lh-footer")?;
        self.dom.set_text_safe(
            &self.dom.find(".lh-footer__tool", &tmpl)?,
            &self.config.tool_name,
        );
        self.dom.set_text_safe(
            &self.dom.find(".lh-footer__version", &tmpl)?,
            &result.tool_version,
        );
        self.dom.set_text_safe(
            &self.dom.find(".lh-footer__timestamp", &tmpl)?,
            &format_date_time(&result.generated_time),
        );
        self.dom.find(&selector(hooks::FOOTER), &tmpl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use serde_json::json;

    fn result(categories: serde_json::Value) -> ReportResult {
        serde_json::from_value(json!({
            "requestedUrl": "http://example.com",
            "finalUrl": "https://example.com/",
            "userAgent": "Mozilla/5.0 Test",
            "generatedTime": "2026-10-19T15:04:05Z",
            "lighthouseVersion": "6.0.0",
            "reportCategories": categories
        }))
        .unwrap()
    }

    #[test]
    fn test_solo_category_class() {
        let renderer = ReportRenderer::standard();
        let container = Element::new("main");
        let root = renderer
            .render_report(
                &result(json!([{"id": "seo", "name": "SEO", "score": 1, "audits": []}])),
                &container,
            )
            .unwrap();
        assert!(root.has_class(hooks::SOLO_CATEGORY));
    }

    #[test]
    fn test_performance_dispatch_by_config() {
        let renderer = ReportRenderer::standard()
            .with_config(ReportConfig::new().with_performance_category_id("speed"))
            .unwrap();
        let container = Element::new("main");
        let root = renderer
            .render_report(
                &result(json!([
                    {"id": "speed", "name": "Speed", "score": 0.5, "audits": []},
                    {"id": "performance", "name": "Perf", "score": 0.5, "audits": []}
                ])),
                &container,
            )
            .unwrap();
        let perf = root.query_selector_all(".lh-category--performance").unwrap();
        assert_eq!(perf.len(), 1);
        assert!(perf[0].query_selector("#speed").unwrap().is_some());
    }

    #[test]
    fn test_malformed_category_is_isolated() {
        let renderer = ReportRenderer::standard();
        let container = Element::new("main");
        let root = renderer
            .render_report(
                &result(json!([
                    {"id": "a", "name": "A", "score": 0.95, "audits": []},
                    {"id": "b", "name": "B", "score": 3.0, "audits": []},
                    {"id": "c", "name": "C", "score": 0.2, "audits": []}
                ])),
                &container,
            )
            .unwrap();
        let sections = root.query_selector_all(".lh-categories > .lh-category").unwrap();
        assert_eq!(sections.len(), 3);
        assert!(sections[1].has_class(hooks::CATEGORY_MALFORMED));
        let scores: Vec<_> = root
            .query_selector_all(".leftnav-item__score")
            .unwrap()
            .iter()
            .map(|s| s.text_content())
            .collect();
        assert_eq!(scores, vec!["95", "N/A", "20"]);
    }

    #[test]
    fn test_fatal_error_keeps_previous_report() {
        let mut renderer = ReportRenderer::standard();
        let container = Element::new("main");
        let data = result(json!([{"id": "seo", "name": "SEO", "score": 1, "audits": []}]));
        let first = renderer.render_report(&data, &container).unwrap();

        renderer.set_template_context(Document::empty());
        let err = renderer.render_report(&data, &container).unwrap_err();
        assert!(matches!(err, ReportError::TemplateNotFound { .. }));
        let roots = container.query_selector_all(".lh-container").unwrap();
        assert_eq!(roots.len(), 1);
        assert!(roots[0].ptr_eq(&first));
    }

    #[test]
    fn test_export_menu_left_to_ui_features() {
        let mut config = ReportConfig::new();
        config.export.enabled = false;
        let mut renderer = ReportRenderer::standard().with_config(config.clone()).unwrap();
        let header = renderer.render_report_header(&result(json!([]))).unwrap();
        assert!(header.query_selector(".lh-export").unwrap().is_some());

        renderer.set_ui_features(ReportUiFeatures::new(config));
        let root = renderer
            .render_report(&result(json!([])), &Element::new("main"))
            .unwrap();
        assert!(root.query_selector(".lh-export").unwrap().is_none());
    }

    #[test]
    fn test_redirect_noted_in_title() {
        let renderer = ReportRenderer::standard();
        let header = renderer.render_report_header(&result(json!([]))).unwrap();
        let url = header.query_selector(".lh-metadata__url").unwrap().unwrap();
        assert_eq!(url.attribute("title").as_deref(), Some("Redirected from http://example.com"));
    }
}
