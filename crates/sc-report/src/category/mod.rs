//! Category sections: score gauge, audit rows and audit groups.

mod performance;

pub use performance::{
    PerformanceCategoryRenderer, DIAGNOSTIC_GROUP, METRIC_GROUP, OPPORTUNITY_GROUP,
};

use sc_common::{Audit, Category, ReportGroup, ScoreDisplayMode};
use tracing::warn;

use crate::details::DetailsRenderer;
use crate::dom::{Dom, Element};
use crate::error::{ReportError, Result};
use crate::hooks;
use crate::util::{audit_rating, calculate_rating, format_score, score_percent, Rating};

/// Check the fields an audit row cannot be built without.
pub fn validate_audit(audit: &Audit) -> Result<()> {
    if audit.title.trim().is_empty() {
        return Err(ReportError::malformed_audit(&audit.id, "missing title"));
    }
    if let Some(score) = audit.score {
        if !(0.0..=1.0).contains(&score) {
            return Err(ReportError::malformed_audit(
                &audit.id,
                format!("score {score} outside [0, 1]"),
            ));
        }
    }
    if audit.score_display_mode.is_scored() && audit.score.is_none() {
        return Err(ReportError::malformed_audit(
            &audit.id,
            format!("{} audit has no score", audit.score_display_mode),
        ));
    }
    Ok(())
}

/// Check the fields a category section cannot be built without.
pub fn validate_category(category: &Category) -> Result<()> {
    if category.name.trim().is_empty() {
        return Err(ReportError::malformed_category(&category.id, "missing name"));
    }
    if let Some(score) = category.score {
        if !(0.0..=1.0).contains(&score) {
            return Err(ReportError::malformed_category(
                &category.id,
                format!("score {score} outside [0, 1]"),
            ));
        }
    }
    Ok(())
}

/// Renders category sections and audit rows.
#[derive(Debug, Clone)]
pub struct CategoryRenderer {
    dom: Dom,
    details: DetailsRenderer,
}

impl CategoryRenderer {
    pub fn new(dom: Dom, details: DetailsRenderer) -> Self {
        Self { dom, details }
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn details_renderer(&self) -> &DetailsRenderer {
        &self.details
    }

    /// Render a category section with every audit in original order.
    pub fn render(&self, category: &Category) -> Result<Element> {
        let (element, audit_list) = self.render_category_shell(category)?;
        for audit in &category.audits {
            audit_list.append_child(&self.render_audit(audit)?);
        }
        Ok(element)
    }

    /// Section skeleton with header and gauge; returns the section and its
    /// empty audit list.
    pub(crate) fn render_category_shell(&self, category: &Category) -> Result<(Element, Element)> {
        validate_category(category)?;
        let tmpl = self.dom.clone_template("#tmpl-lh-category")?;
        let element = self.dom.find(&hooks::selector(hooks::CATEGORY), &tmpl)?;

        let permalink = self.dom.find(".lh-permalink", &tmpl)?;
        permalink.set_attribute("id", category.id.as_str());

        self.dom
            .find(".lh-score__gauge", &tmpl)?
            .append_child(&self.render_score_gauge(category)?);
        self.dom.set_text_safe(
            &self.dom.find(".lh-category-header__title", &tmpl)?,
            &category.name,
        );
        let description = self.dom.find(".lh-category-header__description", &tmpl)?;
        match &category.description {
            Some(text) if !text.is_empty() => {
                description.append_child(&self.dom.convert_markdown_link_snippets(text));
            }
            _ => description.remove(),
        }

        let audit_list = self.dom.find(".lh-audit-list", &tmpl)?;
        Ok((element, audit_list))
    }

    /// Score gauge linking to the category section.
    pub fn render_score_gauge(&self, category: &Category) -> Result<Element> {
        self.render_gauge(&category.id, &category.name, category.score)
    }

    fn render_gauge(&self, id: &str, label: &str, score: Option<f64>) -> Result<Element> {
        let tmpl = self.dom.clone_template("#tmpl-lh-gauge")?;
        let wrapper = self.dom.find(".lh-gauge__wrapper", &tmpl)?;
        wrapper.set_attribute("href", format!("#{id}"));
        let gauge = self.dom.find(&hooks::selector(hooks::GAUGE), &tmpl)?;
        let percentage = self.dom.find(&hooks::selector(hooks::GAUGE_PERCENTAGE), &tmpl)?;

        let score = score.filter(|s| (0.0..=1.0).contains(s));
        match score {
            Some(score) => {
                gauge.set_attribute("data-progress", score_percent(score).to_string());
                wrapper.add_class(&format!(
                    "lh-gauge__wrapper--{}",
                    calculate_rating(Some(score)).as_str()
                ));
            }
            None => {
                wrapper.add_class("lh-gauge__wrapper--not-applicable");
                wrapper.set_attribute("title", "Not applicable");
            }
        }
        self.dom.set_text_safe(&percentage, &format_score(score));
        self.dom
            .set_text_safe(&self.dom.find(".lh-gauge__label", &tmpl)?, label);
        Ok(wrapper)
    }

    /// Render an audit row. A malformed audit becomes a marked placeholder
    /// row instead of failing the section.
    pub fn render_audit(&self, audit: &Audit) -> Result<Element> {
        match validate_audit(audit).and_then(|()| self.render_audit_row(audit)) {
            Err(err) if err.is_item_defect() => {
                warn!(audit_id = %audit.id, error = %err, "Rendering malformed audit placeholder");
                Ok(self.render_malformed_audit(audit, &err))
            }
            other => other,
        }
    }

    fn render_audit_row(&self, audit: &Audit) -> Result<Element> {
        let tmpl = self.dom.clone_template("#tmpl-lh-audit")?;
        let element = self.dom.find(&hooks::selector(hooks::AUDIT), &tmpl)?;
        element.set_attribute("id", audit.id.as_str());

        let rating = audit_rating(audit);
        element.add_class(&format!("lh-audit--{}", audit.score_display_mode.as_str()));
        element.add_class(&format!("lh-audit--{}", rating.as_str()));

        self.dom
            .find(".lh-audit__title", &tmpl)?
            .append_child(&self.dom.convert_markdown_code_snippets(&audit.title));
        self.dom
            .find(".lh-audit__description", &tmpl)?
            .append_child(&self.dom.convert_markdown_link_snippets(&audit.description));

        let display_text = self.dom.find(".lh-audit__display-text", &tmpl)?;
        if rating == Rating::Error {
            self.dom.set_text_safe(&display_text, "Error!");
            let message = match (&audit.error_message, audit.score_display_mode) {
                (Some(message), _) => message.clone(),
                (None, ScoreDisplayMode::Unknown) => "Unrecognized score display mode".to_string(),
                (None, _) => "Audit error".to_string(),
            };
            display_text.set_attribute("title", message.as_str());
            let error = self.dom.create_element("div", Some("lh-audit__error"));
            self.dom.set_text_safe(&error, &message);
            self.dom.find(".lh-audit__description", &tmpl)?.append_child(&error);
        } else if let Some(value) = &audit.display_value {
            self.dom.set_text_safe(&display_text, value);
        }

        let details_el = self.dom.find(&hooks::selector(hooks::AUDIT_DETAILS), &tmpl)?;
        if !audit.warnings.is_empty() {
            details_el.append_child(&self.render_audit_warnings(&audit.warnings));
        }
        if let Some(details) = &audit.details {
            details_el.append_child(&self.details.render(details)?);
        }

        Ok(element)
    }

    fn render_audit_warnings(&self, warnings: &[String]) -> Element {
        let container = self.dom.create_element("div", Some("lh-warnings"));
        let label = self.dom.create_child_of(&container, "span", Some("lh-warnings__msg"), &[]);
        let label_text = if warnings.len() == 1 { "Warning:" } else { "Warnings:" };
        self.dom.set_text_safe(&label, label_text);
        let list = self.dom.create_child_of(&container, "ul", None, &[]);
        for warning in warnings {
            let item = self.dom.create_child_of(&list, "li", None, &[]);
            self.dom.set_text_safe(&item, warning);
        }
        container
    }

    fn render_malformed_audit(&self, audit: &Audit, err: &ReportError) -> Element {
        let element = self.dom.create_element(
            "div",
            Some(format!("{} {}", hooks::AUDIT, hooks::AUDIT_MALFORMED).as_str()),
        );
        element.set_attribute("id", audit.id.as_str());
        element.set_attribute("data-error", err.to_string());
        let title = self.dom.create_child_of(&element, "span", Some("lh-audit__title"), &[]);
        let label = if audit.title.trim().is_empty() { &audit.id } else { &audit.title };
        self.dom.set_text_safe(&title, label);
        element
    }

    /// Placeholder section for a category that could not be rendered.
    pub fn render_malformed_category(&self, category: &Category, err: &ReportError) -> Result<Element> {
        let element = self.dom.create_element(
            "div",
            Some(format!("{} {}", hooks::CATEGORY, hooks::CATEGORY_MALFORMED).as_str()),
        );
        element.set_attribute("data-error", err.to_string());
        self.dom
            .create_child_of(&element, "span", Some("lh-permalink"), &[("id", category.id.as_str())]);

        let label = if category.name.trim().is_empty() { &category.id } else { &category.name };
        let header = self.dom.create_child_of(&element, "div", Some("lh-category-header"), &[]);
        let gauge_slot = self.dom.create_child_of(&header, "div", Some("lh-score__gauge"), &[]);
        gauge_slot.append_child(&self.render_gauge(&category.id, label, None)?);
        let title = self.dom.create_child_of(&header, "div", Some("lh-category-header__title"), &[]);
        self.dom.set_text_safe(&title, label);
        let message = self.dom.create_child_of(&element, "div", Some("lh-category__error"), &[]);
        self.dom.set_text_safe(&message, "This category could not be rendered.");
        Ok(element)
    }

    /// Container for a titled group of audits.
    ///
    /// Expandable groups are `<details>` elements. The item count slot
    /// (`.lh-audit-group__itemcount`) is left for the caller to fill.
    pub fn render_audit_group(
        &self,
        group: Option<&ReportGroup>,
        fallback_title: &str,
        expandable: bool,
    ) -> Element {
        let (tag, summary_tag) = if expandable { ("details", "summary") } else { ("div", "div") };
        let element = self.dom.create_element(tag, Some("lh-audit-group"));
        let summary = self.dom.create_child_of(&element, summary_tag, Some("lh-audit-group__summary"), &[]);
        let header = self.dom.create_child_of(&summary, "div", Some("lh-audit-group__header"), &[]);
        let title = self.dom.create_child_of(&header, "span", Some("lh-audit-group__title"), &[]);
        let title_text = group
            .map(|g| g.title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(fallback_title);
        self.dom.set_text_safe(&title, title_text);
        self.dom.create_child_of(&header, "span", Some("lh-audit-group__itemcount"), &[]);

        if let Some(description) = group.map(|g| g.description.as_str()).filter(|d| !d.is_empty()) {
            let desc = self.dom.create_child_of(&element, "div", Some("lh-audit-group__description"), &[]);
            desc.append_child(&self.dom.convert_markdown_link_snippets(description));
        }
        element
    }
}
