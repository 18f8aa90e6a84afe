//! Performance category layout.

use std::cmp::Ordering;

use indexmap::IndexMap;
use sc_common::{Audit, Category, Detail, KnownDetail, ReportGroup};

use super::{validate_audit, CategoryRenderer};
use crate::dom::Element;
use crate::error::Result;
use crate::util::{audit_rating, format_milliseconds, format_seconds, show_as_passed};

/// Group id of headline timing metrics.
pub const METRIC_GROUP: &str = "perf-metric";
/// Group id of load opportunities.
pub const OPPORTUNITY_GROUP: &str = "perf-hint";
/// Group id of diagnostics.
pub const DIAGNOSTIC_GROUP: &str = "perf-info";

/// Renders the performance category: metrics with timeline bars, the
/// filmstrip, opportunities ranked by savings, diagnostics and a collapsed
/// passed-audits section. Audits outside the performance groups render as
/// in the base layout.
#[derive(Debug, Clone)]
pub struct PerformanceCategoryRenderer {
    base: CategoryRenderer,
}

impl PerformanceCategoryRenderer {
    pub fn new(base: CategoryRenderer) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &CategoryRenderer {
        &self.base
    }

    pub fn render(
        &self,
        category: &Category,
        groups: &IndexMap<String, ReportGroup>,
    ) -> Result<Element> {
        let dom = self.base.dom();
        let (element, audit_list) = self.base.render_category_shell(category)?;
        element.add_class("lh-category--performance");

        let filmstrip = category.audits.iter().find(|audit| {
            matches!(
                audit.details.as_ref().and_then(Detail::as_known),
                Some(KnownDetail::Filmstrip(_))
            )
        });
        let is_filmstrip = |audit: &Audit| filmstrip.is_some_and(|f| std::ptr::eq(f, audit));

        let metrics: Vec<&Audit> = category
            .audits_in_group(METRIC_GROUP)
            .filter(|audit| !is_filmstrip(audit))
            .collect();
        if !metrics.is_empty() {
            let group = self.base.render_audit_group(groups.get(METRIC_GROUP), "Metrics", false);
            group.add_class("lh-audit-group--metrics");
            let container = dom.create_child_of(&group, "div", Some("lh-metrics-container"), &[]);
            let slowest = metrics
                .iter()
                .filter_map(|m| m.numeric_value)
                .filter(|v| v.is_finite())
                .fold(0.0_f64, f64::max);
            for metric in &metrics {
                container.append_child(&self.render_metric(metric, slowest)?);
            }
            audit_list.append_child(&group);
        }

        if let Some(details) = filmstrip.and_then(|audit| audit.details.as_ref()) {
            let container = dom.create_child_of(&audit_list, "div", Some("lh-filmstrip-container"), &[]);
            container.append_child(&self.base.details_renderer().render(details)?);
        }

        let in_group = |audit: &Audit, group: &str| {
            audit.group.as_deref() == Some(group) && !is_filmstrip(audit)
        };

        let mut opportunities: Vec<&Audit> = category
            .audits
            .iter()
            .filter(|a| in_group(a, OPPORTUNITY_GROUP) && !show_as_passed(a))
            .collect();
        opportunities.sort_by(|a, b| {
            estimated_savings_ms(b)
                .partial_cmp(&estimated_savings_ms(a))
                .unwrap_or(Ordering::Equal)
        });
        if !opportunities.is_empty() {
            let group = self.base.render_audit_group(
                groups.get(OPPORTUNITY_GROUP),
                "Opportunities",
                false,
            );
            group.add_class("lh-audit-group--load-opportunities");
            let header = dom.create_child_of(&group, "div", Some("lh-load-opportunity__header"), &[]);
            let col = dom.create_child_of(&header, "div", Some("lh-load-opportunity__col"), &[]);
            dom.set_text_safe(&col, "Opportunity");
            let col = dom.create_child_of(&header, "div", Some("lh-load-opportunity__col"), &[]);
            dom.set_text_safe(&col, "Estimated Savings");

            let max_savings = opportunities
                .iter()
                .map(|a| estimated_savings_ms(a))
                .fold(0.0_f64, f64::max);
            let scale = ((max_savings / 1000.0).ceil() * 1000.0).max(1000.0);
            for audit in &opportunities {
                group.append_child(&self.render_opportunity(audit, scale)?);
            }
            audit_list.append_child(&group);
        }

        let diagnostics: Vec<&Audit> = category
            .audits
            .iter()
            .filter(|a| in_group(a, DIAGNOSTIC_GROUP) && !show_as_passed(a))
            .collect();
        if !diagnostics.is_empty() {
            let group =
                self.base
                    .render_audit_group(groups.get(DIAGNOSTIC_GROUP), "Diagnostics", false);
            group.add_class("lh-audit-group--diagnostics");
            for audit in &diagnostics {
                group.append_child(&self.base.render_audit(audit)?);
            }
            audit_list.append_child(&group);
        }

        let performance_group = |audit: &Audit| {
            matches!(
                audit.group.as_deref(),
                Some(METRIC_GROUP | OPPORTUNITY_GROUP | DIAGNOSTIC_GROUP)
            )
        };
        for audit in category
            .audits
            .iter()
            .filter(|a| !performance_group(a) && !is_filmstrip(a))
        {
            audit_list.append_child(&self.base.render_audit(audit)?);
        }

        let passed: Vec<&Audit> = category
            .audits
            .iter()
            .filter(|a| {
                (in_group(a, OPPORTUNITY_GROUP) || in_group(a, DIAGNOSTIC_GROUP)) && show_as_passed(a)
            })
            .collect();
        if !passed.is_empty() {
            let group = self.base.render_audit_group(None, "Passed audits", true);
            group.add_class("lh-passed-audits");
            if let Some(count) = dom.find_optional(".lh-audit-group__itemcount", &group)? {
                dom.set_text_safe(&count, &format!("({})", passed.len()));
            }
            for audit in &passed {
                group.append_child(&self.base.render_audit(audit)?);
            }
            audit_list.append_child(&group);
        }

        Ok(element)
    }

    /// A metric tile with a timeline bar relative to the slowest metric.
    fn render_metric(&self, audit: &Audit, slowest_ms: f64) -> Result<Element> {
        if validate_audit(audit).is_err() {
            return self.base.render_audit(audit);
        }
        let dom = self.base.dom();
        let element = dom.create_element(
            "div",
            Some(format!("lh-metric lh-metric--{}", audit_rating(audit).as_str()).as_str()),
        );
        element.set_attribute("id", audit.id.as_str());

        let inner = dom.create_child_of(&element, "div", Some("lh-metric__innerwrap"), &[]);
        let title = dom.create_child_of(&inner, "span", Some("lh-metric__title"), &[]);
        title.append_child(&dom.convert_markdown_code_snippets(&audit.title));
        let value = dom.create_child_of(&inner, "div", Some("lh-metric__value"), &[]);
        let value_text = match (&audit.display_value, audit.numeric_value) {
            (Some(text), _) => text.clone(),
            (None, Some(ms)) => format_milliseconds(ms, None),
            (None, None) => String::new(),
        };
        dom.set_text_safe(&value, &value_text);

        let timeline = dom.create_child_of(&element, "div", Some("lh-metric__timeline"), &[]);
        let width = match audit.numeric_value {
            Some(ms) if slowest_ms > 0.0 && ms.is_finite() => (ms / slowest_ms * 100.0).clamp(0.0, 100.0),
            _ => 0.0,
        };
        dom.create_child_of(
            &timeline,
            "span",
            Some("lh-metric__bar"),
            &[("style", format!("width: {width:.1}%").as_str())],
        );
        Ok(element)
    }

    /// An audit row with a savings sparkline on a whole-second scale.
    fn render_opportunity(&self, audit: &Audit, scale_ms: f64) -> Result<Element> {
        let element = self.base.render_audit(audit)?;
        if element.has_class(crate::hooks::AUDIT_MALFORMED) {
            return Ok(element);
        }
        let dom = self.base.dom();
        element.add_class("lh-load-opportunity");

        let savings = estimated_savings_ms(audit);
        let header = dom.find(".lh-audit__header", &element)?;
        let cols = dom.create_child_of(&header, "div", Some("lh-load-opportunity__cols"), &[]);
        let sparkline_col = dom.create_child_of(&cols, "div", Some("lh-load-opportunity__col--one"), &[]);
        let sparkline = dom.create_child_of(&sparkline_col, "div", Some("lh-sparkline"), &[]);
        let width = (savings / scale_ms * 100.0).clamp(0.0, 100.0);
        let bar = dom.create_child_of(
            &sparkline,
            "div",
            Some("lh-sparkline__bar"),
            &[("style", format!("width: {width:.1}%").as_str())],
        );
        bar.set_attribute("title", format_milliseconds(savings, None));

        let stat_col = dom.create_child_of(&cols, "div", Some("lh-load-opportunity__col--two"), &[]);
        let stat = dom.create_child_of(&stat_col, "div", Some("lh-load-opportunity__wasted-stat"), &[]);
        dom.set_text_safe(&stat, &format_seconds(savings, Some(0.01)));
        Ok(element)
    }
}

/// Estimated savings of an opportunity in milliseconds.
fn estimated_savings_ms(audit: &Audit) -> f64 {
    let savings = match audit.details.as_ref().and_then(Detail::as_known) {
        Some(KnownDetail::Opportunity(opportunity)) => opportunity.overall_savings_ms,
        _ => audit.numeric_value.unwrap_or(0.0),
    };
    if savings.is_finite() {
        savings
    } else {
        0.0
    }
}
