//! Stable CSS class hooks on rendered output.
//!
//! Interaction code and tests discover report elements through these
//! classes; they are part of the output contract.

/// Root of one rendered report. At most one exists per container.
pub const REPORT_CONTAINER: &str = "lh-container";
/// Report body holding warnings, categories and footer.
pub const REPORT_BODY: &str = "lh-report";
/// Sticky header.
pub const HEADER: &str = "lh-header";
/// Final URL link in the header.
pub const METADATA_URL: &str = "lh-metadata__url";
/// Formatted generation timestamp in the header.
pub const CONFIG_TIMESTAMP: &str = "lh-config__timestamp";
/// User agent value in the header.
pub const USER_AGENT: &str = "lh-env__item__ua";
pub const ENV_NAME: &str = "lh-env__name";
pub const ENV_DESCRIPTION: &str = "lh-env__description";
/// Export menu.
pub const EXPORT: &str = "lh-export";
/// Left navigation.
pub const LEFT_NAV: &str = "lh-leftnav";
pub const LEFT_NAV_ITEM: &str = "lh-leftnav__item";
pub const LEFT_NAV_CATEGORY: &str = "leftnav-item__category";
pub const LEFT_NAV_SCORE: &str = "leftnav-item__score";
/// Score gauge, present once in the nav and once per category section.
pub const GAUGE: &str = "lh-gauge";
pub const GAUGE_PERCENTAGE: &str = "lh-gauge__percentage";
/// Run warnings banner; absent when there are no warnings.
pub const RUN_WARNINGS: &str = "lh-run-warnings";
pub const CATEGORIES: &str = "lh-categories";
pub const CATEGORY: &str = "lh-category";
pub const CATEGORY_MALFORMED: &str = "lh-category--malformed";
pub const AUDIT: &str = "lh-audit";
pub const AUDIT_MALFORMED: &str = "lh-audit--malformed";
pub const AUDIT_DETAILS: &str = "lh-audit__details";
pub const FOOTER: &str = "lh-footer";
/// Added to the container when the report has a single category.
pub const SOLO_CATEGORY: &str = "lh-solo-category";

/// Selector for a class hook.
pub fn selector(class: &str) -> String {
    format!(".{class}")
}
