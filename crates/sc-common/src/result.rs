//! Top-level audit result.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::category::{Category, ReportGroup};

/// One environment descriptor shown in the report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentEntry {
    /// Setting name, e.g. "Device Emulation".
    pub name: String,
    /// Human-readable value of the setting.
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Runtime settings the audit ran with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Environment descriptors, in display order.
    #[serde(default)]
    pub environment: Vec<EnvironmentEntry>,
    /// Settings the renderer does not read, kept for export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Complete, already-scored audit result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    /// URL as originally requested, before any redirect.
    pub requested_url: String,
    /// URL after redirects were followed.
    pub final_url: String,
    /// User agent string the page was loaded with.
    pub user_agent: String,
    /// When the result was produced.
    #[serde(alias = "fetchTime")]
    pub generated_time: DateTime<Utc>,
    /// Version of the tool that produced the result.
    #[serde(rename = "lighthouseVersion", default)]
    pub tool_version: String,
    /// Runtime settings.
    #[serde(default)]
    pub runtime_config: RuntimeConfig,
    /// Top-level warnings raised while producing the result.
    #[serde(default)]
    pub run_warnings: Vec<String>,
    /// Scored categories, in display order.
    #[serde(default)]
    pub report_categories: Vec<Category>,
    /// Audit group metadata keyed by group id.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub report_groups: IndexMap<String, ReportGroup>,
    /// Fields the renderer does not read (timings, i18n data and the like),
    /// kept so an exported result matches its input.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportResult {
    /// Whether the final URL differs from the requested one.
    pub fn was_redirected(&self) -> bool {
        self.requested_url != self.final_url
    }

    /// Look up a report group by id.
    pub fn group(&self, id: &str) -> Option<&ReportGroup> {
        self.report_groups.get(id)
    }

    /// Total number of audits across all categories.
    pub fn audit_count(&self) -> usize {
        self.report_categories.iter().map(|c| c.audits.len()).sum()
    }
}
