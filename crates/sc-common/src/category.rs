//! Categories, audits and audit groups.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::details::Detail;

/// How an audit's score should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreDisplayMode {
    /// Pass/fail.
    Binary,
    /// Score in `[0, 1]` shown as a number.
    Numeric,
    /// Informational only, never scored.
    Informative,
    /// Has to be checked by hand.
    Manual,
    /// Did not apply to the page.
    NotApplicable,
    /// The audit failed to run.
    Error,
    /// A mode this model does not know about.
    #[serde(other)]
    Unknown,
}

impl ScoreDisplayMode {
    /// Stable kebab-case name, also used in CSS class hooks.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreDisplayMode::Binary => "binary",
            ScoreDisplayMode::Numeric => "numeric",
            ScoreDisplayMode::Informative => "informative",
            ScoreDisplayMode::Manual => "manual",
            ScoreDisplayMode::NotApplicable => "not-applicable",
            ScoreDisplayMode::Error => "error",
            ScoreDisplayMode::Unknown => "unknown",
        }
    }

    /// Whether the audit carries a meaningful score.
    pub fn is_scored(&self) -> bool {
        matches!(self, ScoreDisplayMode::Binary | ScoreDisplayMode::Numeric)
    }
}

impl std::fmt::Display for ScoreDisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scored check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// Stable audit id.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Longer explanation; may contain markdown links and code spans.
    #[serde(default)]
    pub description: String,
    /// Score in `[0, 1]`, or `None` when not scored.
    #[serde(default)]
    pub score: Option<f64>,
    /// Presentation mode for the score.
    pub score_display_mode: ScoreDisplayMode,
    /// Pre-formatted headline value, e.g. "1.2 s".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    /// Raw measured value (milliseconds for timing metrics).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
    /// Group id within the owning category, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Why the audit errored, for `error` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Audit-level warnings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Detail>,
    /// Fields the renderer does not read, such as `rawValue`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named, scored group of audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Identifying tag, used for anchors and renderer dispatch.
    pub id: String,
    /// Display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Score in `[0, 1]`, or `None` when not applicable.
    #[serde(default)]
    pub score: Option<f64>,
    /// Audits in display order.
    #[serde(default)]
    pub audits: Vec<Audit>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Category {
    /// Audits belonging to the given group, in original order.
    pub fn audits_in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Audit> + 'a {
        self.audits
            .iter()
            .filter(move |audit| audit.group.as_deref() == Some(group))
    }
}

/// Display metadata for an audit group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportGroup {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
