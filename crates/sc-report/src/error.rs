//! Error types for report rendering.

use thiserror::Error;

use crate::dom::SelectorError;

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while rendering a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A cloneable fragment is missing from the active template context.
    #[error("template not found: {selector}")]
    TemplateNotFound { selector: String },

    /// A required element is missing from a cloned fragment.
    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    /// A selector string could not be parsed.
    #[error(transparent)]
    InvalidSelector(#[from] SelectorError),

    /// An audit detail payload has an unrecognized or invalid shape.
    #[error("malformed '{kind}' detail: {reason}")]
    MalformedDetail { kind: String, reason: String },

    /// An audit cannot be rendered from its data.
    #[error("malformed audit '{id}': {reason}")]
    MalformedAudit { id: String, reason: String },

    /// A category cannot be rendered from its data.
    #[error("malformed category '{id}': {reason}")]
    MalformedCategory { id: String, reason: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Page shell rendering error.
    #[error("template error: {0}")]
    TemplateError(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReportError {
    /// Whether this error is a defect in one data item rather than in the
    /// templates or the renderer itself.
    ///
    /// Item defects are isolated to the offending audit, category or detail;
    /// everything else aborts the render call.
    pub fn is_item_defect(&self) -> bool {
        matches!(
            self,
            ReportError::MalformedDetail { .. }
                | ReportError::MalformedAudit { .. }
                | ReportError::MalformedCategory { .. }
        )
    }

    pub(crate) fn malformed_audit(id: &str, reason: impl Into<String>) -> Self {
        ReportError::MalformedAudit {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_category(id: &str, reason: impl Into<String>) -> Self {
        ReportError::MalformedCategory {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<askama::Error> for ReportError {
    fn from(err: askama::Error) -> Self {
        ReportError::TemplateError(err.to_string())
    }
}
