//! Report configuration types.

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Report color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTheme {
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
    /// Auto-detect from system preference.
    #[default]
    Auto,
}

impl ReportTheme {
    /// Get the CSS class for this theme.
    pub fn css_class(&self) -> &'static str {
        match self {
            ReportTheme::Light => "lh-light",
            ReportTheme::Dark => "lh-dark",
            ReportTheme::Auto => "",
        }
    }
}

/// Export menu configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Show the export menu at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Offer the result as a JSON download.
    #[serde(default = "default_true")]
    pub json: bool,
    /// Offer saving the page as HTML.
    #[serde(default = "default_true")]
    pub html: bool,
    /// Offer a print action.
    #[serde(default = "default_true")]
    pub print: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            json: true,
            html: true,
            print: true,
        }
    }
}

/// Complete report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Custom page title.
    pub title: Option<String>,
    /// Color theme.
    #[serde(default)]
    pub theme: ReportTheme,
    /// Tool name shown in the footer and default title.
    #[serde(default = "default_tool_name")]
    pub tool_name: String,
    /// Category id rendered with the performance layout.
    #[serde(default = "default_performance_category_id")]
    pub performance_category_id: String,
    /// Start passed-audit sections collapsed.
    #[serde(default = "default_true")]
    pub collapse_passed_audits: bool,
    /// Export menu.
    #[serde(default)]
    pub export: ExportConfig,
    /// Minify standalone pages in release builds.
    #[serde(default = "default_true")]
    pub minify: bool,
}

fn default_schema_version() -> String {
    "1.0.0".to_string()
}

fn default_tool_name() -> String {
    "Lighthouse".to_string()
}

fn default_performance_category_id() -> String {
    "performance".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            title: None,
            theme: ReportTheme::default(),
            tool_name: default_tool_name(),
            performance_category_id: default_performance_category_id(),
            collapse_passed_audits: true,
            export: ExportConfig::default(),
            minify: true,
        }
    }
}

impl ReportConfig {
    /// Create a new report configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the theme.
    pub fn with_theme(mut self, theme: ReportTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = name.into();
        self
    }

    pub fn with_performance_category_id(mut self, id: impl Into<String>) -> Self {
        self.performance_category_id = id.into();
        self
    }

    pub fn with_collapse_passed_audits(mut self, collapse: bool) -> Self {
        self.collapse_passed_audits = collapse;
        self
    }

    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }

    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Page title, falling back to "<tool> Report".
    pub fn page_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("{} Report", self.tool_name))
    }

    /// Check that required fields are usable.
    pub fn validate(&self) -> Result<()> {
        if self.tool_name.trim().is_empty() {
            return Err(ReportError::InvalidConfig("tool_name must not be empty".into()));
        }
        if self.performance_category_id.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "performance_category_id must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Load configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
