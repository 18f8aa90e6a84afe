//! HTML report renderer for scored audit results.
//!
//! Turns a [`ReportResult`](sc_common::ReportResult) into a navigable report
//! tree built from cloneable templates, and optionally wraps it into a
//! self-contained HTML page.
//!
//! # Layout
//!
//! - Header: final URL, generation time, runtime settings, export menu
//! - Left navigation: one entry and mini gauge per category
//! - Run warnings: only present when the run produced warnings
//! - Category sections: score gauge and audit rows, with a dedicated
//!   layout for the performance category
//! - Footer: tool name, version and generation time
//!
//! Rendered elements carry the stable class hooks listed in [`hooks`].
//!
//! # Example
//!
//! ```
//! use sc_report::dom::Element;
//! use sc_report::ReportRenderer;
//!
//! let result: sc_common::ReportResult = serde_json::from_str(r#"{
//!     "requestedUrl": "http://example.com",
//!     "finalUrl": "https://example.com/",
//!     "userAgent": "Mozilla/5.0",
//!     "generatedTime": "2026-10-19T15:04:05Z",
//!     "reportCategories": [{"id": "seo", "name": "SEO", "score": 0.9, "audits": []}]
//! }"#).unwrap();
//!
//! let renderer = ReportRenderer::standard();
//! let container = Element::new("main");
//! let report = renderer.render_report(&result, &container).unwrap();
//! assert!(report.has_class("lh-container"));
//! ```

pub mod category;
pub mod config;
pub mod details;
pub mod dom;
pub mod error;
pub mod features;
pub mod generator;
pub mod hooks;
pub mod renderer;
pub mod util;

pub use category::{CategoryRenderer, PerformanceCategoryRenderer};
pub use config::{ExportConfig, ReportConfig, ReportTheme};
pub use details::DetailsRenderer;
pub use dom::{Document, Dom, Element};
pub use error::{ReportError, Result};
pub use features::ReportUiFeatures;
pub use generator::ReportGenerator;
pub use renderer::ReportRenderer;
