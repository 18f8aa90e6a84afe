//! Shared audit result model for the scorecard report renderer.
//!
//! The types here mirror the JSON document emitted by the audit pipeline:
//! a [`ReportResult`] holding an ordered list of scored [`Category`] values,
//! each of which owns an ordered list of [`Audit`] values with an optional
//! tagged [`Detail`] payload.
//!
//! Everything is plain data. Renderers only ever borrow these values, so a
//! result can be rendered any number of times without changing it.
//!
//! # Example
//!
//! ```
//! use sc_common::ReportResult;
//!
//! let json = r#"{
//!     "requestedUrl": "http://example.com",
//!     "finalUrl": "https://example.com/",
//!     "userAgent": "Mozilla/5.0",
//!     "generatedTime": "2026-10-19T15:04:05Z",
//!     "lighthouseVersion": "2.9.1",
//!     "runtimeConfig": { "environment": [] },
//!     "reportCategories": []
//! }"#;
//! let result: ReportResult = serde_json::from_str(json).unwrap();
//! assert!(result.was_redirected());
//! ```

pub mod category;
pub mod details;
pub mod result;

pub use category::{Audit, Category, ReportGroup, ScoreDisplayMode};
pub use details::{
    CodeDetail, CriticalRequestChainDetail, CrcNode, CrcRequest, Detail, FilmstripDetail,
    FilmstripFrame, KnownDetail, ListDetail, LongestChain, NodeDetail, OpportunityDetail,
    TableDetail, TableHeading, TextDetail, UrlDetail, ValueType,
};
pub use result::{EnvironmentEntry, ReportResult, RuntimeConfig};
