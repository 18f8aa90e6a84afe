//! Tagged detail payloads attached to audits.
//!
//! A detail is keyed by its `type` field. Every detail keeps the JSON it was
//! read from, and serializes back to exactly that JSON. Payloads this model
//! understands are additionally parsed into a [`KnownDetail`]; anything else
//! (a newer detail type, or a known type with an invalid shape) is kept
//! unparsed so one odd payload never fails the whole result.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Detail type tags understood by [`KnownDetail`].
pub const KNOWN_DETAIL_TYPES: &[&str] = &[
    "text",
    "url",
    "code",
    "list",
    "table",
    "opportunity",
    "criticalrequestchain",
    "filmstrip",
    "node",
];

/// A detail payload, known or not.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    raw: Value,
    known: Option<KnownDetail>,
}

impl Detail {
    /// Wrap raw detail JSON, parsing it when the tag is understood.
    pub fn from_raw(raw: Value) -> Self {
        let known = match raw.get("type").and_then(Value::as_str) {
            Some(tag) if KnownDetail::is_known_tag(tag) => KnownDetail::deserialize(&raw).ok(),
            _ => None,
        };
        Detail { raw, known }
    }

    /// The JSON this detail was read from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The `type` tag, if one is present.
    pub fn type_tag(&self) -> Option<&str> {
        match &self.known {
            Some(known) => Some(known.type_tag()),
            None => self.raw.get("type").and_then(Value::as_str),
        }
    }

    pub fn as_known(&self) -> Option<&KnownDetail> {
        self.known.as_ref()
    }

    /// Whether this is a payload with a known tag that failed to parse.
    pub fn is_malformed(&self) -> bool {
        self.known.is_none() && self.type_tag().is_some_and(KnownDetail::is_known_tag)
    }
}

impl From<KnownDetail> for Detail {
    fn from(known: KnownDetail) -> Self {
        let raw = serde_json::to_value(&known).unwrap_or_default();
        Detail {
            raw,
            known: Some(known),
        }
    }
}

impl Serialize for Detail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Detail {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Detail::from_raw)
    }
}

/// Detail payloads the renderer has dedicated support for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KnownDetail {
    Text(TextDetail),
    Url(UrlDetail),
    Code(CodeDetail),
    List(ListDetail),
    Table(TableDetail),
    Opportunity(OpportunityDetail),
    CriticalRequestChain(CriticalRequestChainDetail),
    Filmstrip(FilmstripDetail),
    Node(NodeDetail),
}

impl KnownDetail {
    pub fn type_tag(&self) -> &'static str {
        match self {
            KnownDetail::Text(_) => "text",
            KnownDetail::Url(_) => "url",
            KnownDetail::Code(_) => "code",
            KnownDetail::List(_) => "list",
            KnownDetail::Table(_) => "table",
            KnownDetail::Opportunity(_) => "opportunity",
            KnownDetail::CriticalRequestChain(_) => "criticalrequestchain",
            KnownDetail::Filmstrip(_) => "filmstrip",
            KnownDetail::Node(_) => "node",
        }
    }

    pub fn is_known_tag(tag: &str) -> bool {
        KNOWN_DETAIL_TYPES.contains(&tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDetail {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlDetail {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeDetail {
    pub value: String,
}

/// Row-wise list of nested details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub items: Vec<Detail>,
}

/// How a table cell value is formatted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    #[default]
    Text,
    Url,
    Bytes,
    Ms,
    TimespanMs,
    Numeric,
    Code,
    Thumbnail,
    #[serde(other)]
    Unknown,
}

impl ValueType {
    /// Name used in the `lh-table-column--*` class hook.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::Url => "url",
            ValueType::Bytes => "bytes",
            ValueType::Ms => "ms",
            ValueType::TimespanMs => "timespanMs",
            ValueType::Numeric => "numeric",
            ValueType::Code => "code",
            ValueType::Thumbnail => "thumbnail",
            ValueType::Unknown => "text",
        }
    }
}

/// One table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableHeading {
    /// Key looked up in each item.
    pub key: String,
    /// Column label.
    #[serde(alias = "label", default)]
    pub text: String,
    #[serde(alias = "valueType", default)]
    pub item_type: ValueType,
    /// Rounding granularity for numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDetail {
    pub headings: Vec<TableHeading>,
    pub items: Vec<Map<String, Value>>,
}

/// Table of savings opportunities with overall estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityDetail {
    pub headings: Vec<TableHeading>,
    pub items: Vec<Map<String, Value>>,
    /// Estimated load time savings in milliseconds.
    #[serde(default)]
    pub overall_savings_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_savings_bytes: Option<f64>,
}

/// A network request in a critical request chain. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrcRequest {
    pub url: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_received_time: Option<f64>,
    #[serde(default)]
    pub transfer_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrcNode {
    pub request: CrcRequest,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, CrcNode>,
}

/// Summary of the slowest chain. Duration is in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongestChain {
    pub duration: f64,
    pub length: u32,
    pub transfer_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalRequestChainDetail {
    /// Root requests keyed by request id.
    pub chains: IndexMap<String, CrcNode>,
    pub longest_chain: LongestChain,
}

/// One screenshot in a filmstrip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmstripFrame {
    /// Milliseconds since navigation start.
    pub timing: f64,
    #[serde(default)]
    pub timestamp: f64,
    /// Base64-encoded JPEG.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmstripDetail {
    #[serde(default)]
    pub scale: f64,
    pub items: Vec<FilmstripFrame>,
}

/// Reference to a DOM node on the audited page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
