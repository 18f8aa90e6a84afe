//! Audit detail rendering.
//!
//! [`DetailsRenderer::render`] dispatches on the detail's type tag. Unknown
//! tags and payloads that fail to parse yield an empty fragment so newer
//! result formats still render.

mod crc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use sc_common::{
    Detail, FilmstripDetail, KnownDetail, ListDetail, NodeDetail, TableHeading, ValueType,
};

use crate::dom::{Dom, Element};
use crate::error::{ReportError, Result};
use crate::util::{
    format_bytes_to_kb, format_milliseconds, format_number, format_seconds, parse_url,
};

/// Renders detail payloads into fragments.
#[derive(Debug, Clone)]
pub struct DetailsRenderer {
    dom: Dom,
}

impl DetailsRenderer {
    pub fn new(dom: Dom) -> Self {
        Self { dom }
    }

    /// Render a detail payload.
    ///
    /// Data defects in the payload are logged and produce an empty
    /// fragment; only template defects are returned as errors.
    pub fn render(&self, detail: &Detail) -> Result<Element> {
        let rendered = match detail.as_known() {
            Some(known) => self.render_known(known),
            None => Err(unrendered_reason(detail.raw())),
        };
        match rendered {
            Err(err) if err.is_item_defect() => {
                if detail.as_known().is_none() && !detail.is_malformed() {
                    debug!(error = %err, "Skipping unknown detail type");
                } else {
                    warn!(error = %err, "Skipping malformed detail");
                }
                Ok(self.dom.create_fragment())
            }
            other => other,
        }
    }

    fn render_known(&self, detail: &KnownDetail) -> Result<Element> {
        match detail {
            KnownDetail::Text(text) => Ok(self.render_text(&text.value)),
            KnownDetail::Url(url) => Ok(self.render_text_url(&url.value)),
            KnownDetail::Code(code) => Ok(self.render_code(&code.value)),
            KnownDetail::List(list) => self.render_list(list),
            KnownDetail::Table(table) => self.render_table(&table.headings, &table.items),
            KnownDetail::Opportunity(opportunity) => {
                self.render_table(&opportunity.headings, &opportunity.items)
            }
            KnownDetail::CriticalRequestChain(chain) => crc::render(&self.dom, chain),
            KnownDetail::Filmstrip(filmstrip) => self.render_filmstrip(filmstrip),
            KnownDetail::Node(node) => Ok(self.render_node(node)),
        }
    }

    fn render_text(&self, text: &str) -> Element {
        let element = self.dom.create_element("div", Some("lh-text"));
        self.dom.set_text_safe(&element, text);
        element
    }

    /// A URL shown as its path with the host in parentheses.
    fn render_text_url(&self, url: &str) -> Element {
        let (display_path, display_host) = match parse_url(url) {
            Some(parts) if parts.file == "/" => (parts.origin, None),
            Some(parts) => (parts.file, Some(format!("({})", parts.hostname))),
            None => (url.to_string(), None),
        };

        let element = self.dom.create_element("div", Some("lh-text__url"));
        element.set_attribute("title", url);
        element.append_child(&self.render_text(&display_path));
        if let Some(host) = display_host {
            let host_el = self.render_text(&host);
            host_el.add_class("lh-text__url-host");
            element.append_child(&host_el);
        }
        element
    }

    fn render_code(&self, text: &str) -> Element {
        let pre = self.dom.create_element("pre", Some("lh-code"));
        self.dom.set_text_safe(&pre, text);
        pre
    }

    fn render_thumbnail(&self, src: &str) -> Option<Element> {
        let allowed = src.starts_with("https://")
            || src.starts_with("http://")
            || src.starts_with("data:image/");
        if !allowed {
            return None;
        }
        let img = self.dom.create_element("img", Some("lh-thumbnail"));
        img.set_attribute("src", src);
        img.set_attribute("title", src);
        img.set_attribute("alt", "");
        Some(img)
    }

    fn render_list(&self, list: &ListDetail) -> Result<Element> {
        let container = self.dom.create_element("div", Some("lh-details lh-list"));
        if let Some(header) = &list.header {
            let header_el = self.dom.create_child_of(&container, "div", Some("lh-list__header"), &[]);
            self.dom.set_text_safe(&header_el, header);
        }
        let items = self.dom.create_child_of(&container, "div", Some("lh-list__items"), &[]);
        for item in &list.items {
            items.append_child(&self.render(item)?);
        }
        Ok(container)
    }

    fn render_table(&self, headings: &[TableHeading], items: &[Map<String, Value>]) -> Result<Element> {
        if items.is_empty() || headings.is_empty() {
            return Ok(self.dom.create_fragment());
        }

        let table = self.dom.create_element("table", Some("lh-table lh-details"));
        let header_row = self.dom.create_child_of(&table, "thead", None, &[]);
        let header_row = self.dom.create_child_of(&header_row, "tr", None, &[]);
        for heading in headings {
            let class = format!("lh-table-column--{}", heading.item_type.as_str());
            let th = self.dom.create_child_of(&header_row, "th", Some(class.as_str()), &[]);
            let label = self.dom.create_child_of(&th, "div", Some("lh-text"), &[]);
            self.dom.set_text_safe(&label, &heading.text);
        }

        let body = self.dom.create_child_of(&table, "tbody", None, &[]);
        for (index, item) in items.iter().enumerate() {
            let row_class = if index % 2 == 0 { "lh-row--even" } else { "lh-row--odd" };
            let row = self.dom.create_child_of(&body, "tr", Some(row_class), &[]);
            for heading in headings {
                row.append_child(&self.render_cell(heading, item.get(&heading.key))?);
            }
        }
        Ok(table)
    }

    fn render_cell(&self, heading: &TableHeading, value: Option<&Value>) -> Result<Element> {
        let value = match value {
            None | Some(Value::Null) => {
                return Ok(self.dom.create_element("td", Some("lh-table-column--empty")));
            }
            Some(value) => value,
        };

        let class = format!("lh-table-column--{}", heading.item_type.as_str());
        let td = self.dom.create_element("td", Some(class.as_str()));

        // Cells may hold a nested detail such as a node or code snippet.
        if value.get("type").is_some_and(Value::is_string) {
            let detail: Detail = serde_json::from_value(value.clone())?;
            td.append_child(&self.render(&detail)?);
            return Ok(td);
        }

        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let number = value.as_f64();
        let content = match (heading.item_type, number) {
            (ValueType::Url, _) => self.render_text_url(&text),
            (ValueType::Code, _) => self.render_code(&text),
            (ValueType::Thumbnail, _) => match self.render_thumbnail(&text) {
                Some(img) => img,
                None => return Ok(self.dom.create_element("td", Some("lh-table-column--empty"))),
            },
            (ValueType::Bytes, Some(bytes)) => {
                let el = self.render_text(&format_bytes_to_kb(bytes, heading.granularity));
                el.set_attribute("title", format_number(bytes, 1.0) + " bytes");
                el
            }
            (ValueType::Ms | ValueType::TimespanMs, Some(ms)) => {
                self.render_text(&format_milliseconds(ms, heading.granularity))
            }
            (ValueType::Numeric, Some(n)) => {
                self.render_text(&format_number(n, heading.granularity.unwrap_or(1.0)))
            }
            _ => self.render_text(&text),
        };
        td.append_child(&content);
        Ok(td)
    }

    fn render_filmstrip(&self, filmstrip: &FilmstripDetail) -> Result<Element> {
        let strip = self.dom.create_element("div", Some("lh-filmstrip"));
        for frame in &filmstrip.items {
            if STANDARD.decode(frame.data.as_bytes()).is_err() {
                return Err(ReportError::MalformedDetail {
                    kind: "filmstrip".to_string(),
                    reason: format!("frame at {}ms is not valid base64", frame.timing),
                });
            }
            let frame_el = self.dom.create_child_of(&strip, "div", Some("lh-filmstrip__frame"), &[]);
            let timestamp = self.dom.create_child_of(&frame_el, "div", Some("lh-filmstrip__timestamp"), &[]);
            self.dom.set_text_safe(&timestamp, &format_seconds(frame.timing, None));
            let src = format!("data:image/jpeg;base64,{}", frame.data);
            self.dom.create_child_of(
                &frame_el,
                "img",
                Some("lh-filmstrip__thumbnail"),
                &[("src", src.as_str()), ("alt", "Screenshot")],
            );
        }
        Ok(strip)
    }

    fn render_node(&self, node: &NodeDetail) -> Element {
        let element = self.dom.create_element("span", Some("lh-node"));
        if let Some(snippet) = &node.snippet {
            self.dom.set_text_safe(&element, snippet);
        }
        if let Some(selector) = &node.selector {
            element.set_attribute("title", selector.as_str());
        }
        if let Some(path) = &node.path {
            element.set_attribute("data-path", path.as_str());
        }
        element
    }
}

/// Explain why a raw payload did not parse as a known detail.
fn unrendered_reason(raw: &Value) -> ReportError {
    let kind = raw
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("<untyped>")
        .to_string();
    let reason = if KnownDetail::is_known_tag(&kind) {
        serde_json::from_value::<KnownDetail>(raw.clone())
            .err()
            .map(|err| err.to_string())
            .unwrap_or_else(|| "invalid payload".to_string())
    } else {
        "unknown detail type".to_string()
    };
    ReportError::MalformedDetail { kind, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use serde_json::json;

    fn renderer() -> DetailsRenderer {
        DetailsRenderer::new(Dom::new(Document::standard()))
    }

    fn detail(value: Value) -> Detail {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unknown_type_renders_empty_fragment() {
        let el = renderer()
            .render(&detail(json!({"type": "screenshot-v9", "data": [1, 2, 3]})))
            .unwrap();
        assert!(el.is_fragment());
        assert!(!el.has_children());
    }

    #[test]
    fn test_malformed_known_type_renders_empty_fragment() {
        let d = detail(json!({"type": "table", "headings": "nope"}));
        assert!(d.is_malformed());
        let el = renderer().render(&d).unwrap();
        assert!(el.is_fragment() && !el.has_children());
    }

    #[test]
    fn test_code_is_escaped() {
        let el = renderer()
            .render(&detail(json!({"type": "code", "value": "<script>x()</script>"})))
            .unwrap();
        assert_eq!(el.tag(), "pre");
        assert!(el.child_elements().is_empty());
        assert_eq!(el.text_content(), "<script>x()</script>");
    }

    #[test]
    fn test_url_splits_host() {
        let el = renderer()
            .render(&detail(json!({"type": "url", "value": "https://example.com/app.js"})))
            .unwrap();
        assert_eq!(el.attribute("title").as_deref(), Some("https://example.com/app.js"));
        let host = el.query_selector(".lh-text__url-host").unwrap().unwrap();
        assert_eq!(host.text_content(), "(example.com)");

        let root = renderer()
            .render(&detail(json!({"type": "url", "value": "https://example.com/"})))
            .unwrap();
        assert!(root.query_selector(".lh-text__url-host").unwrap().is_none());
        assert_eq!(root.text_content(), "https://example.com");
    }

    #[test]
    fn test_table_cells_by_value_type() {
        let el = renderer()
            .render(&detail(json!({
                "type": "table",
                "headings": [
                    {"key": "url", "itemType": "url", "text": "URL"},
                    {"key": "size", "itemType": "bytes", "text": "Size"},
                    {"key": "time", "itemType": "ms", "text": "Time"},
                    {"key": "thumb", "itemType": "thumbnail", "text": ""},
                    {"key": "node", "itemType": "code", "text": "Node"}
                ],
                "items": [
                    {"url": "https://example.com/a.js", "size": 20480, "time": 1234,
                     "thumb": "javascript:alert(1)", "node": {"type": "node", "snippet": "<div>", "selector": "div.a"}},
                    {"url": "https://example.com/b.js", "size": 1024, "time": null}
                ]
            })))
            .unwrap();
        assert_eq!(el.tag(), "table");
        assert_eq!(el.query_selector_all("th").unwrap().len(), 5);
        let rows = el.query_selector_all("tbody tr").unwrap();
        assert_eq!(rows.len(), 2);

        let first: Vec<_> = rows[0].child_elements();
        assert_eq!(first[1].text_content(), "20.0\u{a0}KB");
        assert_eq!(first[2].text_content(), "1,230\u{a0}ms");
        assert!(first[3].has_class("lh-table-column--empty"));
        let node = first[4].query_selector(".lh-node").unwrap().unwrap();
        assert_eq!(node.attribute("title").as_deref(), Some("div.a"));

        let second = rows[1].child_elements();
        assert!(second[2].has_class("lh-table-column--empty"));
        assert!(second[4].has_class("lh-table-column--empty"));
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        let el = renderer()
            .render(&detail(json!({"type": "opportunity", "headings": [], "items": [], "overallSavingsMs": 0})))
            .unwrap();
        assert!(el.is_fragment() && !el.has_children());
    }

    #[test]
    fn test_list_renders_items_and_isolates_bad_ones() {
        let el = renderer()
            .render(&detail(json!({
                "type": "list",
                "items": [
                    {"type": "text", "value": "one"},
                    {"type": "mystery"},
                    {"type": "code", "value": "two"}
                ]
            })))
            .unwrap();
        let items = el.query_selector(".lh-list__items").unwrap().unwrap();
        assert_eq!(items.child_elements().len(), 2);
        assert_eq!(items.text_content(), "onetwo");
    }

    #[test]
    fn test_filmstrip_frames() {
        let el = renderer()
            .render(&detail(json!({
                "type": "filmstrip",
                "scale": 3000,
                "items": [
                    {"timing": 300, "timestamp": 1.0, "data": "AAAA"},
                    {"timing": 600, "timestamp": 2.0, "data": "BBBB"}
                ]
            })))
            .unwrap();
        let imgs = el.query_selector_all("img.lh-filmstrip__thumbnail").unwrap();
        assert_eq!(imgs.len(), 2);
        assert_eq!(imgs[0].attribute("src").as_deref(), Some("data:image/jpeg;base64,AAAA"));
        let stamps = el.query_selector_all(".lh-filmstrip__timestamp").unwrap();
        assert_eq!(stamps[1].text_content(), "0.6\u{a0}s");
    }

    #[test]
    fn test_filmstrip_with_bad_frame_is_dropped() {
        let el = renderer()
            .render(&detail(json!({
                "type": "filmstrip",
                "items": [{"timing": 300, "data": "not base64!"}]
            })))
            .unwrap();
        assert!(el.is_fragment() && !el.has_children());
    }

    #[test]
    fn test_crc_requires_template() {
        let renderer = DetailsRenderer::new(Dom::new(Document::empty()));
        let err = renderer
            .render(&detail(json!({
                "type": "criticalrequestchain",
                "chains": {},
                "longestChain": {"duration": 0, "length": 0, "transferSize": 0}
            })))
            .unwrap_err();
        assert!(matches!(err, ReportError::TemplateNotFound { .. }));
    }
}
