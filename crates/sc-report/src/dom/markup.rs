//! HTML5 parsing into [`Element`] trees.
//!
//! Markup goes through `html5ever`'s tree builder, so template documents
//! get the same implied end tags, character references and `<template>`
//! content handling a browser applies. The resulting `RcDom` is copied into
//! the report's own mutable element tree. Whitespace-only text containing a
//! line break is treated as indentation and dropped.

use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::node::Element;

pub(crate) const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parse a complete document. The returned fragment holds the `<html>`
/// element.
pub fn parse_document(markup: &str) -> Element {
    let dom = html5ever::parse_document(RcDom::default(), ParseOpts::default()).one(markup);
    let root = Element::fragment();
    append_children(&root, &dom.document);
    root
}

/// Parse markup in a `<body>` context into a document fragment.
pub fn parse_fragment(markup: &str) -> Element {
    let context = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from("body"));
    let dom = html5ever::parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
        .one(markup);
    let fragment = Element::fragment();
    // Fragment output hangs off a synthetic <html> element.
    for html in dom.document.children.borrow().iter() {
        append_children(&fragment, html);
    }
    fragment
}

fn append_children(parent: &Element, node: &Handle) {
    for child in node.children.borrow().iter() {
        append_node(parent, child);
    }
}

fn append_node(parent: &Element, node: &Handle) {
    match &node.data {
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let element = Element::new(&name.local);
            for attr in attrs.borrow().iter() {
                element.set_attribute(&attr.name.local, attr.value.to_string());
            }
            let element = parent.append_child(&element);
            match template_contents.borrow().as_ref() {
                Some(contents) => append_children(&element, contents),
                None => append_children(&element, node),
            }
        }
        NodeData::Text { contents } => {
            let text = contents.borrow();
            if !is_indentation(&text) {
                parent.append_text(&text);
            }
        }
        _ => {}
    }
}

fn is_indentation(text: &str) -> bool {
    text.contains('\n') && text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_content_is_parsed() {
        let root = parse_document(
            r#"<template id="tmpl-a">
                <div class="outer"><span class='inner' hidden>Hi &amp; bye</span></div>
            </template>"#,
        );
        let template = root.query_selector("template#tmpl-a").unwrap().unwrap();
        let span = template.query_selector(".outer > .inner").unwrap().unwrap();
        assert_eq!(span.text_content(), "Hi & bye");
        assert!(span.has_attribute("hidden"));
    }

    #[test]
    fn test_implied_end_tags() {
        let root = parse_document(
            r#"<template id="t"><ul class="l"><li class="a">x<li class="b">y</ul></template>"#,
        );
        let items = root.query_selector_all("ul > li").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text_content(), "x");
        assert_eq!(items[1].text_content(), "y");
    }

    #[test]
    fn test_named_character_references() {
        let root = parse_fragment(r#"<div class="d" title="a&quot;b">Loading&hellip; &copy; 2026</div>"#);
        let div = root.query_selector(".d").unwrap().unwrap();
        assert_eq!(div.text_content(), "Loading\u{2026} \u{a9} 2026");
        assert_eq!(div.attribute("title").as_deref(), Some("a\"b"));
    }

    #[test]
    fn test_indentation_dropped_but_spaces_kept() {
        let root = parse_fragment("<p>\n  <b>a</b> <i>b</i>\n</p>");
        let p = root.first_element_child().unwrap();
        assert_eq!(p.text_content(), "a b");
        assert_eq!(p.child_elements().len(), 2);
    }

    #[test]
    fn test_void_elements() {
        let root = parse_fragment(r#"<div><img src="a.png"><br/><span/>x</div>"#);
        let div = root.first_element_child().unwrap();
        let tags: Vec<String> = div.child_elements().iter().map(Element::tag).collect();
        assert_eq!(tags, vec!["img", "br", "span"]);
        assert_eq!(div.text_content(), "x");
    }

    #[test]
    fn test_comments_and_doctype_skipped() {
        let root = parse_fragment("<!DOCTYPE html><!-- note --><p>ok</p>");
        assert_eq!(root.child_elements().len(), 1);
        assert_eq!(root.text_content(), "ok");
    }

    #[test]
    fn test_raw_text_style() {
        let root = parse_fragment("<style>.a > .b { color: red; }</style><p>x</p>");
        let style = root.first_element_child().unwrap();
        assert_eq!(style.text_content(), ".a > .b { color: red; }");
        assert_eq!(root.child_elements().len(), 2);
    }

    #[test]
    fn test_unterminated_markup_is_recovered() {
        let root = parse_fragment("<div>a</span>b");
        assert_eq!(root.first_element_child().unwrap().text_content(), "ab");
        assert!(parse_fragment("<!-- never closed").child_elements().is_empty());
    }

    #[test]
    fn test_document_has_body() {
        let root = parse_document("<p>x</p>");
        let body = root.query_selector("html > body").unwrap().unwrap();
        assert_eq!(body.text_content(), "x");
    }
}
