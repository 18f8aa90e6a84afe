//! Structured-document adapter.
//!
//! [`Dom`] is the only way renderers touch documents: it creates elements,
//! clones named templates out of the active template context, looks up
//! required elements inside cloned fragments, and writes untrusted strings
//! as escaped text.
//!
//! The template context is the document cloneable fragments come from. It
//! starts as the host document and can be swapped with
//! [`Dom::set_template_context`]; every renderer sharing this `Dom` sees the
//! switch on its next render.

mod document;
mod markup;
mod node;
mod selector;

pub use document::{Document, STANDARD_TEMPLATES};
pub use markup::{parse_document, parse_fragment};
pub use node::{html_escape, Element, Node};
pub use selector::{SelectorError, SelectorList};

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{ReportError, Result};

fn markdown_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)\s]*)\)").expect("valid markdown link regex"))
}

struct DomState {
    host: Document,
    template_context: RefCell<Document>,
}

/// Shared handle to the document adapter.
#[derive(Clone)]
pub struct Dom {
    state: Rc<DomState>,
}

impl Dom {
    /// Adapter over `document`, which is also the initial template context.
    pub fn new(document: Document) -> Self {
        Dom {
            state: Rc::new(DomState {
                template_context: RefCell::new(document.clone()),
                host: document,
            }),
        }
    }

    /// The active template context.
    pub fn document(&self) -> Document {
        self.state.template_context.borrow().clone()
    }

    /// The document this adapter was created over.
    pub fn host_document(&self) -> Document {
        self.state.host.clone()
    }

    /// Switch the source of cloneable templates for subsequent renders.
    pub fn set_template_context(&self, document: Document) {
        debug!(document_id = document.id(), "Switching template context");
        *self.state.template_context.borrow_mut() = document;
    }

    pub fn create_element(&self, tag: &str, class_name: Option<&str>) -> Element {
        let element = Element::new(tag);
        if let Some(class_name) = class_name {
            element.add_class(class_name);
        }
        element
    }

    /// Create an element, set `attrs` on it and append it to `parent`.
    pub fn create_child_of(
        &self,
        parent: &Element,
        tag: &str,
        class_name: Option<&str>,
        attrs: &[(&str, &str)],
    ) -> Element {
        let element = self.create_element(tag, class_name);
        for (name, value) in attrs {
            element.set_attribute(name, *value);
        }
        parent.append_child(&element)
    }

    pub fn create_fragment(&self) -> Element {
        Element::fragment()
    }

    /// Deep-copy the content of the named template from the active context.
    pub fn clone_template(&self, selector: &str) -> Result<Element> {
        let context = self.document();
        Self::clone_template_from(selector, &context)
    }

    /// Deep-copy the content of the named template from `context`.
    pub fn clone_template_from(selector: &str, context: &Document) -> Result<Element> {
        let template = context
            .template(selector)?
            .ok_or_else(|| ReportError::TemplateNotFound {
                selector: selector.to_string(),
            })?;
        let fragment = Element::fragment();
        for node in template.children() {
            match node {
                Node::Element(element) => {
                    fragment.append_child(&element.deep_clone());
                }
                Node::Text(text) => fragment.append_text(&text),
            }
        }
        Ok(fragment)
    }

    /// Find a required element under `root`.
    pub fn find(&self, selector: &str, root: &Element) -> Result<Element> {
        self.find_optional(selector, root)?
            .ok_or_else(|| ReportError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    /// Find an element under `root` that may legitimately be absent.
    pub fn find_optional(&self, selector: &str, root: &Element) -> Result<Option<Element>> {
        Ok(root.query_selector(selector)?)
    }

    pub fn find_all(&self, selector: &str, root: &Element) -> Result<Vec<Element>> {
        Ok(root.query_selector_all(selector)?)
    }

    /// Replace the content of `element` with `text` as a text node.
    pub fn set_text_safe(&self, element: &Element, text: &str) {
        element.set_text_content(text);
    }

    /// Render `text` with `[label](url)` snippets turned into links.
    ///
    /// Only `http:` and `https:` targets become anchors; other snippets keep
    /// just their label.
    pub fn convert_markdown_link_snippets(&self, text: &str) -> Element {
        let fragment = self.create_fragment();
        let mut last = 0;
        for captures in markdown_link_regex().captures_iter(text) {
            let (Some(whole), Some(label), Some(url)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                continue;
            };
            fragment.append_text(&text[last..whole.start()]);
            let url = url.as_str();
            if url.starts_with("https://") || url.starts_with("http://") {
                let anchor = self.create_child_of(
                    &fragment,
                    "a",
                    None,
                    &[("rel", "noopener"), ("target", "_blank"), ("href", url)],
                );
                self.set_text_safe(&anchor, label.as_str());
            } else {
                fragment.append_text(label.as_str());
            }
            last = whole.end();
        }
        fragment.append_text(&text[last..]);
        fragment
    }

    /// Render `text` with backtick-delimited spans wrapped in `<code>`.
    pub fn convert_markdown_code_snippets(&self, text: &str) -> Element {
        let fragment = self.create_fragment();
        for (index, segment) in text.split('`').enumerate() {
            if index % 2 == 1 {
                let code = self.create_child_of(&fragment, "code", None, &[]);
                self.set_text_safe(&code, segment);
            } else {
                fragment.append_text(segment);
            }
        }
        fragment
    }
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dom")
            .field("host", &self.state.host)
            .field("template_context", &*self.state.template_context.borrow())
            .finish()
    }
}
