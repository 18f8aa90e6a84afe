//! Element tree.
//!
//! Elements are reference-counted handles: cloning an [`Element`] yields
//! another handle to the same node, so identity checks (`ptr_eq`,
//! `contains`) behave like they do in a browser DOM. Parents are held
//! weakly; a detached subtree is dropped once the last handle goes away.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use selectors::OpaqueElement;

use super::selector::{SelectorError, SelectorList};

/// Tag used for document fragments. Appending a fragment moves its children.
pub(crate) const FRAGMENT_TAG: &str = "#document-fragment";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub(crate) fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(crate) fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// A child node.
#[derive(Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    parent: Weak<RefCell<ElementData>>,
}

/// Shared handle to an element.
#[derive(Clone)]
pub struct Element(Rc<RefCell<ElementData>>);

impl Element {
    /// Create a detached element.
    pub fn new(tag: &str) -> Self {
        Element(Rc::new(RefCell::new(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    /// Create an empty document fragment.
    pub fn fragment() -> Self {
        Element::new(FRAGMENT_TAG)
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn is_fragment(&self) -> bool {
        self.0.borrow().tag == FRAGMENT_TAG
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn parent(&self) -> Option<Element> {
        self.0.borrow().parent.upgrade().map(Element)
    }

    // Attributes

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0
            .borrow()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.borrow().attributes.iter().any(|(key, _)| key == name)
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let mut data = self.0.borrow_mut();
        match data.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => data.attributes.push((name.to_ascii_lowercase(), value)),
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        self.0.borrow_mut().attributes.retain(|(key, _)| key != name);
    }

    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    pub fn class_list(&self) -> Vec<String> {
        self.attribute("class")
            .map(|classes| classes.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Add one or more space-separated classes.
    pub fn add_class(&self, classes: &str) {
        let mut list = self.class_list();
        for class in classes.split_whitespace() {
            if !list.iter().any(|c| c == class) {
                list.push(class.to_string());
            }
        }
        if !list.is_empty() {
            self.set_attribute("class", list.join(" "));
        }
    }

    pub fn remove_class(&self, class: &str) {
        let list: Vec<String> = self.class_list().into_iter().filter(|c| c != class).collect();
        if list.is_empty() {
            self.remove_attribute("class");
        } else {
            self.set_attribute("class", list.join(" "));
        }
    }

    // Tree

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child_elements(&self) -> Vec<Element> {
        self.0
            .borrow()
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Element(element) => Some(element.clone()),
                Node::Text(_) => None,
            })
            .collect()
    }

    pub fn first_element_child(&self) -> Option<Element> {
        self.child_elements().into_iter().next()
    }

    pub fn has_children(&self) -> bool {
        !self.0.borrow().children.is_empty()
    }

    pub fn previous_element_sibling(&self) -> Option<Element> {
        self.sibling_element(-1)
    }

    pub fn next_element_sibling(&self) -> Option<Element> {
        self.sibling_element(1)
    }

    fn sibling_element(&self, offset: isize) -> Option<Element> {
        let siblings = self.parent()?.child_elements();
        let index = siblings.iter().position(|sibling| sibling.ptr_eq(self))?;
        siblings.get(index.checked_add_signed(offset)?).cloned()
    }

    pub(crate) fn opaque_handle(&self) -> OpaqueElement {
        OpaqueElement::new(&*self.0)
    }

    /// Append `child`, detaching it from any previous parent.
    ///
    /// Appending a fragment moves the fragment's children instead and leaves
    /// the fragment empty. Returns the appended handle.
    pub fn append_child(&self, child: &Element) -> Element {
        if child.is_fragment() {
            let moved = std::mem::take(&mut child.0.borrow_mut().children);
            for node in moved {
                self.append_node(node);
            }
            return child.clone();
        }
        if child.contains(self) {
            debug_assert!(false, "cannot append an element into its own subtree");
            return child.clone();
        }
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0
            .borrow_mut()
            .children
            .push(Node::Element(child.clone()));
        child.clone()
    }

    pub fn append_node(&self, node: Node) {
        match node {
            Node::Element(element) => {
                self.append_child(&element);
            }
            Node::Text(text) => self.append_text(&text),
        }
    }

    /// Append an escaped text node.
    pub fn append_text(&self, text: &str) {
        if !text.is_empty() {
            self.0
                .borrow_mut()
                .children
                .push(Node::Text(text.to_string()));
        }
    }

    /// Detach from the parent, if any.
    pub fn remove(&self) {
        let parent = {
            let mut data = self.0.borrow_mut();
            let parent = data.parent.upgrade();
            data.parent = Weak::new();
            parent
        };
        if let Some(parent) = parent {
            parent.borrow_mut().children.retain(|node| match node {
                Node::Element(element) => !Rc::ptr_eq(&element.0, &self.0),
                Node::Text(_) => true,
            });
        }
    }

    pub fn clear_children(&self) {
        let old = std::mem::take(&mut self.0.borrow_mut().children);
        for node in old {
            if let Node::Element(element) = node {
                element.0.borrow_mut().parent = Weak::new();
            }
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text_content(&self, text: &str) {
        self.clear_children();
        self.append_text(text);
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in self.0.borrow().children.iter() {
            match node {
                Node::Element(element) => element.collect_text(out),
                Node::Text(text) => out.push_str(text),
            }
        }
    }

    /// Whether `other` is this element or one of its descendants.
    pub fn contains(&self, other: &Element) -> bool {
        let mut current = Some(other.clone());
        while let Some(element) = current {
            if element.ptr_eq(self) {
                return true;
            }
            current = element.parent();
        }
        false
    }

    /// Structural copy of this element and its subtree, detached.
    pub fn deep_clone(&self) -> Element {
        let data = self.0.borrow();
        let copy = Element::new(&data.tag);
        copy.0.borrow_mut().attributes = data.attributes.clone();
        for node in &data.children {
            match node {
                Node::Element(element) => {
                    copy.append_child(&element.deep_clone());
                }
                Node::Text(text) => copy.append_text(text),
            }
        }
        copy
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Element>) {
        for node in self.0.borrow().children.iter() {
            if let Node::Element(element) = node {
                out.push(element.clone());
                element.collect_descendants(out);
            }
        }
    }

    // Queries

    pub fn query_selector(&self, selector: &str) -> Result<Option<Element>, SelectorError> {
        let selectors = SelectorList::parse(selector)?;
        Ok(self
            .descendants()
            .into_iter()
            .find(|element| selectors.matches(element)))
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, SelectorError> {
        let selectors = SelectorList::parse(selector)?;
        Ok(self
            .descendants()
            .into_iter()
            .filter(|element| selectors.matches(element))
            .collect())
    }

    // Serialization

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.write_children(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let data = self.0.borrow();
        if data.tag == FRAGMENT_TAG {
            drop(data);
            self.write_children(out);
            return;
        }
        out.push('<');
        out.push_str(&data.tag);
        for (name, value) in &data.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&html_escape(value));
            out.push('"');
        }
        out.push('>');
        if is_void_element(&data.tag) {
            return;
        }
        drop(data);
        self.write_children(out);
        let data = self.0.borrow();
        out.push_str("</");
        out.push_str(&data.tag);
        out.push('>');
    }

    fn write_children(&self, out: &mut String) {
        let data = self.0.borrow();
        let raw = is_raw_text_element(&data.tag);
        for node in &data.children {
            match node {
                Node::Element(element) => element.write_html(out),
                Node::Text(text) if raw => out.push_str(text),
                Node::Text(text) => out.push_str(&html_escape(text)),
            }
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        let mut debug = f.debug_struct("Element");
        debug.field("tag", &data.tag);
        if let Some((_, class)) = data.attributes.iter().find(|(key, _)| key == "class") {
            debug.field("class", class);
        }
        debug.field("children", &data.children.len()).finish()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Element(element) => element.fmt(f),
            Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, class: &str) -> Element {
        let element = Element::new(tag);
        element.add_class(class);
        element
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape(r#""quoted""#), "&quot;quoted&quot;");
    }

    #[test]
    fn test_append_moves_between_parents() {
        let a = el("div", "a");
        let b = el("div", "b");
        let child = el("span", "c");
        a.append_child(&child);
        b.append_child(&child);
        assert!(!a.contains(&child));
        assert!(b.contains(&child));
        assert!(child.parent().unwrap().ptr_eq(&b));
        assert_eq!(a.child_elements().len(), 0);
    }

    #[test]
    fn test_fragment_append_moves_children() {
        let fragment = Element::fragment();
        fragment.append_child(&el("li", "one"));
        fragment.append_text("two");
        let list = Element::new("ul");
        list.append_child(&fragment);
        assert!(!fragment.has_children());
        assert_eq!(list.outer_html(), r#"<ul><li class="one"></li>two</ul>"#);
    }

    #[test]
    fn test_text_is_escaped_on_output() {
        let div = Element::new("div");
        div.set_text_content("<img src=x onerror=alert(1)>");
        assert_eq!(div.text_content(), "<img src=x onerror=alert(1)>");
        assert_eq!(
            div.outer_html(),
            "<div>&lt;img src=x onerror=alert(1)&gt;</div>"
        );
        assert!(div.child_elements().is_empty());
    }

    #[test]
    fn test_raw_text_elements_are_not_escaped() {
        let style = Element::new("style");
        style.append_text(".a > .b { color: red; }");
        assert_eq!(style.outer_html(), "<style>.a > .b { color: red; }</style>");
    }

    #[test]
    fn test_void_elements_have_no_close_tag() {
        let img = Element::new("img");
        img.set_attribute("src", "data:image/jpeg;base64,AAA=");
        assert_eq!(img.outer_html(), r#"<img src="data:image/jpeg;base64,AAA=">"#);
    }

    #[test]
    fn test_class_list_operations() {
        let div = el("div", "lh-audit");
        div.add_class("lh-audit--pass lh-audit");
        assert_eq!(div.class_list(), vec!["lh-audit", "lh-audit--pass"]);
        div.remove_class("lh-audit");
        assert!(!div.has_class("lh-audit"));
        assert!(div.has_class("lh-audit--pass"));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let root = el("div", "root");
        root.append_child(&el("span", "inner")).set_text_content("hi");
        let copy = root.deep_clone();
        assert!(!copy.ptr_eq(&root));
        assert_eq!(copy.outer_html(), root.outer_html());
        copy.first_element_child().unwrap().set_text_content("changed");
        assert_eq!(root.text_content(), "hi");
    }

    #[test]
    fn test_remove_and_contains() {
        let root = el("div", "root");
        let mid = root.append_child(&el("div", "mid"));
        let leaf = mid.append_child(&el("div", "leaf"));
        assert!(root.contains(&leaf));
        mid.remove();
        assert!(!root.contains(&leaf));
        assert!(mid.contains(&leaf));
        assert!(mid.parent().is_none());
    }

    #[test]
    fn test_element_siblings() {
        let list = el("ul", "list");
        let first = list.append_child(&el("li", "a"));
        list.append_text("gap");
        let second = list.append_child(&el("li", "b"));
        assert!(first.next_element_sibling().unwrap().ptr_eq(&second));
        assert!(second.previous_element_sibling().unwrap().ptr_eq(&first));
        assert!(first.previous_element_sibling().is_none());
        assert!(list.next_element_sibling().is_none());
    }

    #[test]
    fn test_clear_children_detaches() {
        let root = el("div", "root");
        let child = root.append_child(&el("p", "x"));
        root.clear_children();
        assert!(child.parent().is_none());
        assert!(!root.has_children());
    }
}
