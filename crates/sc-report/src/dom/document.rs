//! Host documents and template sources.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::markup::parse_document;
use super::node::Element;
use super::selector::SelectorError;

/// Markup for the report's cloneable fragments.
pub const STANDARD_TEMPLATES: &str = include_str!("../../templates/report-templates.html");

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

struct DocumentData {
    id: u64,
    root: Element,
    body: Element,
}

/// A document: a tree with a `body` plus any `<template>` fragments.
///
/// Cloning yields another handle to the same document; equality is
/// identity.
#[derive(Clone)]
pub struct Document(Rc<DocumentData>);

impl Document {
    /// Parse a document from markup. A missing `body` is created.
    pub fn parse(markup: &str) -> Self {
        let root = parse_document(markup);
        let body = match root.descendants().into_iter().find(|e| e.tag() == "body") {
            Some(body) => body,
            None => root.append_child(&Element::new("body")),
        };
        Self::from_parts(root, body)
    }

    /// Document holding the embedded report templates.
    pub fn standard() -> Self {
        Self::parse(STANDARD_TEMPLATES)
    }

    /// Document with an empty body and no templates.
    pub fn empty() -> Self {
        let root = Element::fragment();
        let body = root.append_child(&Element::new("body"));
        Self::from_parts(root, body)
    }

    fn from_parts(root: Element, body: Element) -> Self {
        Document(Rc::new(DocumentData {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            root,
            body,
        }))
    }

    /// Process-unique document id.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn root(&self) -> Element {
        self.0.root.clone()
    }

    pub fn body(&self) -> Element {
        self.0.body.clone()
    }

    /// Find the `<template>` element matching `selector`.
    pub fn template(&self, selector: &str) -> Result<Option<Element>, SelectorError> {
        Ok(self
            .0
            .root
            .query_selector_all(selector)?
            .into_iter()
            .find(|element| element.tag() == "template"))
    }

    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Document {}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document").field("id", &self.0.id).finish()
    }
}
