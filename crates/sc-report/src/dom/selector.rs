//! CSS selector matching for element discovery.
//!
//! Selector strings are parsed by `cssparser`/`selectors` and matched
//! against [`Element`] through the `selectors::Element` trait. Pseudo-classes
//! and pseudo-elements are not supported and fail to parse.

use std::fmt;

use cssparser::ToCss;
use html5ever::{LocalName, Namespace};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{
    self, ElementSelectorFlags, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode,
    NeedsSelectorFlags, QuirksMode,
};
use selectors::parser::{self, ParseRelative, Selector, SelectorParseErrorKind};
use selectors::{NthIndexCache, OpaqueElement};
use thiserror::Error;

use super::markup::HTML_NAMESPACE;
use super::node::Element;

/// A selector string that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector '{selector}': {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

/// Selector vocabulary for report elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSelectors;

impl parser::SelectorImpl for ReportSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssLocalName;
    type LocalName = CssLocalName;
    type NamespacePrefix = CssLocalName;
    type NamespaceUrl = Namespace;
    type BorrowedNamespaceUrl = Namespace;
    type BorrowedLocalName = CssLocalName;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssString(String);

impl<'a> From<&'a str> for CssString {
    fn from(value: &'a str) -> Self {
        CssString(value.to_string())
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_string(&self.0, dest)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssLocalName(LocalName);

impl<'a> From<&'a str> for CssLocalName {
    fn from(value: &'a str) -> Self {
        CssLocalName(LocalName::from(value))
    }
}

impl ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

impl PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonTSPseudoClass {}

impl parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = ReportSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoElement {}

impl parser::PseudoElement for PseudoElement {
    type Impl = ReportSelectors;
}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

struct SelectorParser;

impl<'i> parser::Parser<'i> for SelectorParser {
    type Impl = ReportSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone)]
pub struct SelectorList {
    selectors: Vec<Selector<ReportSelectors>>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser_input = cssparser::ParserInput::new(input);
        let mut css = cssparser::Parser::new(&mut parser_input);
        parser::SelectorList::parse(&SelectorParser, &mut css, ParseRelative::No)
            .map(|list| SelectorList {
                selectors: list.0.into_iter().collect(),
            })
            .map_err(|err| SelectorError {
                selector: input.to_string(),
                reason: format!("{:?}", err.kind),
            })
    }

    pub fn matches(&self, element: &Element) -> bool {
        if element.is_fragment() {
            return false;
        }
        let mut nth_index_cache = NthIndexCache::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut nth_index_cache,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            IgnoreNthChildForInvalidation::No,
        );
        self.selectors
            .iter()
            .any(|selector| matching::matches_selector(selector, 0, None, element, &mut context))
    }
}

impl selectors::Element for Element {
    type Impl = ReportSelectors;

    fn opaque(&self) -> OpaqueElement {
        self.opaque_handle()
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().filter(|parent| !parent.is_fragment())
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.previous_element_sibling()
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.next_element_sibling()
    }

    fn first_element_child(&self) -> Option<Self> {
        Element::first_element_child(self)
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &CssLocalName) -> bool {
        self.tag() == *local_name.0
    }

    fn has_namespace(&self, ns: &Namespace) -> bool {
        &**ns == HTML_NAMESPACE
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&Namespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        if let NamespaceConstraint::Specific(url) = ns {
            if !url.is_empty() {
                return false;
            }
        }
        self.attribute(&local_name.0)
            .is_some_and(|value| operation.eval_str(&value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, ReportSelectors>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, ReportSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        self.tag() == "a" && self.has_attribute("href")
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.id()
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.class_list()
            .iter()
            .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self.has_children()
    }

    fn is_root(&self) -> bool {
        selectors::Element::parent_element(self).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// div.root > ul.items > li.item#first[data-x=1]
    fn tree() -> (Element, Element) {
        let root = Element::new("div");
        root.add_class("root");
        let list = root.append_child(&Element::new("ul"));
        list.add_class("items");
        let item = list.append_child(&Element::new("li"));
        item.add_class("item");
        item.set_attribute("id", "first");
        item.set_attribute("data-x", "1");
        (root, item)
    }

    #[test]
    fn test_simple_selectors() {
        let (root, item) = tree();
        for selector in ["li", ".item", "#first", "[data-x]", "[data-x=\"1\"]", "li.item#first", "*"] {
            let list = SelectorList::parse(selector).unwrap();
            assert!(list.matches(&item), "{selector} should match");
        }
        assert!(!SelectorList::parse(".other").unwrap().matches(&item));
        assert!(!SelectorList::parse("[data-x=\"2\"]").unwrap().matches(&item));
        assert!(root.query_selector("p").unwrap().is_none());
    }

    #[test]
    fn test_combinators() {
        let (root, item) = tree();
        assert!(SelectorList::parse(".root li").unwrap().matches(&item));
        assert!(SelectorList::parse(".root > ul > li").unwrap().matches(&item));
        assert!(!SelectorList::parse(".root > li").unwrap().matches(&item));
        let found = root.query_selector_all(".root > .items > li").unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ptr_eq(&item));
    }

    #[test]
    fn test_sibling_combinators() {
        let list = Element::new("ul");
        for class in ["a", "b", "c"] {
            list.append_child(&Element::new("li")).add_class(class);
        }
        let after_a = list.query_selector_all(".a ~ li").unwrap();
        assert_eq!(after_a.len(), 2);
        let next = list.query_selector(".a + li").unwrap().unwrap();
        assert!(next.has_class("b"));
        assert!(list.query_selector(".c + li").unwrap().is_none());
    }

    #[test]
    fn test_selector_list() {
        let (root, _) = tree();
        let found = root.query_selector_all("ul, li").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].tag(), "ul");
    }

    #[test]
    fn test_query_excludes_root() {
        let (root, _) = tree();
        assert!(root.query_selector(".root").unwrap().is_none());
    }

    #[test]
    fn test_fragment_is_never_matched() {
        let fragment = Element::fragment();
        let child = fragment.append_child(&Element::new("p"));
        assert!(!SelectorList::parse("*").unwrap().matches(&fragment));
        assert!(SelectorList::parse("p:hover").is_err());
        assert!(SelectorList::parse("p").unwrap().matches(&child));
    }

    #[test]
    fn test_invalid_selectors() {
        for selector in ["", "> li", "li >", ".", "#", "li!", "[=x]", "a,,b"] {
            let err = SelectorList::parse(selector).unwrap_err();
            assert_eq!(err.selector, selector);
        }
    }
}
