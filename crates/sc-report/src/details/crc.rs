//! Critical request chain visualizer.
//!
//! The chain tree is flattened depth-first into one row per request. Each row
//! carries tree markers describing which ancestor levels still have siblings
//! below it, so the rows draw as a tree without nested markup.

use indexmap::IndexMap;
use sc_common::{CrcNode, CriticalRequestChainDetail};

use crate::dom::{Dom, Element};
use crate::error::Result;
use crate::util::{format_bytes_to_kb, format_milliseconds, parse_url};

/// One flattened row of the chain tree.
struct Segment<'a> {
    node: &'a CrcNode,
    is_last_child: bool,
    has_children: bool,
    /// Per ancestor level: whether a vertical connector continues through it.
    tree_markers: Vec<bool>,
}

impl<'a> Segment<'a> {
    fn new(
        siblings: &'a IndexMap<String, CrcNode>,
        index: usize,
        parent: Option<&Segment<'_>>,
    ) -> Option<Self> {
        let (_, node) = siblings.get_index(index)?;
        let mut tree_markers = parent.map(|p| p.tree_markers.clone()).unwrap_or_default();
        if let Some(parent) = parent {
            tree_markers.push(!parent.is_last_child);
        }
        Some(Segment {
            node,
            is_last_child: index + 1 == siblings.len(),
            has_children: !node.children.is_empty(),
            tree_markers,
        })
    }
}

pub(crate) fn render(dom: &Dom, details: &CriticalRequestChainDetail) -> Result<Element> {
    let tmpl = dom.clone_template("#tmpl-lh-crc")?;
    let container = dom.find(".lh-crc", &tmpl)?;

    let longest = &details.longest_chain;
    dom.set_text_safe(
        &dom.find(".lh-crc__longest_duration", &tmpl)?,
        &format_milliseconds(longest.duration, Some(1.0)),
    );
    dom.set_text_safe(
        &dom.find(".lh-crc__longest_length", &tmpl)?,
        &longest.length.to_string(),
    );
    dom.set_text_safe(
        &dom.find(".lh-crc__longest_transfersize", &tmpl)?,
        &format_bytes_to_kb(longest.transfer_size, None),
    );

    for index in 0..details.chains.len() {
        if let Some(segment) = Segment::new(&details.chains, index, None) {
            build_tree(dom, &segment, &container)?;
        }
    }

    dom.find(".lh-crc-container", &tmpl)
}

fn build_tree(dom: &Dom, segment: &Segment<'_>, container: &Element) -> Result<()> {
    container.append_child(&chain_node(dom, segment)?);
    let children = &segment.node.children;
    for index in 0..children.len() {
        if let Some(child) = Segment::new(children, index, Some(segment)) {
            build_tree(dom, &child, container)?;
        }
    }
    Ok(())
}

fn chain_node(dom: &Dom, segment: &Segment<'_>) -> Result<Element> {
    let fragment = dom.clone_template("#tmpl-lh-crc__chains")?;
    let request = &segment.node.request;
    let node = dom.find(".crc-node", &fragment)?;
    node.set_attribute("title", request.url.as_str());

    let markers = dom.find(".crc-node__tree-marker", &fragment)?;
    let marker = |class: &str| {
        markers.append_child(&dom.create_element("span", Some(class)));
    };
    for &continues in &segment.tree_markers {
        marker(if continues { "tree-marker vert" } else { "tree-marker" });
        marker("tree-marker");
    }
    marker(if segment.is_last_child {
        "tree-marker up-right"
    } else {
        "tree-marker vert-right"
    });
    marker("tree-marker right");
    marker(if segment.has_children {
        "tree-marker horiz-down"
    } else {
        "tree-marker right"
    });

    let value = dom.find(".crc-node__tree-value", &fragment)?;
    let (file, host) = match parse_url(&request.url) {
        Some(parts) => (parts.file, format!("({})", parts.hostname)),
        None => (request.url.clone(), String::new()),
    };
    let file_el = dom.create_child_of(&value, "span", Some("crc-node__tree-file"), &[]);
    dom.set_text_safe(&file_el, &file);
    let host_el = dom.create_child_of(&value, "span", Some("crc-node__tree-hostname"), &[]);
    dom.set_text_safe(&host_el, &host);

    if !segment.has_children {
        let duration_ms = (request.end_time - request.start_time) * 1000.0;
        let duration = dom.create_child_of(&value, "span", Some("crc-node__chain-duration"), &[]);
        dom.set_text_safe(
            &duration,
            &format!(" - {}, ", format_milliseconds(duration_ms, None)),
        );
        let size = dom.create_child_of(&value, "span", Some("crc-node__chain-duration"), &[]);
        dom.set_text_safe(&size, &format_bytes_to_kb(request.transfer_size, Some(0.01)));
    }

    Ok(node)
}
