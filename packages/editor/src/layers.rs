//! Layer outline: a navigable tree mirror of the document body.

use pagewright_markup::{address_of, Address, Dom, NodeId};
use serde::Serialize;

use crate::selection::text_preview;

/// Elements that never show up in the outline
const HIDDEN_TAGS: &[&str] = &["script", "style", "template", "noscript"];

const LABEL_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerNode {
    pub address: Address,
    pub depth: usize,
    /// Position among the parent's element children
    pub index: usize,
    pub tag_name: String,
    pub label: String,
    pub children: Vec<LayerNode>,
}

impl LayerNode {
    /// Depth-first search by address
    pub fn find(&self, address: &Address) -> Option<&LayerNode> {
        if &self.address == address {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(address))
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(LayerNode::count).sum::<usize>()
    }
}

fn label(dom: &Dom, node: NodeId, tag_name: &str) -> String {
    if let Some(aria) = dom.attr(node, "aria-label").filter(|v| !v.trim().is_empty()) {
        return aria.trim().to_string();
    }
    if let Some(id) = dom.attr(node, "id").filter(|v| !v.is_empty()) {
        return format!("{}#{}", tag_name, id);
    }
    if dom.element_children(node).is_empty() {
        let text = text_preview(&dom.text_content(node), LABEL_LENGTH);
        if !text.is_empty() {
            return text;
        }
    }
    match dom.element(node).and_then(|e| e.classes().into_iter().next()) {
        Some(class) => format!("{}.{}", tag_name, class),
        None => tag_name.to_string(),
    }
}

fn build(dom: &Dom, parent: NodeId, depth: usize) -> Vec<LayerNode> {
    dom.element_children(parent)
        .into_iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let tag_name = dom.tag_name(node)?.to_string();
            if HIDDEN_TAGS.contains(&tag_name.as_str()) {
                return None;
            }
            Some(LayerNode {
                address: address_of(dom, node)?,
                depth,
                index,
                label: label(dom, node, &tag_name),
                children: build(dom, node, depth + 1),
                tag_name,
            })
        })
        .collect()
}

/// Outline of the body's element tree
pub fn build_layers(dom: &Dom) -> Vec<LayerNode> {
    build(dom, dom.body(), 0)
}

/// Indented text rendering of an outline
pub fn outline(layers: &[LayerNode]) -> String {
    fn write(layers: &[LayerNode], output: &mut String) {
        for layer in layers {
            output.push_str(&"  ".repeat(layer.depth));
            output.push_str(&layer.label);
            if layer.label != layer.tag_name {
                output.push_str(&format!(" <{}>", layer.tag_name));
            }
            output.push_str(&format!("  [{}]\n", layer.address));
            write(&layer.children, output);
        }
    }

    let mut output = String::new();
    write(layers, &mut output);
    output
}
