//! # Instrumentation
//!
//! The realm renders an instrumented copy of the document: editor classes
//! (`pw-*`), editor attributes (`data-pw-*`), `contenteditable` while text
//! is being edited, and a runtime `<style>`/`<script>` pair. The script is
//! the live surface: it reports clicks, hovers, inline edits, deletes,
//! drags, resizes and context menus as realm messages. None of it may reach
//! the canonical document, so anything the realm reports back goes through
//! [`strip_instrumentation`] first.
//!
//! Injected nodes are appended after their same-tag siblings, so every
//! canonical address still resolves in the copy. Addresses computed inside
//! the copy go through [`canonical_address`], which ignores the markers.

use pagewright_markup::{address_of, parse, resolve, serialize, Address, Dom, Element, NodeId};
use tracing::debug;

pub const CLASS_PREFIX: &str = "pw-";
pub const ATTR_PREFIX: &str = "data-pw-";
/// Marks the injected runtime nodes
pub const RUNTIME_ATTR: &str = "data-pw-runtime";
/// Marks a `contenteditable` the editor added
pub const EDITABLE_ATTR: &str = "data-pw-editable";
pub const SELECTED_CLASS: &str = "pw-selected";
pub const HOVERED_CLASS: &str = "pw-hovered";

const RUNTIME_STYLE: &str = ".pw-hovered{outline:1px dashed #3b82f6;outline-offset:-1px}\
.pw-selected{outline:2px solid #3b82f6;outline-offset:-2px}\
section.pw-selected,div.pw-selected{resize:both;overflow:auto}\
[data-pw-editable]{cursor:text}";

/// Surface runtime: turns gestures into realm messages and applies
/// controller messages. Its address walk skips runtime nodes and matches
/// [`canonical_address`] segment for segment.
pub const RUNTIME_SCRIPT: &str = include_str!("runtime.js");

fn runtime_node(dom: &mut Dom, tag: &str, content: &str) -> NodeId {
    let mut element = Element::new(tag);
    element.set_attr(RUNTIME_ATTR, None);
    let node = dom.create_element(element);
    dom.append_text(node, content);
    node
}

/// Instrument a document for rendering, optionally marking the selection
pub fn instrument(document: &str, selected: Option<&Address>) -> String {
    let mut dom = parse(document);

    if let Some(node) = selected.and_then(|address| resolve(&dom, address)) {
        if let Some(element) = dom.element_mut(node) {
            element.add_class(SELECTED_CLASS);
        }
    }

    let style = runtime_node(&mut dom, "style", RUNTIME_STYLE);
    match dom.find_first("head") {
        Some(head) => dom.append_child(head, style),
        None => dom.append_child(dom.body(), style),
    }
    let script = runtime_node(&mut dom, "script", RUNTIME_SCRIPT);
    dom.append_child(dom.body(), script);

    serialize(&dom)
}

/// Remove every editor marker from a tree in place, returning whether
/// anything was removed
pub fn strip_dom(dom: &mut Dom) -> bool {
    let mut changed = false;

    for node in dom.elements() {
        if dom.element(node).map_or(false, |e| e.has_attr(RUNTIME_ATTR)) {
            dom.detach(node);
            changed = true;
            continue;
        }

        let Some(element) = dom.element_mut(node) else {
            continue;
        };

        if element.has_attr(EDITABLE_ATTR) {
            element.remove_attr("contenteditable");
            changed = true;
        }

        let before = element.attributes.len();
        element
            .attributes
            .retain(|a| !a.name.to_ascii_lowercase().starts_with(ATTR_PREFIX));
        changed |= before != element.attributes.len();

        let classes = element.classes();
        if classes.iter().any(|c| c.starts_with(CLASS_PREFIX)) {
            element.set_classes(classes.iter().filter(|c| !c.starts_with(CLASS_PREFIX)));
            changed = true;
        }
    }

    changed
}

/// Address of `node` as the canonical document spells it.
///
/// Stripping only detaches nodes, so node ids stay valid in the stripped
/// clone.
pub fn canonical_address(dom: &Dom, node: NodeId) -> Option<Address> {
    let mut clean = dom.clone();
    strip_dom(&mut clean);
    address_of(&clean, node)
}

/// Remove every editor marker from markup reported by the realm.
///
/// Markup without markers is returned unchanged, byte for byte.
pub fn strip_instrumentation(markup: &str) -> String {
    let mut dom = parse(markup);
    if strip_dom(&mut dom) {
        debug!("stripped editor instrumentation");
        serialize(&dom)
    } else {
        markup.to_string()
    }
}
