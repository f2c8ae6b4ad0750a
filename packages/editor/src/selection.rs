//! # Selection
//!
//! What the user has selected, hovered or right-clicked, kept as addresses
//! plus a denormalized snapshot for panels that should not re-parse the
//! document. The state is re-derived after every change: addresses that
//! still resolve get a fresh snapshot, the rest are cleared.

use pagewright_markup::{address_of, outer_html, resolve, Address, Dom, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bounding box reported by the rendering surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything panels need to know about the selected element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub tag_name: String,
    pub classes: Vec<String>,
    pub text_preview: String,
    pub markup: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
}

/// Collapse whitespace and cut to `max_chars` characters
pub fn text_preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut preview: String = collapsed.chars().take(max_chars).collect();
    preview.push('…');
    preview
}

impl ElementSnapshot {
    /// Snapshot an element; `None` for anything else
    pub fn capture(dom: &Dom, node: NodeId, preview_len: usize) -> Option<Self> {
        let element = dom.element(node)?;
        Some(Self {
            tag_name: element.tag_name.clone(),
            classes: element.classes(),
            text_preview: text_preview(&dom.text_content(node), preview_len),
            markup: outer_html(dom, node),
            rect: None,
        })
    }

    pub fn with_rect(mut self, rect: Option<Rect>) -> Self {
        self.rect = rect;
        self
    }
}

/// An open right-click menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMenu {
    pub x: f64,
    pub y: f64,
    pub address: Address,
    pub snapshot: ElementSnapshot,
}

/// The single selected element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selected {
    pub address: Address,
    pub snapshot: ElementSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected: Option<Selected>,
    pub hover: Option<Address>,
    pub context_menu: Option<ContextMenu>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_address(&self) -> Option<&Address> {
        self.selected.as_ref().map(|s| &s.address)
    }

    pub fn snapshot(&self) -> Option<&ElementSnapshot> {
        self.selected.as_ref().map(|s| &s.snapshot)
    }

    /// Select the element at `address`, returning whether it resolved.
    ///
    /// A miss clears the selection.
    pub fn select(&mut self, dom: &Dom, address: &Address, rect: Option<Rect>, preview_len: usize) -> bool {
        let snapshot = resolve(dom, address).and_then(|node| ElementSnapshot::capture(dom, node, preview_len));
        match snapshot {
            Some(snapshot) => {
                // The resolver's canonical spelling, whatever the caller sent
                let address = resolve(dom, address)
                    .and_then(|node| address_of(dom, node))
                    .unwrap_or_else(|| address.clone());
                self.selected = Some(Selected {
                    address,
                    snapshot: snapshot.with_rect(rect),
                });
                true
            }
            None => {
                debug!(%address, "selection target does not resolve");
                self.selected = None;
                false
            }
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.context_menu = None;
    }

    /// Set or clear the hover; unresolvable addresses clear it
    pub fn hover(&mut self, dom: &Dom, address: Option<&Address>) {
        self.hover = address
            .filter(|address| resolve(dom, address).is_some())
            .cloned();
    }

    pub fn open_context_menu(
        &mut self,
        dom: &Dom,
        address: &Address,
        x: f64,
        y: f64,
        preview_len: usize,
    ) -> bool {
        let snapshot = resolve(dom, address).and_then(|node| ElementSnapshot::capture(dom, node, preview_len));
        self.context_menu = snapshot.map(|snapshot| ContextMenu {
            x,
            y,
            address: address.clone(),
            snapshot,
        });
        self.context_menu.is_some()
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Re-derive the state against a new version of the document.
    ///
    /// Returns false when a selection existed and was lost.
    pub fn reresolve(&mut self, dom: &Dom, preview_len: usize) -> bool {
        let mut kept = true;

        if let Some(selected) = self.selected.take() {
            let rect = selected.snapshot.rect;
            match resolve(dom, &selected.address).and_then(|node| ElementSnapshot::capture(dom, node, preview_len)) {
                Some(snapshot) => {
                    self.selected = Some(Selected {
                        address: selected.address,
                        snapshot: snapshot.with_rect(rect),
                    });
                }
                None => {
                    debug!(address = %selected.address, "selection lost after change");
                    kept = false;
                }
            }
        }

        if let Some(hover) = self.hover.take() {
            if resolve(dom, &hover).is_some() {
                self.hover = Some(hover);
            }
        }

        if let Some(menu) = self.context_menu.take() {
            if let Some(snapshot) = resolve(dom, &menu.address).and_then(|node| ElementSnapshot::capture(dom, node, preview_len)) {
                self.context_menu = Some(ContextMenu { snapshot, ..menu });
            }
        }

        kept
    }
}
