//! # Realm model
//!
//! Headless, in-process stand-in for the sandboxed rendering surface. It
//! holds its own disposable tree parsed from the instrumented markup it was
//! sent, turns user gestures into [`RealmMessage`]s and mutates its copy in
//! place the way the live surface does. Nothing it does is authoritative:
//! the controller re-validates every message against the canonical
//! document and answers with a fresh `load-document`.

use pagewright_editor::{move_node, ElementSnapshot, Rect};
use pagewright_markup::{inner_html, parse, resolve, serialize, Address, Dom, NodeId};
use tracing::debug;

use crate::instrumentation::{
    canonical_address, strip_instrumentation, CLASS_PREFIX, EDITABLE_ATTR, HOVERED_CLASS,
    SELECTED_CLASS,
};
use crate::protocol::{ControllerMessage, RealmMessage};

const SNAPSHOT_PREVIEW: usize = 80;

#[derive(Debug, Default)]
pub struct Realm {
    dom: Dom,
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
    editing: Option<NodeId>,
}

impl Realm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// The rendered markup, instrumentation included
    pub fn html(&self) -> String {
        serialize(&self.dom)
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Find a rendered element by canonical address
    pub fn find(&self, address: &Address) -> Option<NodeId> {
        resolve(&self.dom, address)
    }

    fn address(&self, node: NodeId) -> Option<Address> {
        canonical_address(&self.dom, node)
    }

    fn snapshot(&self, node: NodeId, rect: Option<Rect>) -> Option<ElementSnapshot> {
        let mut snapshot = ElementSnapshot::capture(&self.dom, node, SNAPSHOT_PREVIEW)?;
        snapshot.classes.retain(|c| !c.starts_with(CLASS_PREFIX));
        snapshot.markup = strip_instrumentation(&snapshot.markup);
        Some(snapshot.with_rect(rect))
    }

    fn set_marker(&mut self, previous: Option<NodeId>, next: Option<NodeId>, class: &str) {
        if let Some(element) = previous.and_then(|node| self.dom.element_mut(node)) {
            element.remove_class(class);
        }
        if let Some(element) = next.and_then(|node| self.dom.element_mut(node)) {
            element.add_class(class);
        }
    }

    fn select_node(&mut self, node: Option<NodeId>) {
        self.set_marker(self.selected, node, SELECTED_CLASS);
        self.selected = node;
    }

    fn hover_node(&mut self, node: Option<NodeId>) {
        self.set_marker(self.hovered, node, HOVERED_CLASS);
        self.hovered = node;
    }

    // Controller → realm

    pub fn handle(&mut self, message: ControllerMessage) {
        match message {
            ControllerMessage::LoadDocument { html } => {
                self.dom = parse(&html);
                self.selected = self.dom.elements().into_iter().find(|&node| {
                    self.dom
                        .element(node)
                        .map_or(false, |e| e.has_class(SELECTED_CLASS))
                });
                self.hovered = None;
                self.editing = None;
            }
            ControllerMessage::SelectElement { address } => {
                let node = self.find(&address);
                if node.is_none() {
                    debug!(%address, "realm cannot find element to select");
                }
                self.select_node(node);
            }
            ControllerMessage::Deselect => self.select_node(None),
            ControllerMessage::HoverElement { address } => {
                let node = address.and_then(|address| self.find(&address));
                self.hover_node(node);
            }
        }
    }

    // Gestures → realm messages

    pub fn click(&mut self, node: NodeId, rect: Option<Rect>) -> Option<RealmMessage> {
        let address = self.address(node)?;
        let snapshot = self.snapshot(node, rect)?;
        self.select_node(Some(node));
        Some(RealmMessage::ElementSelected { address, snapshot })
    }

    pub fn hover(&mut self, node: Option<NodeId>) -> RealmMessage {
        let address = node.and_then(|node| self.address(node));
        self.hover_node(node.filter(|_| address.is_some()));
        RealmMessage::ElementHovered { address }
    }

    /// Make an element's text editable in place
    pub fn begin_text_edit(&mut self, node: NodeId) -> bool {
        let Some(element) = self.dom.element_mut(node) else {
            return false;
        };
        element.set_attr("contenteditable", Some("true".to_string()));
        element.set_attr(EDITABLE_ATTR, None);
        self.editing = Some(node);
        true
    }

    /// Commit the edit (blur or Enter) with the element's new inner markup
    pub fn commit_text(&mut self, html: &str) -> Option<RealmMessage> {
        let node = self.editing.take()?;
        let address = self.address(node)?;
        self.dom.set_inner_html(node, html);
        if let Some(element) = self.dom.element_mut(node) {
            element.remove_attr("contenteditable");
            element.remove_attr(EDITABLE_ATTR);
        }
        Some(RealmMessage::TextEdited {
            address,
            html: strip_instrumentation(&inner_html(&self.dom, node)),
        })
    }

    pub fn delete(&mut self, node: NodeId) -> Option<RealmMessage> {
        let address = self.address(node)?;
        self.dom.detach(node);
        if self.selected == Some(node) {
            self.selected = None;
        }
        Some(RealmMessage::DeleteElement { address })
    }

    /// Drag an element to `parent` at element index `index`, reporting the
    /// whole reconstructed document
    pub fn drag(&mut self, node: NodeId, parent: NodeId, index: usize) -> Option<RealmMessage> {
        match move_node(&mut self.dom, node, parent, index) {
            Ok(true) => Some(RealmMessage::ElementMoved { document: self.html() }),
            Ok(false) => None,
            Err(error) => {
                debug!(%error, "drag refused");
                None
            }
        }
    }

    /// Move a top-level section to a new position in the body
    pub fn reorder_section(&mut self, node: NodeId, index: usize) -> Option<RealmMessage> {
        let body = self.dom.body();
        if self.dom.parent(node) != Some(body) {
            return None;
        }
        match move_node(&mut self.dom, node, body, index) {
            Ok(true) => Some(RealmMessage::SectionReordered { document: self.html() }),
            _ => None,
        }
    }

    pub fn resize(&mut self, node: NodeId, width: f64, height: f64) -> Option<RealmMessage> {
        let address = self.address(node)?;
        Some(RealmMessage::ElementResized {
            address,
            width,
            height,
        })
    }

    pub fn right_click(&mut self, node: NodeId, x: f64, y: f64) -> Option<RealmMessage> {
        let address = self.address(node)?;
        let snapshot = self.snapshot(node, None)?;
        Some(RealmMessage::ContextMenu {
            x,
            y,
            address,
            snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrumentation::instrument;

    fn loaded(document: &str) -> Realm {
        let mut realm = Realm::new();
        realm.handle(ControllerMessage::LoadDocument {
            html: instrument(document, None),
        });
        realm
    }

    #[test]
    fn test_click_reports_clean_snapshot() {
        let mut realm = loaded("<body><section class=\"hero\"><h1>Hi</h1></section><script>x()</script></body>");
        let section = realm.find(&Address::new("body > section")).unwrap();

        let message = realm.click(section, None).unwrap();
        match message {
            RealmMessage::ElementSelected { address, snapshot } => {
                assert_eq!(address, Address::new("body > section"));
                assert_eq!(snapshot.classes, ["hero"]);
                assert_eq!(snapshot.markup, "<section class=\"hero\"><h1>Hi</h1></section>");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(realm.html().contains("class=\"hero pw-selected\""));

        let script = realm.find(&Address::new("body > script")).unwrap();
        match realm.click(script, None) {
            Some(RealmMessage::ElementSelected { address, .. }) => {
                assert_eq!(address, Address::new("body > script"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_text_edit_commit() {
        let mut realm = loaded("<body><p>Old</p></body>");
        let p = realm.find(&Address::new("body > p")).unwrap();

        assert!(realm.begin_text_edit(p));
        assert!(realm.html().contains("contenteditable=\"true\""));
        let message = realm.commit_text("New <b>text</b>").unwrap();
        assert_eq!(
            message,
            RealmMessage::TextEdited {
                address: Address::new("body > p"),
                html: "New <b>text</b>".to_string(),
            }
        );
        assert!(!realm.html().contains("contenteditable"));
        assert!(realm.commit_text("again").is_none());
    }

    #[test]
    fn test_controller_selection_and_hover() {
        let mut realm = loaded("<body><p>a</p><p>b</p></body>");
        realm.handle(ControllerMessage::SelectElement {
            address: Address::new("body > p:nth-of-type(2)"),
        });
        assert_eq!(realm.selected(), realm.find(&Address::new("body > p:nth-of-type(2)")));

        realm.handle(ControllerMessage::HoverElement {
            address: Some(Address::new("body > p:nth-of-type(1)")),
        });
        assert!(realm.html().contains("<p class=\"pw-hovered\">a</p>"));

        realm.handle(ControllerMessage::Deselect);
        assert_eq!(realm.selected(), None);
    }

    #[test]
    fn test_drag_reports_whole_document() {
        let mut realm = loaded("<body><section id=\"a\"></section><section id=\"b\"></section></body>");
        let b = realm.find(&Address::new("#b")).unwrap();
        let body = realm.dom().body();

        match realm.reorder_section(b, 0) {
            Some(RealmMessage::SectionReordered { document }) => {
                assert_eq!(
                    strip_instrumentation(&document),
                    "<body><section id=\"b\"></section><section id=\"a\"></section></body>"
                );
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(realm.drag(body, b, 0).is_none());
    }
}
