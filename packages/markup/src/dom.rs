//! # Markup tree
//!
//! Arena-backed node tree produced by the parser.
//!
//! Nodes are addressed by [`NodeId`] (an index into the arena). Removing a
//! node only detaches it: the slot stays allocated but becomes unreachable
//! from the root, so ids handed out earlier never point at a different node.
//! Ids are only meaningful for the `Dom` that produced them; anything that
//! needs to survive a re-parse must go through a selector
//! [`Address`](crate::selector::Address) instead.

use serde::{Deserialize, Serialize};

use crate::parser::parse_fragment;

/// Index of a node inside a [`Dom`] arena
pub type NodeId = usize;

/// Elements that never have children or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text up to the matching end tag
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub fn is_void(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name)
}

pub fn is_raw_text(tag_name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag_name)
}

/// Single attribute as written in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    /// `None` for valueless attributes (`<input disabled>`)
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Element payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Lower-cased tag name
    pub tag_name: String,
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn set_attr(&mut self, name: &str, value: Option<String>) {
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| !a.name.eq_ignore_ascii_case(name));
        before != self.attributes.len()
    }

    /// Whitespace-separated tokens of the `class` attribute
    pub fn classes(&self) -> Vec<String> {
        self.attr("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|token| token == class))
            .unwrap_or(false)
    }

    /// Replace the class list; an empty list removes the attribute
    pub fn set_classes<I, S>(&mut self, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = classes
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if joined.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", Some(joined));
        }
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            let mut classes = self.classes();
            classes.push(class.to_string());
            self.set_classes(classes);
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        if self.has_class(class) {
            let classes = self.classes().into_iter().filter(|c| c != class);
            self.set_classes(classes.collect::<Vec<_>>());
        }
    }

    /// Toggle a class, returning whether it is now present
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Root of every tree
    Document,
    /// `<!...>` declaration, stored without the angle brackets and `!`
    Doctype { content: String },
    Element(Element),
    /// Text as written (entities are not decoded)
    Text { content: String },
    Comment { content: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Parsed markup document
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Empty tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id).map(|n| &n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Whether element children placed under `id` survive serialization.
    /// False for void and raw-text elements and for non-element nodes
    /// other than the document root.
    pub fn can_hold_elements(&self, id: NodeId) -> bool {
        if id == self.root() {
            return true;
        }
        match self.tag_name(id) {
            Some(tag) => !is_void(tag) && !is_raw_text(tag),
            None => false,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag_name.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    /// Element children only (text, comments and doctypes skipped)
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// Whether `id` is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Strict ancestry: `ancestor` is above `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor != node && self.contains(ancestor, node)
    }

    /// Descendants of `id` in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// All attached elements in document order
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.is_element(*id))
            .collect()
    }

    pub fn find_by_id(&self, id_value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|id| self.attr(*id, "id") == Some(id_value))
    }

    /// Number of attached elements carrying `id_value`
    pub fn count_id(&self, id_value: &str) -> usize {
        self.elements()
            .into_iter()
            .filter(|id| self.attr(*id, "id") == Some(id_value))
            .count()
    }

    pub fn find_first(&self, tag_name: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|id| self.tag_name(*id) == Some(tag_name))
    }

    pub fn find_all(&self, tag_name: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|id| self.tag_name(*id) == Some(tag_name))
            .collect()
    }

    /// The `body` element, or the document root for fragments without one
    pub fn body(&self) -> NodeId {
        self.find_first("body").unwrap_or_else(|| self.root())
    }

    /// Concatenated raw text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text { content }) = self.kind(id) {
            out.push_str(content);
        }
        for node in self.descendants(id) {
            if let Some(NodeKind::Text { content }) = self.kind(node) {
                out.push_str(content);
            }
        }
        out
    }

    // ---- construction -------------------------------------------------

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node::new(kind));
        self.nodes.len() - 1
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text {
            content: content.into(),
        })
    }

    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment {
            content: content.into(),
        })
    }

    pub fn create_doctype(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Doctype {
            content: content.into(),
        })
    }

    /// Detach a node from its parent. The subtree stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.nodes.get_mut(parent) {
                node.children.retain(|c| *c != id);
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = None;
        }
    }

    /// Insert `child` into `parent` at raw child position `index`
    /// (clamped to the end). The child is detached first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if self.get(parent).is_none() || self.get(child).is_none() || self.contains(child, parent)
        {
            return;
        }
        self.detach(child);
        let children = &mut self.nodes[parent].children;
        let at = index.min(children.len());
        children.insert(at, child);
        self.nodes[child].parent = Some(parent);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child(parent, usize::MAX, child);
    }

    /// Append text, merging with a trailing text sibling
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.children(parent).last() {
            if let Some(NodeKind::Text { content }) = self.nodes.get_mut(last).map(|n| &mut n.kind)
            {
                content.push_str(text);
                return;
            }
        }
        let node = self.create_text(text);
        self.append_child(parent, node);
    }

    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        if let Some(parent) = self.parent(reference) {
            self.detach(node);
            let index = self
                .children(parent)
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(0);
            self.insert_child(parent, index, node);
        }
    }

    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        if let Some(parent) = self.parent(reference) {
            self.detach(node);
            let index = self
                .children(parent)
                .iter()
                .position(|c| *c == reference)
                .map(|i| i + 1)
                .unwrap_or(usize::MAX);
            self.insert_child(parent, index, node);
        }
    }

    /// Deep-copy `source_id` from another tree into this arena (unattached)
    pub fn import(&mut self, source: &Dom, source_id: NodeId) -> NodeId {
        let kind = source
            .kind(source_id)
            .cloned()
            .unwrap_or(NodeKind::Text {
                content: String::new(),
            });
        let copy = self.alloc(kind);
        for &child in source.children(source_id) {
            let child_copy = self.import(source, child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Import every top-level node of a fragment, unattached
    pub fn import_fragment(&mut self, fragment: &Dom) -> Vec<NodeId> {
        fragment
            .children(fragment.root())
            .iter()
            .map(|&child| self.import(fragment, child))
            .collect()
    }

    /// Replace the children of `id` with parsed `markup`
    pub fn set_inner_html(&mut self, id: NodeId, markup: &str) {
        for child in self.children(id).to_vec() {
            self.detach(child);
        }

        if self.tag_name(id).map(is_raw_text).unwrap_or(false) {
            self.append_text(id, markup);
            return;
        }

        let fragment = parse_fragment(markup);
        for node in self.import_fragment(&fragment) {
            self.append_child(id, node);
        }
    }

    /// Replace the children of `id` with a single escaped text node
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        let escaped = escape_text(text);
        self.append_text(id, &escaped);
    }

    /// Replace `id` with the nodes parsed from `markup`, returning them
    pub fn replace_with_markup(&mut self, id: NodeId, markup: &str) -> Vec<NodeId> {
        let fragment = parse_fragment(markup);
        let inserted = self.import_fragment(&fragment);
        for &node in &inserted {
            self.insert_before(id, node);
        }
        self.detach(id);
        inserted
    }

    /// Structural equality of the attached trees.
    ///
    /// Whitespace-only text nodes are ignored and text is compared with
    /// whitespace collapsed, so re-indentation does not count as a change.
    pub fn structurally_eq(&self, other: &Dom) -> bool {
        self.signature(self.root()) == other.signature(other.root())
    }

    fn signature(&self, id: NodeId) -> String {
        let mut out = String::new();
        match self.kind(id) {
            Some(NodeKind::Document) => out.push_str("#document"),
            Some(NodeKind::Doctype { content }) => {
                out.push_str("#doctype:");
                out.push_str(&content.to_ascii_lowercase());
            }
            Some(NodeKind::Comment { content }) => {
                out.push_str("#comment:");
                out.push_str(content.trim());
            }
            Some(NodeKind::Text { content }) => {
                out.push_str("#text:");
                out.push_str(&content.split_whitespace().collect::<Vec<_>>().join(" "));
            }
            Some(NodeKind::Element(el)) => {
                out.push_str(&el.tag_name);
                let mut attrs: Vec<String> = el
                    .attributes
                    .iter()
                    .map(|a| {
                        format!(
                            "{}={}",
                            a.name.to_ascii_lowercase(),
                            a.value.as_deref().unwrap_or("").replace("&quot;", "\"")
                        )
                    })
                    .collect();
                attrs.sort();
                out.push('[');
                out.push_str(&attrs.join(","));
                out.push(']');
            }
            None => {}
        }
        out.push('(');
        for &child in self.children(id) {
            if let Some(NodeKind::Text { content }) = self.kind(child) {
                if content.trim().is_empty() {
                    continue;
                }
            }
            out.push_str(&self.signature(child));
        }
        out.push(')');
        out
    }
}

/// Escape text for inclusion as element content
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::serializer::{inner_html, serialize};

    #[test]
    fn test_class_helpers() {
        let mut el = Element::new("DIV");
        assert_eq!(el.tag_name, "div");

        el.add_class("a");
        el.add_class("b");
        el.add_class("a");
        assert_eq!(el.classes(), vec!["a", "b"]);

        assert!(!el.toggle_class("a"));
        assert!(el.toggle_class("c"));
        assert_eq!(el.attr("class"), Some("b c"));

        el.set_classes(Vec::<String>::new());
        assert!(!el.has_attr("class"));
    }

    #[test]
    fn test_detach_keeps_ids_stable() {
        let mut dom = parse("<ul><li>a</li><li>b</li></ul>");
        let ul = dom.find_first("ul").unwrap();
        let items = dom.element_children(ul);
        dom.detach(items[0]);

        assert!(!dom.is_attached(items[0]));
        assert_eq!(dom.element_children(ul), vec![items[1]]);
        assert_eq!(dom.text_content(items[0]), "a");
    }

    #[test]
    fn test_contains() {
        let dom = parse("<div><p><span>x</span></p></div>");
        let div = dom.find_first("div").unwrap();
        let span = dom.find_first("span").unwrap();
        assert!(dom.contains(div, span));
        assert!(dom.contains(div, div));
        assert!(!dom.contains(span, div));
        assert!(dom.is_ancestor(div, span));
        assert!(!dom.is_ancestor(div, div));
    }

    #[test]
    fn test_set_inner_html_and_text() {
        let mut dom = parse("<div id=\"a\">old</div>");
        let div = dom.find_by_id("a").unwrap();

        dom.set_inner_html(div, "<b>new</b> text");
        assert_eq!(inner_html(&dom, div), "<b>new</b> text");

        dom.set_text(div, "1 < 2");
        assert_eq!(inner_html(&dom, div), "1 &lt; 2");
    }

    #[test]
    fn test_replace_with_markup() {
        let mut dom = parse("<main><p>a</p><p>b</p></main>");
        let first = dom.find_first("p").unwrap();
        let inserted = dom.replace_with_markup(first, "<h1>x</h1><h2>y</h2>");

        assert_eq!(inserted.len(), 2);
        assert_eq!(serialize(&dom), "<main><h1>x</h1><h2>y</h2><p>b</p></main>");
    }

    #[test]
    fn test_structural_equality_ignores_whitespace() {
        let a = parse("<div class=\"x\">\n  <p>Hello   world</p>\n</div>");
        let b = parse("<div class='x'><p>Hello world</p></div>");
        assert!(a.structurally_eq(&b));

        let c = parse("<div class=\"y\"><p>Hello world</p></div>");
        assert!(!a.structurally_eq(&c));
    }
}
