use crate::dom::{is_void, Dom, Element, NodeId, NodeKind};

/// Serializer converts a tree back to markup.
///
/// Text and attribute values are emitted as stored, so entity references
/// and whitespace written by the author survive an edit round trip. What
/// does change:
/// - attribute values are always double-quoted (`"` becomes `&quot;`)
/// - void elements never get an end tag
/// - self-closing syntax on other elements becomes an explicit end tag
pub struct Serializer;

impl Serializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize the whole tree
    pub fn serialize(&self, dom: &Dom) -> String {
        let mut output = String::new();
        self.write_children(dom, dom.root(), &mut output);
        output
    }

    /// Markup of `id` including its own tags
    pub fn outer(&self, dom: &Dom, id: NodeId) -> String {
        let mut output = String::new();
        self.write_node(dom, id, &mut output);
        output
    }

    /// Markup of the children of `id`
    pub fn inner(&self, dom: &Dom, id: NodeId) -> String {
        let mut output = String::new();
        self.write_children(dom, id, &mut output);
        output
    }

    fn write_children(&self, dom: &Dom, id: NodeId, output: &mut String) {
        for &child in dom.children(id) {
            self.write_node(dom, child, output);
        }
    }

    fn write_node(&self, dom: &Dom, id: NodeId, output: &mut String) {
        match dom.kind(id) {
            Some(NodeKind::Document) => self.write_children(dom, id, output),
            Some(NodeKind::Doctype { content }) => {
                output.push_str("<!");
                output.push_str(content);
                output.push('>');
            }
            Some(NodeKind::Comment { content }) => {
                output.push_str("<!--");
                output.push_str(content);
                output.push_str("-->");
            }
            Some(NodeKind::Text { content }) => output.push_str(content),
            Some(NodeKind::Element(element)) => {
                self.write_start_tag(element, output);
                if is_void(&element.tag_name) {
                    return;
                }
                self.write_children(dom, id, output);
                output.push_str("</");
                output.push_str(&element.tag_name);
                output.push('>');
            }
            None => {}
        }
    }

    fn write_start_tag(&self, element: &Element, output: &mut String) {
        output.push('<');
        output.push_str(&element.tag_name);
        for attribute in &element.attributes {
            output.push(' ');
            output.push_str(&attribute.name);
            if let Some(value) = &attribute.value {
                output.push_str("=\"");
                output.push_str(&value.replace('"', "&quot;"));
                output.push('"');
            }
        }
        output.push('>');
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a tree to markup
pub fn serialize(dom: &Dom) -> String {
    Serializer::new().serialize(dom)
}

pub fn outer_html(dom: &Dom, id: NodeId) -> String {
    Serializer::new().outer(dom, id)
}

pub fn inner_html(dom: &Dom, id: NodeId) -> String {
    Serializer::new().inner(dom, id)
}
