//! # Document Mutations
//!
//! Every direct edit a user can make, addressed by element [`Address`].
//!
//! A mutation is applied to a freshly parsed tree by the
//! [`Pipeline`](crate::Pipeline), which resolves its address first and
//! hands the node in. Mutations never hold on to nodes: the same mutation
//! value can be replayed against any later version of the document and
//! re-resolves every time.
//!
//! ## Structural rules
//!
//! - The document root and `body` cannot be removed, replaced or moved
//! - Moving a node into itself or its own subtree is a no-op

use pagewright_markup::{parse_fragment, resolve, Address, Dom, NodeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reorder;

/// Where inserted markup goes relative to the addressed element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement {
    Before,
    After,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Set an attribute; `None` removes it
    SetAttribute {
        address: Address,
        name: String,
        value: Option<String>,
    },

    AddClass {
        address: Address,
        class: String,
    },

    RemoveClass {
        address: Address,
        class: String,
    },

    ToggleClass {
        address: Address,
        class: String,
    },

    /// Replace the content with plain text (escaped)
    SetText {
        address: Address,
        text: String,
    },

    /// Replace the content with markup, as committed by inline text editing
    SetInnerHtml {
        address: Address,
        html: String,
    },

    /// Set one inline style property; `None` removes it
    SetInlineStyle {
        address: Address,
        property: String,
        value: Option<String>,
    },

    ReplaceImage {
        address: Address,
        src: String,
        alt: Option<String>,
    },

    RemoveElement {
        address: Address,
    },

    InsertSibling {
        address: Address,
        html: String,
        placement: Placement,
    },

    ReplaceElement {
        address: Address,
        html: String,
    },

    /// Move to `parent` at element index `index`, counted after the
    /// element is detached
    MoveElement {
        address: Address,
        parent: Address,
        index: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("The document root and body cannot be {0}")]
    ProtectedNode(&'static str),

    #[error("Node is not an element")]
    NotAnElement,

    #[error("Markup contains no nodes")]
    EmptyMarkup,

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

fn is_protected(dom: &Dom, node: NodeId) -> bool {
    node == dom.root() || dom.contains(node, dom.body()) || dom.parent(node).is_none()
}

/// Merge one property into an inline `style` attribute value
pub fn merge_style(style: Option<&str>, property: &str, value: Option<&str>) -> Option<String> {
    let property = property.trim().to_ascii_lowercase();
    let mut declarations: Vec<(String, String)> = style
        .unwrap_or("")
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            (!name.is_empty()).then(|| (name, value.trim().to_string()))
        })
        .collect();

    match value {
        Some(value) => match declarations.iter_mut().find(|(name, _)| *name == property) {
            Some(existing) => existing.1 = value.trim().to_string(),
            None => declarations.push((property, value.trim().to_string())),
        },
        None => declarations.retain(|(name, _)| *name != property),
    }

    if declarations.is_empty() {
        return None;
    }
    Some(
        declarations
            .iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

impl Mutation {
    /// The element this mutation is addressed to
    pub fn address(&self) -> &Address {
        match self {
            Mutation::SetAttribute { address, .. }
            | Mutation::AddClass { address, .. }
            | Mutation::RemoveClass { address, .. }
            | Mutation::ToggleClass { address, .. }
            | Mutation::SetText { address, .. }
            | Mutation::SetInnerHtml { address, .. }
            | Mutation::SetInlineStyle { address, .. }
            | Mutation::ReplaceImage { address, .. }
            | Mutation::RemoveElement { address }
            | Mutation::InsertSibling { address, .. }
            | Mutation::ReplaceElement { address, .. }
            | Mutation::MoveElement { address, .. } => address,
        }
    }

    /// Short name for logs and history descriptions
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetAttribute { .. } => "set-attribute",
            Mutation::AddClass { .. } => "add-class",
            Mutation::RemoveClass { .. } => "remove-class",
            Mutation::ToggleClass { .. } => "toggle-class",
            Mutation::SetText { .. } => "set-text",
            Mutation::SetInnerHtml { .. } => "set-inner-html",
            Mutation::SetInlineStyle { .. } => "set-inline-style",
            Mutation::ReplaceImage { .. } => "replace-image",
            Mutation::RemoveElement { .. } => "remove-element",
            Mutation::InsertSibling { .. } => "insert-sibling",
            Mutation::ReplaceElement { .. } => "replace-element",
            Mutation::MoveElement { .. } => "move-element",
        }
    }

    /// Check structural constraints against the resolved node
    pub fn validate(&self, dom: &Dom, node: NodeId) -> Result<(), MutationError> {
        if !dom.is_element(node) {
            return Err(MutationError::NotAnElement);
        }

        match self {
            Mutation::RemoveElement { .. } if is_protected(dom, node) => {
                Err(MutationError::ProtectedNode("removed"))
            }
            Mutation::ReplaceElement { .. } if is_protected(dom, node) => {
                Err(MutationError::ProtectedNode("replaced"))
            }
            Mutation::InsertSibling { .. } if is_protected(dom, node) => {
                Err(MutationError::ProtectedNode("given siblings"))
            }
            Mutation::MoveElement { .. } if is_protected(dom, node) => {
                Err(MutationError::ProtectedNode("moved"))
            }
            Mutation::InsertSibling { html, .. } | Mutation::ReplaceElement { html, .. } => {
                let fragment = parse_fragment(html);
                if fragment.children(fragment.root()).is_empty() {
                    Err(MutationError::EmptyMarkup)
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Apply to the already-resolved `node`, validating first
    pub fn apply(&self, dom: &mut Dom, node: NodeId) -> Result<(), MutationError> {
        self.validate(dom, node)?;

        match self {
            Mutation::SetAttribute { name, value, .. } => {
                let element = dom.element_mut(node).ok_or(MutationError::NotAnElement)?;
                match value {
                    Some(value) => element.set_attr(name, Some(value.clone())),
                    None => {
                        element.remove_attr(name);
                    }
                }
                Ok(())
            }

            Mutation::AddClass { class, .. } => {
                let element = dom.element_mut(node).ok_or(MutationError::NotAnElement)?;
                element.add_class(class);
                Ok(())
            }

            Mutation::RemoveClass { class, .. } => {
                let element = dom.element_mut(node).ok_or(MutationError::NotAnElement)?;
                element.remove_class(class);
                Ok(())
            }

            Mutation::ToggleClass { class, .. } => {
                let element = dom.element_mut(node).ok_or(MutationError::NotAnElement)?;
                element.toggle_class(class);
                Ok(())
            }

            Mutation::SetText { text, .. } => {
                dom.set_text(node, text);
                Ok(())
            }

            Mutation::SetInnerHtml { html, .. } => {
                dom.set_inner_html(node, html);
                Ok(())
            }

            Mutation::SetInlineStyle {
                property, value, ..
            } => {
                let element = dom.element_mut(node).ok_or(MutationError::NotAnElement)?;
                match merge_style(element.attr("style"), property, value.as_deref()) {
                    Some(style) => element.set_attr("style", Some(style)),
                    None => {
                        element.remove_attr("style");
                    }
                }
                Ok(())
            }

            Mutation::ReplaceImage { src, alt, .. } => {
                let element = dom.element_mut(node).ok_or(MutationError::NotAnElement)?;
                if element.tag_name != "img" {
                    return Err(MutationError::InvalidStructure(format!(
                        "cannot set an image source on <{}>",
                        element.tag_name
                    )));
                }
                element.set_attr("src", Some(src.clone()));
                if let Some(alt) = alt {
                    element.set_attr("alt", Some(alt.clone()));
                }
                // Responsive candidates would keep showing the old image
                element.remove_attr("srcset");
                Ok(())
            }

            Mutation::RemoveElement { .. } => {
                dom.detach(node);
                Ok(())
            }

            Mutation::InsertSibling {
                html, placement, ..
            } => {
                let fragment = parse_fragment(html);
                let nodes = dom.import_fragment(&fragment);
                let mut reference = node;
                for inserted in nodes {
                    match placement {
                        Placement::Before => dom.insert_before(node, inserted),
                        Placement::After => {
                            dom.insert_after(reference, inserted);
                            reference = inserted;
                        }
                    }
                }
                Ok(())
            }

            Mutation::ReplaceElement { html, .. } => {
                dom.replace_with_markup(node, html);
                Ok(())
            }

            Mutation::MoveElement { parent, index, .. } => {
                let parent_node = resolve(dom, parent)
                    .ok_or_else(|| MutationError::ParentNotFound(parent.to_string()))?;
                reorder::move_node(dom, node, parent_node, *index)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_markup::{parse, serialize};

    fn run(source: &str, mutation: Mutation) -> Result<String, MutationError> {
        let mut dom = parse(source);
        let node = resolve(&dom, mutation.address())
            .ok_or_else(|| MutationError::NodeNotFound(mutation.address().to_string()))?;
        mutation.apply(&mut dom, node)?;
        Ok(serialize(&dom))
    }

    #[test]
    fn test_attribute_and_classes() {
        let out = run(
            "<body><a class=\"btn\">x</a></body>",
            Mutation::SetAttribute {
                address: Address::new("body > a"),
                name: "href".to_string(),
                value: Some("/go".to_string()),
            },
        )
        .unwrap();
        assert_eq!(out, "<body><a class=\"btn\" href=\"/go\">x</a></body>");

        let out = run(
            &out,
            Mutation::ToggleClass {
                address: Address::new("body > a"),
                class: "primary".to_string(),
            },
        )
        .unwrap();
        assert_eq!(out, "<body><a class=\"btn primary\" href=\"/go\">x</a></body>");
    }

    #[test]
    fn test_inline_style_merge() {
        assert_eq!(
            merge_style(Some("color: red; width:10px"), "width", Some("240px")),
            Some("color: red; width: 240px;".to_string())
        );
        assert_eq!(
            merge_style(Some("width: 1px;"), "width", None),
            None
        );
        assert_eq!(
            merge_style(None, "Height", Some("90px")),
            Some("height: 90px;".to_string())
        );
    }

    #[test]
    fn test_replace_image() {
        let out = run(
            "<body><img src=\"a.png\" srcset=\"a@2x.png 2x\"></body>",
            Mutation::ReplaceImage {
                address: Address::new("body > img"),
                src: "b.png".to_string(),
                alt: Some("B".to_string()),
            },
        )
        .unwrap();
        assert_eq!(out, "<body><img src=\"b.png\" alt=\"B\"></body>");

        let err = run(
            "<body><p>x</p></body>",
            Mutation::ReplaceImage {
                address: Address::new("body > p"),
                src: "b.png".to_string(),
                alt: None,
            },
        );
        assert!(matches!(err, Err(MutationError::InvalidStructure(_))));
    }

    #[test]
    fn test_insert_sibling_keeps_payload_order() {
        let out = run(
            "<body><h1>a</h1><p>z</p></body>",
            Mutation::InsertSibling {
                address: Address::new("body > h1"),
                html: "<p>b</p><p>c</p>".to_string(),
                placement: Placement::After,
            },
        )
        .unwrap();
        assert_eq!(out, "<body><h1>a</h1><p>b</p><p>c</p><p>z</p></body>");

        let out = run(
            "<body><p>z</p></body>",
            Mutation::InsertSibling {
                address: Address::new("body > p"),
                html: "<h1>a</h1><h2>b</h2>".to_string(),
                placement: Placement::Before,
            },
        )
        .unwrap();
        assert_eq!(out, "<body><h1>a</h1><h2>b</h2><p>z</p></body>");
    }

    #[test]
    fn test_body_is_protected() {
        let err = run(
            "<html><body><p>x</p></body></html>",
            Mutation::RemoveElement {
                address: Address::new("html > body"),
            },
        );
        assert_eq!(err, Err(MutationError::ProtectedNode("removed")));
    }

    #[test]
    fn test_serde_shape() {
        let mutation = Mutation::RemoveElement {
            address: Address::new("#hero"),
        };
        let json = serde_json::to_string(&mutation).unwrap();
        assert_eq!(json, r##"{"type":"removeElement","address":"#hero"}"##);
    }
}
