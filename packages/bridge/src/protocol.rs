//! # Message protocol
//!
//! JSON messages exchanged between the sandboxed rendering surface (the
//! realm) and the editing controller, tagged by `type` in kebab-case.
//!
//! Decoding checks the tag against the known set before deserializing, so
//! an unknown message is rejected by name instead of failing as a generic
//! shape error.

use pagewright_editor::ElementSnapshot;
use pagewright_markup::Address;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ProtocolError, ProtocolResult};

/// Realm → controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RealmMessage {
    ElementSelected {
        address: Address,
        snapshot: ElementSnapshot,
    },

    ElementHovered {
        address: Option<Address>,
    },

    /// Inline text editing committed (blur or Enter)
    TextEdited {
        address: Address,
        html: String,
    },

    DeleteElement {
        address: Address,
    },

    /// A node was dragged in the page; carries the whole reconstructed
    /// document
    ElementMoved {
        document: String,
    },

    SectionReordered {
        document: String,
    },

    ContextMenu {
        x: f64,
        y: f64,
        address: Address,
        snapshot: ElementSnapshot,
    },

    ElementResized {
        address: Address,
        width: f64,
        height: f64,
    },
}

impl RealmMessage {
    pub const TYPES: &'static [&'static str] = &[
        "element-selected",
        "element-hovered",
        "text-edited",
        "delete-element",
        "element-moved",
        "section-reordered",
        "context-menu",
        "element-resized",
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            RealmMessage::ElementSelected { .. } => "element-selected",
            RealmMessage::ElementHovered { .. } => "element-hovered",
            RealmMessage::TextEdited { .. } => "text-edited",
            RealmMessage::DeleteElement { .. } => "delete-element",
            RealmMessage::ElementMoved { .. } => "element-moved",
            RealmMessage::SectionReordered { .. } => "section-reordered",
            RealmMessage::ContextMenu { .. } => "context-menu",
            RealmMessage::ElementResized { .. } => "element-resized",
        }
    }
}

/// Controller → realm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControllerMessage {
    SelectElement { address: Address },
    Deselect,
    HoverElement { address: Option<Address> },
    /// Instrumented markup to render from scratch
    LoadDocument { html: String },
}

impl ControllerMessage {
    pub const TYPES: &'static [&'static str] =
        &["select-element", "deselect", "hover-element", "load-document"];

    pub fn kind(&self) -> &'static str {
        match self {
            ControllerMessage::SelectElement { .. } => "select-element",
            ControllerMessage::Deselect => "deselect",
            ControllerMessage::HoverElement { .. } => "hover-element",
            ControllerMessage::LoadDocument { .. } => "load-document",
        }
    }
}

fn decode<T: DeserializeOwned>(json: &str, known: &[&str]) -> ProtocolResult<T> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let tag = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or(ProtocolError::MissingType)?;

    if !known.contains(&tag) {
        warn!(message_type = tag, "rejecting unknown message");
        return Err(ProtocolError::UnknownMessage(tag.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

pub fn decode_realm(json: &str) -> ProtocolResult<RealmMessage> {
    decode(json, RealmMessage::TYPES)
}

pub fn decode_controller(json: &str) -> ProtocolResult<ControllerMessage> {
    decode(json, ControllerMessage::TYPES)
}

pub fn encode<T: Serialize>(message: &T) -> ProtocolResult<String> {
    Ok(serde_json::to_string(message)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let json = encode(&RealmMessage::DeleteElement {
            address: Address::new("body > section:nth-of-type(2)"),
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"delete-element","address":"body > section:nth-of-type(2)"}"#
        );

        let json = encode(&ControllerMessage::Deselect).unwrap();
        assert_eq!(json, r#"{"type":"deselect"}"#);
    }

    #[test]
    fn test_decode_snapshot_message() {
        let json = r##"{
            "type": "element-selected",
            "address": "#hero",
            "snapshot": {
                "tagName": "section",
                "classes": ["hero"],
                "textPreview": "Welcome",
                "markup": "<section id=\"hero\" class=\"hero\">Welcome</section>",
                "rect": { "x": 0.0, "y": 10.0, "width": 800.0, "height": 240.0 }
            }
        }"##;
        let message = decode_realm(json).unwrap();
        match message {
            RealmMessage::ElementSelected { address, snapshot } => {
                assert_eq!(address, Address::new("#hero"));
                assert_eq!(snapshot.tag_name, "section");
                assert_eq!(snapshot.rect.map(|r| r.height), Some(240.0));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = decode_realm(r#"{"type":"format-disk"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownMessage(tag) if tag == "format-disk"));

        assert!(matches!(
            decode_realm(r##"{"address":"#x"}"##),
            Err(ProtocolError::MissingType)
        ));
        assert!(matches!(
            decode_controller("not json"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_every_known_tag_matches_kind() {
        let message = ControllerMessage::HoverElement { address: None };
        assert!(ControllerMessage::TYPES.contains(&message.kind()));
        let decoded = decode_controller(&encode(&message).unwrap()).unwrap();
        assert_eq!(decoded, message);
    }
}
