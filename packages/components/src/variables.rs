//! Variable fields of a component fragment.
//!
//! Extraction walks a fragment in document order and exposes the content a
//! user would want to change per use: the text of headings, paragraphs,
//! links and buttons, image `src`/`alt` and link `href`. Each field is
//! located by an address relative to the fragment, so applying values is a
//! matter of re-resolving and writing.

use std::collections::HashMap;

use pagewright_markup::{address_of, parse_fragment, resolve, serialize, Address, Dom, NodeId};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Heading,
    Text,
    LinkText,
    ButtonText,
    Url,
    Image,
    AltText,
}

impl FieldType {
    fn as_str(&self) -> &'static str {
        match self {
            FieldType::Heading => "heading",
            FieldType::Text => "text",
            FieldType::LinkText => "link_text",
            FieldType::ButtonText => "button_text",
            FieldType::Url => "url",
            FieldType::Image => "image",
            FieldType::AltText => "alt_text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableField {
    /// Stable name within the fragment, e.g. `heading_1`
    pub name: String,
    pub selector: Address,
    /// Attribute holding the value; `None` means the element's text
    pub attribute: Option<String>,
    pub default_value: String,
    pub field_type: FieldType,
}

fn text_field_type(tag: &str) -> Option<FieldType> {
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some(FieldType::Heading),
        "p" => Some(FieldType::Text),
        "a" => Some(FieldType::LinkText),
        "button" => Some(FieldType::ButtonText),
        _ => None,
    }
}

/// Elements whose content is plain text only
fn has_only_text(dom: &Dom, id: NodeId) -> bool {
    dom.children(id).iter().all(|c| !dom.is_element(*c))
}

pub fn extract_variables(markup: &str) -> Vec<VariableField> {
    let dom = parse_fragment(markup);
    let mut fields = Vec::new();
    let mut counts: HashMap<FieldType, usize> = HashMap::new();

    let mut push = |fields: &mut Vec<VariableField>,
                    selector: &Address,
                    attribute: Option<&str>,
                    value: String,
                    field_type: FieldType| {
        let n = counts.entry(field_type).or_insert(0);
        *n += 1;
        fields.push(VariableField {
            name: format!("{}_{}", field_type.as_str(), n),
            selector: selector.clone(),
            attribute: attribute.map(str::to_string),
            default_value: value,
            field_type,
        });
    };

    for id in dom.elements() {
        let Some(tag) = dom.tag_name(id) else {
            continue;
        };
        let Some(selector) = address_of(&dom, id) else {
            continue;
        };

        if let Some(field_type) = text_field_type(tag) {
            let text = dom.text_content(id);
            if has_only_text(&dom, id) && !text.trim().is_empty() {
                push(&mut fields, &selector, None, text.trim().to_string(), field_type);
            }
        }

        match tag {
            "a" => {
                if let Some(href) = dom.attr(id, "href") {
                    push(&mut fields, &selector, Some("href"), href.to_string(), FieldType::Url);
                }
            }
            "img" => {
                if let Some(src) = dom.attr(id, "src") {
                    push(&mut fields, &selector, Some("src"), src.to_string(), FieldType::Image);
                }
                if let Some(alt) = dom.attr(id, "alt") {
                    push(&mut fields, &selector, Some("alt"), alt.to_string(), FieldType::AltText);
                }
            }
            _ => {}
        }
    }

    fields
}

/// Write `values` (by field name) into the fragment. Fields without a value
/// keep their default.
pub fn apply_variables(
    markup: &str,
    fields: &[VariableField],
    values: &HashMap<String, String>,
) -> String {
    let mut dom = parse_fragment(markup);

    for field in fields {
        let Some(value) = values.get(&field.name) else {
            continue;
        };
        let Some(node) = resolve(&dom, &field.selector) else {
            warn!(field = %field.name, selector = %field.selector, "variable field no longer resolves");
            continue;
        };
        match &field.attribute {
            Some(attribute) => {
                if let Some(element) = dom.element_mut(node) {
                    element.set_attr(attribute, Some(value.clone()));
                }
            }
            None => dom.set_text(node, value),
        }
    }

    serialize(&dom)
}
