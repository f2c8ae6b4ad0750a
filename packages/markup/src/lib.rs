//! # Pagewright Markup
//!
//! Tolerant page markup model shared by every side of the editor:
//!
//! - [`parse`] builds an arena [`Dom`] from any markup string (never fails)
//! - [`serialize`] turns it back into markup, preserving the author's text
//! - [`selector`] computes and re-resolves element [`Address`]es
//!
//! The canonical document is always a string. Trees are rebuilt from it on
//! demand and thrown away after each edit.

pub mod dom;
pub mod error;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod tokenizer;

pub use dom::{escape_text, Attribute, Dom, Element, Node, NodeId, NodeKind};
pub use error::{MarkupError, MarkupResult};
pub use parser::{parse, parse_fragment, Parser};
pub use selector::{address_of, resolve, resolve_str, Address, Segment};
pub use serializer::{inner_html, outer_html, serialize, Serializer};
pub use tokenizer::{tokenize, Token};
