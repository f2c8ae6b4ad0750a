//! # Node addresses
//!
//! Path-based addresses for elements in a tree that gets rebuilt from a
//! string on every change.
//!
//! An address is a list of segments from the document root down to the
//! element, joined with ` > `:
//!
//! ```text
//! html > body > section:nth-of-type(2) > h2
//! #pricing > div:nth-of-type(3)
//! ```
//!
//! Built by walking from the element up to the root. An element with a
//! usable id emits `#id` and ends the walk; every other element emits its
//! tag, qualified with `:nth-of-type(k)` (1-based among same-tag element
//! siblings) when it has same-tag siblings.
//!
//! The rendering surface and the controller both run this exact function,
//! so an address reported from one side must resolve to the same element on
//! the other as long as both hold the same markup. Addresses are values,
//! not references: re-resolve after every mutation.

use std::fmt;
use std::str::FromStr;

use logos::Logos;
use serde::{Deserialize, Serialize};

use crate::dom::{Dom, NodeId};
use crate::error::{MarkupError, MarkupResult};

/// One step of an address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// `tag` or `tag:nth-of-type(k)`
    Tag { name: String, nth: Option<usize> },
    /// `#id`; only ever the first segment of a computed address
    Id(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Tag { name, nth: None } => write!(f, "{}", name),
            Segment::Tag {
                name,
                nth: Some(k),
            } => write!(f, "{}:nth-of-type({})", name, k),
            Segment::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// Re-resolvable address of an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an address string without validating it.
    ///
    /// Malformed strings simply never resolve.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_segments(segments: &[Segment]) -> Self {
        Self(
            segments
                .iter()
                .map(Segment::to_string)
                .collect::<Vec<_>>()
                .join(" > "),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> MarkupResult<Vec<Segment>> {
        parse_segments(&self.0)
    }

    /// Whether `self` names an ancestor-or-self path prefix of `other`
    /// (purely textual, no tree needed)
    pub fn is_prefix_of(&self, other: &Address) -> bool {
        match (self.segments(), other.segments()) {
            (Ok(mine), Ok(theirs)) => {
                mine.len() <= theirs.len() && mine.iter().zip(theirs.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = parse_segments(s)?;
        Ok(Self::from_segments(&segments))
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum SelectorToken<'src> {
    #[regex(r"[a-zA-Z][a-zA-Z0-9_.-]*", |lex| lex.slice())]
    Tag(&'src str),

    #[regex(r"#[^\s>]+", |lex| &lex.slice()[1..])]
    Id(&'src str),

    #[regex(r":nth-of-type\([1-9][0-9]*\)", |lex| {
        let s = lex.slice();
        s[13..s.len() - 1].parse::<usize>().ok()
    })]
    NthOfType(usize),

    #[token(">")]
    Child,
}

fn parse_segments(raw: &str) -> MarkupResult<Vec<Segment>> {
    let mut lexer = SelectorToken::lexer(raw);
    let mut segments = Vec::new();
    let mut expect_segment = true;

    while let Some(token) = lexer.next() {
        let pos = lexer.span().start;
        match token {
            Ok(SelectorToken::Tag(name)) if expect_segment => {
                segments.push(Segment::Tag {
                    name: name.to_ascii_lowercase(),
                    nth: None,
                });
                expect_segment = false;
            }
            Ok(SelectorToken::Id(id)) if expect_segment => {
                segments.push(Segment::Id(id.to_string()));
                expect_segment = false;
            }
            Ok(SelectorToken::NthOfType(k)) => match segments.last_mut() {
                Some(Segment::Tag { nth, .. }) if !expect_segment && nth.is_none() => {
                    *nth = Some(k);
                }
                _ => return Err(MarkupError::invalid_selector(pos, "unexpected :nth-of-type")),
            },
            Ok(SelectorToken::Child) if !expect_segment => expect_segment = true,
            Ok(other) => {
                return Err(MarkupError::invalid_selector(
                    pos,
                    format!("unexpected {:?}", other),
                ))
            }
            Err(()) => {
                return Err(MarkupError::invalid_selector(
                    pos,
                    format!("unrecognised input '{}'", lexer.slice()),
                ))
            }
        }
    }

    if segments.is_empty() {
        return Err(MarkupError::EmptySelector);
    }
    if expect_segment {
        return Err(MarkupError::invalid_selector(raw.len(), "dangling '>'"));
    }
    Ok(segments)
}

/// The element's id, if it may short-circuit an address
fn usable_id(dom: &Dom, id: NodeId) -> Option<&str> {
    let value = dom.attr(id, "id")?;
    let valid = !value.is_empty() && !value.contains(|c: char| c.is_whitespace() || c == '>');
    (valid && dom.count_id(value) == 1).then_some(value)
}

/// Compute the address of an attached element.
///
/// Returns `None` for non-elements and detached nodes.
pub fn address_of(dom: &Dom, node: NodeId) -> Option<Address> {
    let mut segments = Vec::new();
    let mut current = node;

    loop {
        let element = dom.element(current)?;

        if let Some(id) = usable_id(dom, current) {
            segments.push(Segment::Id(id.to_string()));
            break;
        }

        let parent = dom.parent(current)?;
        let same_tag: Vec<NodeId> = dom
            .element_children(parent)
            .into_iter()
            .filter(|c| dom.tag_name(*c) == Some(element.tag_name.as_str()))
            .collect();
        let nth = if same_tag.len() > 1 {
            same_tag.iter().position(|c| *c == current).map(|i| i + 1)
        } else {
            None
        };

        segments.push(Segment::Tag {
            name: element.tag_name.clone(),
            nth,
        });

        if parent == dom.root() {
            break;
        }
        current = parent;
    }

    // A detached subtree would have bailed out on a missing parent above,
    // unless it was cut off right at an id
    if !dom.is_attached(node) {
        return None;
    }

    segments.reverse();
    Some(Address::from_segments(&segments))
}

/// Resolve an address against a tree.
///
/// Returns `None` when the address is malformed or names nothing; callers
/// treat that as a miss, never as an error.
pub fn resolve(dom: &Dom, address: &Address) -> Option<NodeId> {
    let segments = address.segments().ok()?;
    let mut current = dom.root();

    for segment in &segments {
        current = match segment {
            Segment::Id(id) => {
                if current == dom.root() {
                    dom.find_by_id(id)?
                } else {
                    dom.descendants(current)
                        .into_iter()
                        .find(|n| dom.attr(*n, "id") == Some(id.as_str()))?
                }
            }
            Segment::Tag { name, nth } => {
                let index = nth.unwrap_or(1) - 1;
                dom.element_children(current)
                    .into_iter()
                    .filter(|c| dom.tag_name(*c) == Some(name.as_str()))
                    .nth(index)?
            }
        };
    }

    (current != dom.root()).then_some(current)
}

/// Convenience for string addresses
pub fn resolve_str(dom: &Dom, address: &str) -> Option<NodeId> {
    resolve(dom, &Address::new(address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const PAGE: &str = r#"<html><body>
        <header id="top"><nav><a href="/">Home</a><a href="/about">About</a></nav></header>
        <section><h2>One</h2><p>a</p><p>b</p></section>
        <section class="x"><div id="dup">1</div><div id="dup">2</div></section>
        <footer><p>c</p></footer>
    </body></html>"#;

    #[test]
    fn test_address_format() {
        let dom = parse(PAGE);

        let second_p = dom.find_all("p")[1];
        assert_eq!(
            address_of(&dom, second_p).unwrap().as_str(),
            "html > body > section:nth-of-type(1) > p:nth-of-type(2)"
        );

        let about = dom.find_all("a")[1];
        assert_eq!(
            address_of(&dom, about).unwrap().as_str(),
            "#top > nav > a:nth-of-type(2)"
        );

        let footer_p = dom.find_all("p")[2];
        assert_eq!(
            address_of(&dom, footer_p).unwrap().as_str(),
            "html > body > footer > p"
        );
    }

    #[test]
    fn test_duplicate_ids_do_not_short_circuit() {
        let dom = parse(PAGE);
        let second_dup = dom.find_all("div")[1];
        assert_eq!(
            address_of(&dom, second_dup).unwrap().as_str(),
            "html > body > section:nth-of-type(2) > div:nth-of-type(2)"
        );
    }

    #[test]
    fn test_every_element_round_trips() {
        let dom = parse(PAGE);
        for element in dom.elements() {
            let address = address_of(&dom, element).unwrap();
            assert_eq!(resolve(&dom, &address), Some(element), "{}", address);
        }
    }

    #[test]
    fn test_resolve_misses() {
        let dom = parse(PAGE);
        assert_eq!(resolve_str(&dom, "html > body > aside"), None);
        assert_eq!(resolve_str(&dom, "html > body > section:nth-of-type(9)"), None);
        assert_eq!(resolve_str(&dom, "#missing"), None);
        assert_eq!(resolve_str(&dom, "html > > body"), None);
        assert_eq!(resolve_str(&dom, ""), None);
    }

    #[test]
    fn test_detached_nodes_have_no_address() {
        let mut dom = parse(PAGE);
        let h2 = dom.find_first("h2").unwrap();
        dom.detach(h2);
        assert_eq!(address_of(&dom, h2), None);
    }

    #[test]
    fn test_parse_segments() {
        let segments = Address::new("#a > div:nth-of-type(3) > span").segments().unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Id("a".to_string()),
                Segment::Tag {
                    name: "div".to_string(),
                    nth: Some(3)
                },
                Segment::Tag {
                    name: "span".to_string(),
                    nth: None
                },
            ]
        );

        assert!(Address::new("div >").segments().is_err());
        assert!(Address::new("div:nth-of-type(0)").segments().is_err());
        assert!("body>main".parse::<Address>().is_ok());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let address = Address::new("#hero > h1");
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"#hero > h1\"");
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
    }

    #[test]
    fn test_prefix() {
        let parent = Address::new("html > body > section");
        let child = Address::new("html > body > section > p");
        assert!(parent.is_prefix_of(&child));
        assert!(!child.is_prefix_of(&parent));
    }
}
