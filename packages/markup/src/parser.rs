use logos::{Lexer, Logos};
use tracing::trace;

use crate::dom::{is_raw_text, is_void, Attribute, Dom, Element, NodeId};
use crate::tokenizer::Token;

/// Tolerant tree builder for page markup.
///
/// Never fails: unknown constructs degrade to text, stray end tags are
/// dropped and anything still open at the end of input is closed. Start
/// tags close an open element whose end tag is optional when the new tag
/// cannot nest inside it (`<p>` before a block, `<li>` before `<li>`, and
/// likewise for `dt`/`dd`, `option`, `tr` and table cells).
pub struct Parser<'src> {
    lexer: Lexer<'src, Token<'src>>,
    dom: Dom,
    open: Vec<NodeId>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let dom = Dom::new();
        let root = dom.root();
        Self {
            lexer: Token::lexer(source),
            dom,
            open: vec![root],
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or_else(|| self.dom.root())
    }

    /// Build the tree
    pub fn parse_document(mut self) -> Dom {
        while let Some(result) = self.lexer.next() {
            match result {
                Ok(Token::Text(text)) => {
                    let parent = self.current();
                    self.dom.append_text(parent, text);
                }
                Ok(Token::CommentOpen) => self.parse_comment(),
                Ok(Token::Declaration(raw)) => {
                    let content = &raw[2..raw.len() - 1];
                    let node = self.dom.create_doctype(content);
                    let parent = self.current();
                    self.dom.append_child(parent, node);
                }
                Ok(Token::TagOpen(name)) => self.parse_start_tag(name),
                Ok(Token::EndTagOpen(name)) => self.parse_end_tag(name),
                Ok(Token::Lt) | Err(()) => {
                    let slice = self.lexer.slice();
                    let parent = self.current();
                    self.dom.append_text(parent, slice);
                }
            }
        }

        self.dom
    }

    fn parse_comment(&mut self) {
        let rest = self.lexer.remainder();
        let (content, consumed) = match rest.find("-->") {
            Some(end) => (&rest[..end], end + 3),
            None => (rest, rest.len()),
        };
        let node = self.dom.create_comment(content);
        let parent = self.current();
        self.dom.append_child(parent, node);
        self.lexer.bump(consumed);
    }

    fn parse_start_tag(&mut self, name: &'src str) {
        let rest = self.lexer.remainder();
        let Some(scanned) = scan_attributes(rest) else {
            // No closing `>`: keep what we saw as text
            let parent = self.current();
            let raw = format!("<{}", name);
            self.dom.append_text(parent, &raw);
            return;
        };
        self.lexer.bump(scanned.consumed);

        let mut element = Element::new(name);
        element.attributes = scanned.attributes;
        let tag_name = element.tag_name.clone();
        self.close_implied(&tag_name);

        let node = self.dom.create_element(element);
        let parent = self.current();
        self.dom.append_child(parent, node);

        if is_void(&tag_name) {
            return;
        }

        if is_raw_text(&tag_name) {
            if !scanned.self_closing {
                self.parse_raw_text(node, &tag_name);
            }
            return;
        }

        if scanned.self_closing {
            trace!(tag = %tag_name, "self-closing syntax on non-void element");
            return;
        }

        self.open.push(node);
    }

    /// Pop open elements that `tag_name` implicitly ends, along with
    /// anything opened inside them
    fn close_implied(&mut self, tag_name: &str) {
        if let Some((closes, boundaries)) = implied_end(tag_name) {
            self.close_in_scope(tag_name, closes, boundaries);
        }
        if CLOSES_P.contains(&tag_name) || matches!(tag_name, "li" | "dt" | "dd") {
            self.close_in_scope(tag_name, &["p"], SCOPE_BOUNDARIES);
        }
    }

    /// Close the nearest open element in `closes`, unless a boundary is
    /// reached first
    fn close_in_scope(&mut self, tag_name: &str, closes: &[&str], boundaries: &[&str]) {
        for index in (1..self.open.len()).rev() {
            let Some(open) = self.dom.tag_name(self.open[index]) else {
                continue;
            };
            if closes.contains(&open) {
                trace!(tag = %tag_name, closed = %open, "implied end tag");
                self.open.truncate(index);
                return;
            }
            if boundaries.contains(&open) {
                return;
            }
        }
    }

    /// Consume raw text up to `</tag_name` and the end tag itself
    fn parse_raw_text(&mut self, node: NodeId, tag_name: &str) {
        let rest = self.lexer.remainder();
        let needle = format!("</{}", tag_name);
        let end = find_ignore_ascii_case(rest, &needle);

        let (text_end, consumed) = match end {
            Some(start) => {
                let after = &rest[start..];
                let close = after.find('>').map(|i| i + 1).unwrap_or(after.len());
                (start, start + close)
            }
            None => (rest.len(), rest.len()),
        };

        self.dom.append_text(node, &rest[..text_end]);
        self.lexer.bump(consumed);
    }

    fn parse_end_tag(&mut self, name: &str) {
        let rest = self.lexer.remainder();
        let consumed = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
        self.lexer.bump(consumed);

        let tag_name = name.to_ascii_lowercase();
        let matching = self
            .open
            .iter()
            .rposition(|id| self.dom.tag_name(*id) == Some(tag_name.as_str()));

        match matching {
            // Index 0 is the document root, which never matches a tag
            Some(index) => self.open.truncate(index),
            None => trace!(tag = %tag_name, "dropping unmatched end tag"),
        }
    }
}

/// Elements that stop the search for an open `<p>`
const SCOPE_BOUNDARIES: &[&str] = &["html", "body", "table", "td", "th", "caption", "button", "template", "object"];

/// Start tags that close an open `<p>`
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Open elements a start tag ends, and the elements that stop the search
fn implied_end(tag_name: &str) -> Option<(&'static [&'static str], &'static [&'static str])> {
    let rule: (&'static [&'static str], &'static [&'static str]) = match tag_name {
        "li" => (&["li"], &["ul", "ol", "menu", "html", "body", "table", "td", "th", "template"]),
        "dt" | "dd" => (&["dt", "dd"], &["dl", "html", "body", "table", "td", "th", "template"]),
        "option" => (&["option"], &["select", "datalist", "optgroup", "html", "body"]),
        "optgroup" => (&["optgroup", "option"], &["select", "html", "body"]),
        "tr" => (&["tr"], &["table", "thead", "tbody", "tfoot", "html", "template"]),
        "td" | "th" => (&["td", "th"], &["tr", "table", "html", "template"]),
        "thead" | "tbody" | "tfoot" => (&["thead", "tbody", "tfoot"], &["table", "html", "template"]),
        _ => return None,
    };
    Some(rule)
}

struct ScannedTag {
    attributes: Vec<Attribute>,
    self_closing: bool,
    consumed: usize,
}

/// Scan an attribute list up to and including the closing `>`.
///
/// Returns `None` when the tag never closes (including an unterminated
/// quoted value).
fn scan_attributes(rest: &str) -> Option<ScannedTag> {
    let bytes = rest.as_bytes();
    let mut idx = 0;
    let mut attributes: Vec<Attribute> = Vec::new();

    loop {
        while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
            idx += 1;
        }
        let byte = *bytes.get(idx)?;

        match byte {
            b'>' => {
                return Some(ScannedTag {
                    attributes,
                    self_closing: false,
                    consumed: idx + 1,
                });
            }
            b'/' => {
                idx += 1;
                if bytes.get(idx) == Some(&b'>') {
                    return Some(ScannedTag {
                        attributes,
                        self_closing: true,
                        consumed: idx + 1,
                    });
                }
                continue;
            }
            _ => {}
        }

        let name_start = idx;
        while idx < bytes.len()
            && !bytes[idx].is_ascii_whitespace()
            && !matches!(bytes[idx], b'=' | b'>' | b'/')
        {
            idx += 1;
        }
        if idx == name_start {
            // A lone `=` or similar; skip it
            idx += 1;
            continue;
        }
        let name = &rest[name_start..idx];

        let mut lookahead = idx;
        while lookahead < bytes.len() && bytes[lookahead].is_ascii_whitespace() {
            lookahead += 1;
        }

        let value = if bytes.get(lookahead) == Some(&b'=') {
            idx = lookahead + 1;
            while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
                idx += 1;
            }
            match bytes.get(idx) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = idx + 1;
                    let len = rest[value_start..].find(quote as char)?;
                    idx = value_start + len + 1;
                    Some(rest[value_start..value_start + len].to_string())
                }
                Some(_) => {
                    let value_start = idx;
                    while idx < bytes.len()
                        && !bytes[idx].is_ascii_whitespace()
                        && bytes[idx] != b'>'
                    {
                        idx += 1;
                    }
                    Some(rest[value_start..idx].to_string())
                }
                None => return None,
            }
        } else {
            None
        };

        // First occurrence wins, as in browsers
        if !attributes.iter().any(|a| a.name.eq_ignore_ascii_case(name)) {
            attributes.push(Attribute::new(name, value));
        }
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || hay.len() < pat.len() {
        return None;
    }
    (0..=hay.len() - pat.len()).find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

/// Parse a full document
pub fn parse(source: &str) -> Dom {
    Parser::new(source).parse_document()
}

/// Parse a markup fragment (section payload, inner markup).
///
/// Same rules as [`parse`]; top-level nodes become children of the root.
pub fn parse_fragment(markup: &str) -> Dom {
    Parser::new(markup).parse_document()
}
