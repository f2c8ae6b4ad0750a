//! # Patch framing
//!
//! Generated responses are framed as:
//!
//! ```text
//! MESSAGE: Added a pricing section
//! ---
//! OPERATION: add
//! ---
//! <section>...</section>
//! ```
//!
//! Two passes read this format:
//!
//! - [`preview`] is tolerant and runs on partial buffers while the response
//!   is still streaming. Its output is only ever shown, never applied.
//! - [`parse_patch`] is strict and runs once on the completed buffer. Its
//!   output is the only thing that may be applied.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::PatchParseError;
use crate::patch::{Operation, Patch};

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*---[ \t]*\r?$").expect("static regex"))
}

fn message_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^\s*MESSAGE:\s*(.*?)\s*$").expect("static regex"))
}

fn operation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*OPERATION:\s*([A-Za-z_-]+)\s*$").expect("static regex"))
}

fn tag_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(?:!doctype|[a-z])").expect("static regex"))
}

fn document_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*<(?:!doctype|html)").expect("static regex"))
}

fn fence_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*```[A-Za-z]*[ \t]*\r?\n?").expect("static regex"))
}

fn fence_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n?```\s*$").expect("static regex"))
}

/// Split on the first two separator lines
fn split_sections(buffer: &str) -> Vec<&str> {
    let mut sections = Vec::with_capacity(3);
    let mut start = 0;
    for found in separator_re().find_iter(buffer) {
        sections.push(&buffer[start..found.start()]);
        start = found.end();
        if sections.len() == 2 {
            break;
        }
    }
    sections.push(&buffer[start..]);
    sections
}

/// Remove a surrounding markdown code fence, complete or not
fn strip_fences(markup: &str) -> &str {
    let start = fence_open_re().find(markup).map(|m| m.end()).unwrap_or(0);
    let rest = &markup[start..];
    let end = fence_close_re()
        .find(rest)
        .map(|m| m.start())
        .unwrap_or(rest.len());
    &rest[..end]
}

fn read_message(section: &str) -> Option<String> {
    let captures = message_re().captures(section)?;
    let text = captures.get(1)?.as_str().trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn read_operation(section: &str) -> Result<Operation, PatchParseError> {
    let captures = operation_re()
        .captures(section)
        .ok_or(PatchParseError::MissingOperation)?;
    captures
        .get(1)
        .map(|m| m.as_str())
        .ok_or(PatchParseError::MissingOperation)?
        .parse()
}

/// Best-effort view of a partial buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub message: Option<String>,
    pub operation: Option<Operation>,
    /// Markup received so far (may end mid-tag)
    pub markup: String,
}

/// Tolerant pass over a possibly incomplete buffer.
///
/// Returns `None` while nothing previewable has arrived yet.
pub fn preview(buffer: &str) -> Option<Preview> {
    let sections = split_sections(buffer);

    if sections.len() == 3 {
        let markup = strip_fences(sections[2]).trim_start().to_string();
        return Some(Preview {
            message: read_message(sections[0]),
            operation: read_operation(sections[1]).ok(),
            markup,
        });
    }

    // Framed but the header is still streaming
    if message_re().is_match(sections[0]) {
        return None;
    }

    // Legacy, unframed output: markup starts at the first tag-like token
    let start = tag_start_re().find(buffer)?.start();
    let markup = strip_fences(&buffer[start..]).to_string();
    Some(Preview {
        message: None,
        operation: None,
        markup,
    })
}

/// Strict pass over a completed buffer
pub fn parse_patch(buffer: &str) -> Result<Patch, PatchParseError> {
    let sections = split_sections(buffer);

    match sections.len() {
        3 => {}
        1 => {
            // Unframed output is only accepted when it is a whole document
            let markup = strip_fences(buffer.trim()).trim();
            if document_start_re().is_match(markup) {
                return Ok(Patch::replace_all(markup));
            }
            return Err(PatchParseError::Unframed);
        }
        _ => return Err(PatchParseError::MissingSeparator("operation")),
    }

    let message = read_message(sections[0]).or_else(|| {
        let text = sections[0].trim();
        (!text.is_empty()).then(|| text.to_string())
    });
    let operation = read_operation(sections[1])?;
    let markup = strip_fences(sections[2]).trim();

    if markup.is_empty() {
        return Err(PatchParseError::EmptyMarkup);
    }

    Ok(Patch {
        message,
        operation,
        markup: markup.to_string(),
    })
}

/// Accumulates streamed chunks of a generated response
#[derive(Debug, Clone, Default)]
pub struct PatchBuffer {
    text: String,
    chunks: usize,
}

impl PatchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) {
        self.text.push_str(chunk);
        self.chunks += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.chunks = 0;
    }

    /// Tolerant pass, for live preview only
    pub fn preview(&self) -> Option<Preview> {
        preview(&self.text)
    }

    /// Strict pass, for the completed buffer
    pub fn finish(&self) -> Result<Patch, PatchParseError> {
        parse_patch(&self.text)
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
