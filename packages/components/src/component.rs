use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a component lives on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Header,
    Footer,
    Content,
}

impl Position {
    /// Positions that can hold a site-wide component
    pub const GLOBAL: [Position; 2] = [Position::Header, Position::Footer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Header => "header",
            Position::Footer => "footer",
            Position::Content => "content",
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Position::Header | Position::Footer)
    }

    /// Semantic tag for this position
    pub fn tag_name(&self) -> Option<&'static str> {
        match self {
            Position::Header => Some("header"),
            Position::Footer => Some("footer"),
            Position::Content => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reusable block of markup shared across the pages of a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalComponent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub html: String,
    pub position: Position,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl GlobalComponent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        html: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            html: html.into(),
            position,
            is_default: false,
            updated_at: Utc::now(),
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Per-page choice for one global position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum PageOverride {
    /// Render no global component here
    Hidden,
    /// Render this component instead of the site default
    Component { id: String },
}

/// Overrides a page carries for its global positions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<PageOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<PageOverride>,
}

impl PageOverrides {
    pub fn get(&self, position: Position) -> Option<&PageOverride> {
        match position {
            Position::Header => self.header.as_ref(),
            Position::Footer => self.footer.as_ref(),
            Position::Content => None,
        }
    }

    pub fn set(&mut self, position: Position, value: Option<PageOverride>) {
        match position {
            Position::Header => self.header = value,
            Position::Footer => self.footer = value,
            Position::Content => {}
        }
    }
}
