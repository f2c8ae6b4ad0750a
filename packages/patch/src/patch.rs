use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PatchParseError;

/// What a patch does to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Insert new sections
    Add,
    /// Replace existing content
    Modify,
    /// The payload is the whole new document
    ReplaceAll,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Modify => "modify",
            Operation::ReplaceAll => "replace_all",
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            Operation::Add => Scope::NewSection,
            Operation::Modify => Scope::ExistingContent,
            Operation::ReplaceAll => Scope::Document,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = PatchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "add" => Ok(Operation::Add),
            "modify" | "edit" => Ok(Operation::Modify),
            "replace_all" | "replaceall" => Ok(Operation::ReplaceAll),
            _ => Err(PatchParseError::UnknownOperation(s.trim().to_string())),
        }
    }
}

/// Which part of the document a patch touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    NewSection,
    ExistingContent,
    Document,
}

/// A complete, strictly parsed patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Human-readable summary from the generator
    pub message: Option<String>,
    pub operation: Operation,
    pub markup: String,
}

impl Patch {
    pub fn new(operation: Operation, markup: impl Into<String>) -> Self {
        Self {
            message: None,
            operation,
            markup: markup.into(),
        }
    }

    pub fn replace_all(markup: impl Into<String>) -> Self {
        Self::new(Operation::ReplaceAll, markup)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn scope(&self) -> Scope {
        self.operation.scope()
    }

    /// Render back into the framed text format
    pub fn to_framed(&self) -> String {
        format!(
            "MESSAGE: {}\n---\nOPERATION: {}\n---\n{}",
            self.message.as_deref().unwrap_or(""),
            self.operation,
            self.markup
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_parsing() {
        assert_eq!("add".parse::<Operation>(), Ok(Operation::Add));
        assert_eq!(" MODIFY ".parse::<Operation>(), Ok(Operation::Modify));
        assert_eq!("replace-all".parse::<Operation>(), Ok(Operation::ReplaceAll));
        assert_eq!(
            "delete".parse::<Operation>(),
            Err(PatchParseError::UnknownOperation("delete".to_string()))
        );
    }

    #[test]
    fn test_operation_serde_names() {
        let json = serde_json::to_string(&Operation::ReplaceAll).unwrap();
        assert_eq!(json, "\"replace_all\"");
    }

    #[test]
    fn test_scope() {
        assert_eq!(Operation::Add.scope(), Scope::NewSection);
        assert_eq!(Operation::Modify.scope(), Scope::ExistingContent);
        assert_eq!(Operation::ReplaceAll.scope(), Scope::Document);
    }
}
