use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::EditorError;

/// Tunables of an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum undo depth (0 = unlimited)
    pub undo_levels: usize,

    /// Minimum classifier confidence for a header/footer detection
    pub confidence_threshold: u32,

    /// Quiet period before content placeholders are resolved
    pub content_debounce_ms: u64,

    /// Characters of text kept in a selection snapshot
    pub text_preview_length: usize,

    /// Repeated failures of one kind before a retry is offered
    pub retry_after_failures: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_levels: 100,
            confidence_threshold: 50,
            content_debounce_ms: 400,
            text_preview_length: 80,
            retry_after_failures: 2,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn content_debounce(&self) -> Duration {
        Duration::from_millis(self.content_debounce_ms)
    }
}
