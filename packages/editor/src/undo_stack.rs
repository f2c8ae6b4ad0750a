//! # Undo/Redo Stack
//!
//! Full-document snapshots. Each entry holds the document as it was before
//! a change; undoing swaps it with the current document.
//!
//! - New changes clear the redo stack
//! - Batches group several changes into one undo step
//! - The oldest entries are dropped past `max_levels` (0 = unlimited)

/// One undo step
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Document before the change
    pub snapshot: String,

    /// Optional description of this step
    pub description: Option<String>,
}

#[derive(Debug, Default)]
struct Batch {
    before: Option<String>,
    description: Option<String>,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied changes (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Stack of undone changes (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<Batch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record the document as it was before a change
    pub fn record(&mut self, before: &str, description: Option<&str>) {
        if let Some(batch) = &mut self.current_batch {
            // Only the state before the first change of a batch matters
            if batch.before.is_none() {
                batch.before = Some(before.to_string());
            }
            return;
        }

        self.push_entry(HistoryEntry {
            snapshot: before.to_string(),
            description: description.map(str::to_string),
        });
    }

    /// Start a batch of changes (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        if self.current_batch.is_none() {
            self.current_batch = Some(Batch::default());
        }
    }

    /// End the current batch and push it to the undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if let Some(before) = batch.before {
                self.push_entry(HistoryEntry {
                    snapshot: before,
                    description: batch.description,
                });
            }
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new change invalidates the future
        self.redo_stack.clear();
    }

    /// Step back, returning the document to restore
    pub fn undo(&mut self, current: &str) -> Option<String> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(HistoryEntry {
            snapshot: current.to_string(),
            description: entry.description.clone(),
        });
        Some(entry.snapshot)
    }

    /// Step forward again, returning the document to restore
    pub fn redo(&mut self, current: &str) -> Option<String> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(HistoryEntry {
            snapshot: current.to_string(),
            description: entry.description.clone(),
        });
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
