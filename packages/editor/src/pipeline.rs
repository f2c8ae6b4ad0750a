//! # Editing Pipeline
//!
//! Every change to a document goes through one path:
//!
//! ```text
//! parse → resolve address → mutate → serialize → post-effects → commit
//! ```
//!
//! Commit stores the new string as the canonical document, pushes the
//! previous one onto the undo stack and clears redo. A change that misses
//! its address, is rejected, or leaves the document as it was is a no-op:
//! nothing is committed and nothing is pushed.

use pagewright_markup::{parse, resolve, serialize, Address, Dom, NodeId};
use thiserror::Error;
use tracing::{debug, info};

use crate::mutations::{Mutation, MutationError};
use crate::post_effects::PostEffectEngine;
use crate::undo_stack::UndoStack;
use crate::Document;

/// Why a change did not produce a new document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoopReason {
    #[error("Address no longer resolves: {0}")]
    AddressMiss(Address),

    #[error("Mutation rejected: {0}")]
    Rejected(MutationError),

    #[error("Patch found nothing to change: {0}")]
    NoPatchTarget(String),

    #[error("Document unchanged")]
    Unchanged,
}

/// Result of submitting a change to the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Applied { version: u64 },
    Noop { reason: NoopReason },
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied { .. })
    }

    pub fn noop_reason(&self) -> Option<&NoopReason> {
        match self {
            MutationOutcome::Noop { reason } => Some(reason),
            MutationOutcome::Applied { .. } => None,
        }
    }
}

/// Parse `document`, resolve `address` and let `f` edit the node in place.
///
/// Returns the reserialized document. Doctype and root element attributes
/// survive because the whole tree is serialized, not just the edited node.
pub fn mutate<F>(document: &str, address: &Address, f: F) -> Result<String, NoopReason>
where
    F: FnOnce(&mut Dom, NodeId) -> Result<(), MutationError>,
{
    let mut dom = parse(document);
    let node = resolve(&dom, address).ok_or_else(|| NoopReason::AddressMiss(address.clone()))?;

    let before = serialize(&dom);
    f(&mut dom, node).map_err(NoopReason::Rejected)?;
    let after = serialize(&dom);

    if after == before {
        return Err(NoopReason::Unchanged);
    }
    Ok(after)
}

/// Owns the canonical document and its history
#[derive(Debug)]
pub struct Pipeline {
    document: Document,
    history: UndoStack,
    effects: PostEffectEngine,
}

impl Pipeline {
    pub fn new(document: Document) -> Self {
        Self::with_history(document, UndoStack::new())
    }

    pub fn with_history(document: Document, history: UndoStack) -> Self {
        Self {
            document,
            history,
            effects: PostEffectEngine::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn source(&self) -> &str {
        self.document.source()
    }

    pub fn version(&self) -> u64 {
        self.document.version
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn effects_mut(&mut self) -> &mut PostEffectEngine {
        &mut self.effects
    }

    /// Edit the node at `address` with `f`
    pub fn mutate<F>(&mut self, address: &Address, description: &str, f: F) -> MutationOutcome
    where
        F: FnOnce(&mut Dom, NodeId) -> Result<(), MutationError>,
    {
        match mutate(self.document.source(), address, f) {
            Ok(next) => self.commit(next, Some(description)),
            Err(reason) => {
                debug!(%address, %reason, "mutation is a no-op");
                MutationOutcome::Noop { reason }
            }
        }
    }

    /// Apply one user-facing mutation
    pub fn apply(&mut self, mutation: &Mutation) -> MutationOutcome {
        self.mutate(mutation.address(), mutation.name(), |dom, node| {
            mutation.apply(dom, node)
        })
    }

    /// Run post-effects over `next` and make it the canonical document.
    ///
    /// Effects may rewrite an otherwise identical document; their rewrite
    /// is committed as its own step.
    pub fn commit(&mut self, next: String, description: Option<&str>) -> MutationOutcome {
        let next = self.effects.run(next);
        if next == self.document.source() {
            return MutationOutcome::Noop {
                reason: NoopReason::Unchanged,
            };
        }

        self.history.record(self.document.source(), description);
        let version = self.document.replace(next);
        info!(version, description = description.unwrap_or(""), "document committed");
        MutationOutcome::Applied { version }
    }

    /// Replace the whole document, as for `replace_all` patches and
    /// reconstructed documents reported by the rendering surface
    pub fn replace_document(&mut self, next: impl Into<String>, description: &str) -> MutationOutcome {
        self.commit(next.into(), Some(description))
    }

    /// Restore the previous document; false when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.document.source()) {
            Some(previous) => {
                self.document.replace(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.document.source()) {
            Some(next) => {
                self.document.replace(next);
                true
            }
            None => false,
        }
    }

    pub fn begin_batch(&mut self, description: &str) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }
}
