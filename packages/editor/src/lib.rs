//! # Pagewright Editor
//!
//! Editing engine for one page document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ markup: document string ⇄ Dom, addresses    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                          │
//! │  - Pipeline: mutate → post-effects → commit │
//! │  - Snapshot undo/redo with batches          │
//! │  - Selection re-derived after every change  │
//! │  - Layer outline and structural moves       │
//! │  - Generated patches held until applied     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ bridge: instrumented copy in the sandbox    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The document string is the source of truth**: trees are parsed from
//!    it for each change and thrown away
//! 2. **Addresses, never node handles**: every reference to an element is
//!    re-resolved against the current document
//! 3. **Failures stay soft**: a stale address or unreadable response
//!    leaves the document untouched and is tallied in [`SoftFailures`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagewright_editor::{EditSession, Mutation};
//! use pagewright_markup::Address;
//!
//! let mut session = EditSession::load("<body><h1>Hello</h1></body>");
//! session.apply_mutation(&Mutation::SetText {
//!     address: Address::new("body > h1"),
//!     text: "Welcome".to_string(),
//! });
//! session.undo();
//! ```

mod config;
mod document;
mod errors;
mod layers;
mod mutations;
mod pipeline;
mod post_effects;
mod reorder;
mod selection;
mod session;
mod soft_failures;
mod undo_stack;

pub use config::EditorConfig;
pub use document::{Document, DocumentStorage};
pub use errors::EditorError;
pub use layers::{build_layers, outline, LayerNode};
pub use mutations::{merge_style, Mutation, MutationError, Placement};
pub use pipeline::{mutate, MutationOutcome, NoopReason, Pipeline};
pub use post_effects::{PostEffect, PostEffectEngine, StripShadowedGlobals};
pub use reorder::{move_node, translate_layer_drop, LayerDrop};
pub use selection::{text_preview, ContextMenu, ElementSnapshot, Rect, Selected, SelectionState};
pub use session::EditSession;
pub use soft_failures::{FailureKind, RetryAffordance, SoftFailures};
pub use undo_stack::{HistoryEntry, UndoStack};
