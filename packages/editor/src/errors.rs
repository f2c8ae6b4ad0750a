//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Patch error: {0}")]
    PatchParse(#[from] pagewright_patch::PatchParseError),

    #[error("Patch could not be applied: {0}")]
    PatchApply(#[from] pagewright_patch::PatchApplyError),

    #[error("Component error: {0}")]
    Component(#[from] pagewright_components::ComponentError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Document is not file-backed")]
    NotFileBacked,

    #[error("No generated patch is waiting to be applied")]
    NoPendingPatch,
}
