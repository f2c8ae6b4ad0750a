use thiserror::Error;

/// The generation service failed mid-stream
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Generation service error: {0}")]
    Service(String),

    #[error("Generation service unavailable")]
    Unavailable,
}

/// A content placeholder could not be resolved
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("Unknown content type: {0}")]
    UnknownType(String),

    #[error("Content service error: {0}")]
    Service(String),
}

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Editor error: {0}")]
    Editor(#[from] pagewright_editor::EditorError),

    #[error("Component error: {0}")]
    Component(#[from] pagewright_components::ComponentError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Component store lock poisoned")]
    StorePoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
