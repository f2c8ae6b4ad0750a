use thiserror::Error;

/// A message could not cross the sandbox boundary
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Message has no type tag")]
    MissingType,

    #[error("Unknown message type: {0}")]
    UnknownMessage(String),

    #[error("Channel closed")]
    Closed,
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
