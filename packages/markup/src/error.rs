use thiserror::Error;

pub type MarkupResult<T> = Result<T, MarkupError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupError {
    #[error("Invalid selector at {pos}: {message}")]
    InvalidSelector { pos: usize, message: String },

    #[error("Empty selector")]
    EmptySelector,

    #[error("Node {0} is not an element")]
    NotAnElement(usize),

    #[error("Node {0} is not attached to the document")]
    Detached(usize),
}

impl MarkupError {
    pub fn invalid_selector(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            pos,
            message: message.into(),
        }
    }
}
