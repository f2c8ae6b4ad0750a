use thiserror::Error;

use crate::component::Position;

#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Component {id} is a {actual} component, expected {expected}")]
    PositionMismatch {
        id: String,
        expected: Position,
        actual: Position,
    },

    #[error("Only header and footer components can be global, got {0}")]
    NotGlobal(Position),

    #[error("Component markup contains no element")]
    EmptyMarkup,

    #[error("Component name cannot be empty")]
    EmptyName,

    #[error("Invalid component data: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ComponentResult<T> = Result<T, ComponentError>;
