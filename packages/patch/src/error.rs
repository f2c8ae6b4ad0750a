use thiserror::Error;

/// The generated text could not be read as a patch.
///
/// Recovered by applying nothing and showing the raw text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchParseError {
    #[error("Response is not framed as a patch")]
    Unframed,

    #[error("Missing '---' separator after the {0} section")]
    MissingSeparator(&'static str),

    #[error("Missing OPERATION line")]
    MissingOperation,

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Patch has no markup")]
    EmptyMarkup,

    #[error("Generation failed: {0}")]
    Generation(String),
}

/// A well-formed patch that could not be spliced into the document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchApplyError {
    #[error("Target no longer resolves: {0}")]
    TargetMiss(String),

    #[error("No existing element matches the modified markup")]
    NoMatchingTarget,

    #[error("Patch payload contains no elements")]
    EmptyPayload,
}
