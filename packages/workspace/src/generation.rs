//! # Generation
//!
//! Drives a generation service's chunk stream through a
//! [`PatchStream`]. Previews are handed out while the response streams in;
//! the completed buffer is parsed strictly only when the service signals
//! the end. A cancelled generation discards its buffer and never touches
//! the document.

use futures::stream::BoxStream;
use pagewright_markup::Address;
use pagewright_patch::{Patch, PatchParseError, PatchStream, Preview, StreamEvent};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::error::GenerationError;

/// What the user asked for, with the context the service needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    pub document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Address>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            document: document.into(),
            selection: None,
        }
    }

    pub fn with_selection(mut self, selection: Option<Address>) -> Self {
        self.selection = selection;
        self
    }
}

/// Source of framed patch text, chunk by chunk
pub trait GenerationService: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> BoxStream<'static, Result<String, GenerationError>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed(Patch),
    Failed { error: PatchParseError, raw: String },
    /// Abandoned by the user; the partial text is returned for display only
    Cancelled { discarded: String },
}

/// Consume one generation until it completes, fails or `cancel` fires.
///
/// `on_preview` sees every distinct preview. Nothing here applies a patch.
pub async fn run_generation<F>(
    service: &dyn GenerationService,
    request: &GenerationRequest,
    mut cancel: oneshot::Receiver<()>,
    mut on_preview: F,
) -> GenerationOutcome
where
    F: FnMut(&Preview),
{
    let mut stream = PatchStream::new(service.generate(request));
    debug!(prompt_len = request.prompt.len(), "generation started");

    loop {
        tokio::select! {
            biased;

            signal = &mut cancel => {
                // A dropped sender is not a cancellation
                if signal.is_ok() {
                    let discarded = stream.cancel();
                    info!(discarded_len = discarded.len(), "generation cancelled");
                    return GenerationOutcome::Cancelled { discarded };
                }
                return finish(stream, on_preview).await;
            }

            event = stream.next_event() => match event {
                Some(StreamEvent::Preview(preview)) => on_preview(&preview),
                Some(StreamEvent::Completed(patch)) => return GenerationOutcome::Completed(patch),
                Some(StreamEvent::Failed { error, raw }) => return GenerationOutcome::Failed { error, raw },
                None => {
                    return GenerationOutcome::Failed {
                        error: PatchParseError::Unframed,
                        raw: stream.buffer().as_str().to_string(),
                    }
                }
            },
        }
    }
}

/// Drain without a cancellation signal
async fn finish<S, F>(mut stream: PatchStream<S>, mut on_preview: F) -> GenerationOutcome
where
    S: futures::Stream<Item = Result<String, GenerationError>> + Unpin,
    F: FnMut(&Preview),
{
    while let Some(event) = stream.next_event().await {
        match event {
            StreamEvent::Preview(preview) => on_preview(&preview),
            StreamEvent::Completed(patch) => return GenerationOutcome::Completed(patch),
            StreamEvent::Failed { error, raw } => return GenerationOutcome::Failed { error, raw },
        }
    }
    GenerationOutcome::Failed {
        error: PatchParseError::Unframed,
        raw: stream.buffer().as_str().to_string(),
    }
}
