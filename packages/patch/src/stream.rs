use std::fmt::Display;

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::error::PatchParseError;
use crate::parser::{PatchBuffer, Preview};
use crate::patch::Patch;

/// What a generated response stream produced so far
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The previewable part changed
    Preview(Preview),
    /// The stream finished and the buffer parsed strictly
    Completed(Patch),
    /// The stream failed, or finished with an unreadable buffer
    Failed {
        error: PatchParseError,
        raw: String,
    },
}

/// Drains a chunk stream into a [`PatchBuffer`].
///
/// Previews are emitted only when they change. The strict pass runs once,
/// when the stream ends.
pub struct PatchStream<S> {
    chunks: S,
    buffer: PatchBuffer,
    last_preview: Option<Preview>,
    finished: bool,
}

impl<S, E> PatchStream<S>
where
    S: Stream<Item = Result<String, E>> + Unpin,
    E: Display,
{
    pub fn new(chunks: S) -> Self {
        Self {
            chunks,
            buffer: PatchBuffer::new(),
            last_preview: None,
            finished: false,
        }
    }

    pub fn buffer(&self) -> &PatchBuffer {
        &self.buffer
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for the next event; `None` once a terminal event was returned
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        if self.finished {
            return None;
        }

        loop {
            match self.chunks.next().await {
                Some(Ok(chunk)) => {
                    self.buffer.push(&chunk);
                    let Some(preview) = self.buffer.preview() else {
                        continue;
                    };
                    if self.last_preview.as_ref() == Some(&preview) {
                        continue;
                    }
                    self.last_preview = Some(preview.clone());
                    return Some(StreamEvent::Preview(preview));
                }
                Some(Err(err)) => {
                    self.finished = true;
                    warn!(error = %err, chunks = self.buffer.chunk_count(), "generation stream failed");
                    return Some(StreamEvent::Failed {
                        error: PatchParseError::Generation(err.to_string()),
                        raw: self.buffer.as_str().to_string(),
                    });
                }
                None => {
                    self.finished = true;
                    return Some(match self.buffer.finish() {
                        Ok(patch) => {
                            info!(operation = %patch.operation, chunks = self.buffer.chunk_count(), "patch stream completed");
                            StreamEvent::Completed(patch)
                        }
                        Err(error) => {
                            warn!(%error, "completed stream is not a valid patch");
                            StreamEvent::Failed {
                                error,
                                raw: self.buffer.as_str().to_string(),
                            }
                        }
                    });
                }
            }
        }
    }

    /// Abandon the stream, returning what had been buffered
    pub fn cancel(self) -> String {
        debug!(chunks = self.buffer.chunk_count(), "patch stream cancelled");
        self.buffer.into_string()
    }
}

/// Drain a stream to completion, ignoring previews
pub async fn collect_patch<S, E>(chunks: S) -> Result<Patch, PatchParseError>
where
    S: Stream<Item = Result<String, E>> + Unpin,
    E: Display,
{
    let mut stream = PatchStream::new(chunks);
    while let Some(event) = stream.next_event().await {
        match event {
            StreamEvent::Preview(_) => continue,
            StreamEvent::Completed(patch) => return Ok(patch),
            StreamEvent::Failed { error, .. } => return Err(error),
        }
    }
    Err(PatchParseError::Unframed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Operation;

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<String, String>> + Unpin {
        tokio_stream::iter(
            parts
                .iter()
                .map(|p| Ok(p.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_previews_then_completion() {
        let mut stream = PatchStream::new(chunks(&[
            "MESSAGE: Add pricing\n---\n",
            "OPERATION: add\n---\n",
            "<section>",
            "",
            "<h2>Pricing</h2></section>",
        ]));

        let mut previews = Vec::new();
        let mut completed = None;
        while let Some(event) = stream.next_event().await {
            match event {
                StreamEvent::Preview(preview) => previews.push(preview.markup),
                StreamEvent::Completed(patch) => completed = Some(patch),
                StreamEvent::Failed { error, .. } => panic!("unexpected failure: {}", error),
            }
        }

        // The empty chunk produces no duplicate preview
        assert_eq!(
            previews,
            ["", "<section>", "<section><h2>Pricing</h2></section>"]
        );
        let patch = completed.unwrap();
        assert_eq!(patch.operation, Operation::Add);
        assert_eq!(patch.message.as_deref(), Some("Add pricing"));
        assert!(stream.is_finished());
        assert_eq!(stream.next_event().await, None);
    }

    #[tokio::test]
    async fn test_generation_error_keeps_raw_text() {
        let parts = tokio_stream::iter(vec![
            Ok("MESSAGE: partial".to_string()),
            Err("connection reset".to_string()),
        ]);
        let mut stream = PatchStream::new(parts);
        match stream.next_event().await {
            Some(StreamEvent::Failed { error, raw }) => {
                assert_eq!(error, PatchParseError::Generation("connection reset".to_string()));
                assert_eq!(raw, "MESSAGE: partial");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_returns_buffer() {
        let mut stream = PatchStream::new(chunks(&["MESSAGE: x\n---\nOPERATION: add\n---\n<p>", "rest"]));
        assert!(matches!(stream.next_event().await, Some(StreamEvent::Preview(_))));
        assert_eq!(stream.cancel(), "MESSAGE: x\n---\nOPERATION: add\n---\n<p>");
    }

    #[tokio::test]
    async fn test_collect_patch_reports_parse_failure() {
        let result = collect_patch(chunks(&["I could not ", "do that."])).await;
        assert_eq!(result, Err(PatchParseError::Unframed));
    }
}
