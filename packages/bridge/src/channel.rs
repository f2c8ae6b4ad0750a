//! # Channel
//!
//! A pair of endpoints joined by two tokio mpsc queues carrying JSON text.
//! Delivery is fire-and-forget: a message is either received once or lost
//! with its receiver, and nothing relies on ordering across gestures.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::controller::Controller;
use crate::error::{ProtocolError, ProtocolResult};
use crate::protocol::{decode_controller, decode_realm, encode, ControllerMessage, RealmMessage};

/// Default queue depth per direction
pub const DEFAULT_CAPACITY: usize = 64;

/// The controller's end: sends [`ControllerMessage`]s, receives
/// [`RealmMessage`]s
#[derive(Debug)]
pub struct ControllerEndpoint {
    tx: mpsc::Sender<String>,
    rx: mpsc::Receiver<String>,
}

/// The realm's end
#[derive(Debug)]
pub struct RealmEndpoint {
    tx: mpsc::Sender<String>,
    rx: mpsc::Receiver<String>,
}

pub fn channel(capacity: usize) -> (ControllerEndpoint, RealmEndpoint) {
    let (to_realm, from_controller) = mpsc::channel(capacity);
    let (to_controller, from_realm) = mpsc::channel(capacity);
    (
        ControllerEndpoint {
            tx: to_realm,
            rx: from_realm,
        },
        RealmEndpoint {
            tx: to_controller,
            rx: from_controller,
        },
    )
}

impl ControllerEndpoint {
    pub async fn send(&self, message: &ControllerMessage) -> ProtocolResult<()> {
        let json = encode(message)?;
        self.tx.send(json).await.map_err(|_| ProtocolError::Closed)
    }

    /// Queue a message without waiting. `Ok(false)` means the realm's queue
    /// is full and the message was dropped.
    pub fn try_send(&self, message: &ControllerMessage) -> ProtocolResult<bool> {
        let json = encode(message)?;
        match self.tx.try_send(json) {
            Ok(()) => Ok(true),
            Err(mpsc::error::TrySendError::Full(_)) => Ok(false),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(ProtocolError::Closed),
        }
    }

    /// Next raw message, `None` once the realm is gone
    pub async fn recv_raw(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    pub async fn recv(&mut self) -> Option<ProtocolResult<RealmMessage>> {
        let json = self.rx.recv().await?;
        Some(decode_realm(&json))
    }
}

impl RealmEndpoint {
    pub async fn send(&self, message: &RealmMessage) -> ProtocolResult<()> {
        let json = encode(message)?;
        self.tx.send(json).await.map_err(|_| ProtocolError::Closed)
    }

    /// Send raw text, as a compromised or buggy surface might
    pub async fn send_raw(&self, json: impl Into<String>) -> ProtocolResult<()> {
        self.tx.send(json.into()).await.map_err(|_| ProtocolError::Closed)
    }

    pub async fn recv(&mut self) -> Option<ProtocolResult<ControllerMessage>> {
        let json = self.rx.recv().await?;
        Some(decode_controller(&json))
    }
}

/// Drive a controller until the realm hangs up, returning it afterwards.
///
/// The initial render is sent first. Replies never wait for queue space: a
/// realm that is not reading loses them (each load-document carries the
/// whole page, so the next one resyncs it). A closed realm ends the loop.
pub async fn serve(mut controller: Controller, mut endpoint: ControllerEndpoint) -> Controller {
    if endpoint.send(&controller.load_message()).await.is_err() {
        warn!("realm closed before the first render");
        return controller;
    }

    while let Some(json) = endpoint.recv_raw().await {
        for reply in controller.handle_json(&json) {
            match endpoint.try_send(&reply) {
                Ok(true) => debug!(message_type = reply.kind(), "sent to realm"),
                Ok(false) => warn!(message_type = reply.kind(), "realm queue full, dropping reply"),
                Err(error) => {
                    warn!(%error, "realm stopped listening");
                    return controller;
                }
            }
        }
    }

    info!(version = controller.session().version(), "realm disconnected");
    controller
}
