//! # Controller
//!
//! The trusted side of the channel. Each realm message is re-validated
//! against the session's own document before anything is applied: the
//! realm's in-place edit is only a preview. Every message that could have
//! changed the rendered copy is answered with a fresh `load-document`, so
//! a rejected edit snaps the surface back to the canonical document.

use pagewright_editor::{EditSession, Mutation, MutationOutcome, NoopReason};
use pagewright_markup::Address;
use tracing::{debug, warn};

use crate::instrumentation::{instrument, strip_instrumentation};
use crate::protocol::{decode_realm, ControllerMessage, RealmMessage};

#[derive(Debug)]
pub struct Controller {
    session: EditSession,
}

impl Controller {
    pub fn new(session: EditSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub fn into_session(self) -> EditSession {
        self.session
    }

    /// Instrumented render of the canonical document
    pub fn load_message(&self) -> ControllerMessage {
        ControllerMessage::LoadDocument {
            html: instrument(
                self.session.source(),
                self.session.selection().selected_address(),
            ),
        }
    }

    /// Select from outside the surface, e.g. the layer outline
    pub fn select(&mut self, address: &Address) -> ControllerMessage {
        if self.session.select(address, None) {
            ControllerMessage::SelectElement {
                address: address.clone(),
            }
        } else {
            ControllerMessage::Deselect
        }
    }

    fn after_change(&mut self, outcome: MutationOutcome) -> Vec<ControllerMessage> {
        if let MutationOutcome::Noop { reason } = &outcome {
            debug!(%reason, "realm edit not applied; resyncing surface");
        }
        vec![self.load_message()]
    }

    /// Handle one decoded realm message, returning the replies to send
    pub fn handle(&mut self, message: RealmMessage) -> Vec<ControllerMessage> {
        debug!(message_type = message.kind(), "realm message");

        match message {
            RealmMessage::ElementSelected { address, snapshot } => {
                if self.session.select(&address, snapshot.rect) {
                    Vec::new()
                } else {
                    vec![ControllerMessage::Deselect]
                }
            }

            RealmMessage::ElementHovered { address } => {
                self.session.hover(address.as_ref());
                Vec::new()
            }

            RealmMessage::TextEdited { address, html } => {
                let outcome = self.session.apply_mutation(&Mutation::SetInnerHtml {
                    address,
                    html: strip_instrumentation(&html),
                });
                self.after_change(outcome)
            }

            RealmMessage::DeleteElement { address } => {
                let outcome = self.session.apply_mutation(&Mutation::RemoveElement { address });
                self.after_change(outcome)
            }

            RealmMessage::ElementMoved { document } | RealmMessage::SectionReordered { document } => {
                let outcome = self.session.replace_document(strip_instrumentation(&document));
                self.after_change(outcome)
            }

            RealmMessage::ContextMenu {
                x, y, address, ..
            } => {
                if self.session.open_context_menu(&address, x, y) {
                    Vec::new()
                } else {
                    vec![ControllerMessage::Deselect]
                }
            }

            RealmMessage::ElementResized {
                address,
                width,
                height,
            } => {
                self.session.begin_batch("Resize element");
                let mut outcome = MutationOutcome::Noop {
                    reason: NoopReason::Unchanged,
                };
                for (property, value) in [("width", width), ("height", height)] {
                    let step = self.session.apply_mutation(&Mutation::SetInlineStyle {
                        address: address.clone(),
                        property: property.to_string(),
                        value: Some(format!("{}px", value.round())),
                    });
                    if step.is_applied() || !outcome.is_applied() {
                        outcome = step;
                    }
                }
                self.session.end_batch();
                self.after_change(outcome)
            }
        }
    }

    /// Decode and handle raw JSON. Undecodable messages are logged and
    /// dropped; they never reach the session.
    pub fn handle_json(&mut self, json: &str) -> Vec<ControllerMessage> {
        match decode_realm(json) {
            Ok(message) => self.handle(message),
            Err(error) => {
                warn!(%error, "dropping realm message");
                Vec::new()
            }
        }
    }
}
