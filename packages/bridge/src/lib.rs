//! # Pagewright Bridge
//!
//! The boundary between the editing controller and the sandboxed surface
//! that renders the page.
//!
//! ```text
//! Controller (EditSession)  ──ControllerMessage──▶  Realm (disposable Dom)
//!            ▲                                          │
//!            └──────────────RealmMessage────────────────┘
//! ```
//!
//! Both sides address elements with the same resolver, the realm through
//! [`canonical_address`] so its editor markers never show up in an
//! address. The realm only ever holds an instrumented copy; the canonical
//! document lives in the controller's session.

pub mod channel;
pub mod controller;
pub mod error;
pub mod instrumentation;
pub mod protocol;
pub mod realm;

pub use channel::{channel, serve, ControllerEndpoint, RealmEndpoint, DEFAULT_CAPACITY};
pub use controller::Controller;
pub use error::{ProtocolError, ProtocolResult};
pub use instrumentation::{
    canonical_address, instrument, strip_dom, strip_instrumentation, RUNTIME_SCRIPT,
};
pub use protocol::{decode_controller, decode_realm, encode, ControllerMessage, RealmMessage};
pub use realm::Realm;
