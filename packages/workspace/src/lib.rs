//! # Pagewright Workspace
//!
//! Async orchestration around the editing engine: generation streams that
//! end in a pending patch, debounced resolution of content placeholders,
//! and a [`Site`] of page sessions sharing one component library.
//!
//! The external services are traits ([`GenerationService`],
//! [`ContentService`], [`ComponentStore`]); nothing here performs
//! generation or owns content.

pub mod content;
pub mod error;
pub mod generation;
pub mod library;
pub mod site;

pub use content::{find_placeholders, ContentQuery, ContentResolver, ContentService, DEFAULT_LIMIT};
pub use error::{ContentError, GenerationError, WorkspaceError, WorkspaceResult};
pub use generation::{run_generation, GenerationOutcome, GenerationRequest, GenerationService};
pub use library::{ComponentStore, JsonFileStore, MemoryStore};
pub use site::Site;
