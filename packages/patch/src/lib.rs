//! # Pagewright Patch
//!
//! The small patch language generated page edits are expressed in.
//!
//! A response streams in as text, is previewed tolerantly while it arrives
//! and is parsed strictly once it is complete. Only a strictly parsed
//! [`Patch`] is ever spliced into a document.

pub mod error;
pub mod parser;
pub mod patch;
pub mod splice;
pub mod stream;

pub use error::{PatchApplyError, PatchParseError};
pub use parser::{parse_patch, preview, PatchBuffer, Preview};
pub use patch::{Operation, Patch, Scope};
pub use splice::{apply_patch, splice, AppliedPatch, Splice};
pub use stream::{collect_patch, PatchStream, StreamEvent};
