//! # Pagewright Components
//!
//! Site-wide header and footer components:
//!
//! - [`Classifier`] scores page elements with a registry of pure signals
//! - [`SiteComponents`] holds the site's globals and resolves page overrides
//! - [`promotion`] turns a detection into a global, or decides to strip it
//! - [`render`] de-duplicates inline copies and injects globals at render
//! - [`variables`] extracts and re-applies the editable fields of a fragment

pub mod classifier;
pub mod component;
pub mod error;
pub mod promotion;
pub mod render;
pub mod signals;
pub mod site;
pub mod variables;

pub use classifier::{Classifier, Detection, Detections, DEFAULT_THRESHOLD};
pub use component::{GlobalComponent, PageOverride, PageOverrides, Position};
pub use error::{ComponentError, ComponentResult};
pub use promotion::{plan, promote, GlobalAction, PromotionOffer};
pub use render::{dedupe, inject, render_page, strip_inline, Dedupe};
pub use signals::{Signal, SignalRegistry, SignalScore};
pub use site::SiteComponents;
pub use variables::{apply_variables, extract_variables, FieldType, VariableField};
