//! # Post-Effect System
//!
//! Changes may require follow-up rewrites to keep the document consistent
//! with the rest of the site. Post-effects run inside the pipeline after
//! every change and before it is committed, so their rewrites land in the
//! same undo step as the change that triggered them.
//!
//! Post-effects are deterministic and idempotent: running an effect on its
//! own output changes nothing.

use pagewright_components::{dedupe, Classifier, PageOverrides, SiteComponents};
use tracing::info;

/// Rewrite applied to every candidate document before commit
pub trait PostEffect: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Rewritten document, or `None` when nothing needs to change
    fn apply(&self, document: &str) -> Option<String>;
}

/// Remove inline headers/footers the page renders a global for
#[derive(Debug)]
pub struct StripShadowedGlobals {
    site: SiteComponents,
    overrides: PageOverrides,
    classifier: Classifier,
}

impl StripShadowedGlobals {
    pub fn new(site: SiteComponents, overrides: PageOverrides, classifier: Classifier) -> Self {
        Self {
            site,
            overrides,
            classifier,
        }
    }
}

impl PostEffect for StripShadowedGlobals {
    fn name(&self) -> &'static str {
        "strip-shadowed-globals"
    }

    fn apply(&self, document: &str) -> Option<String> {
        let result = dedupe(document, &self.site, &self.overrides, &self.classifier);
        if !result.changed() {
            return None;
        }
        for (position, count) in &result.stripped {
            info!(%position, count, "stripped inline copy of global component");
        }
        Some(result.document)
    }
}

/// Post-effect engine that applies all registered effects
#[derive(Debug, Default)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect + Send + Sync>>,
}

impl PostEffectEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, effect: Box<dyn PostEffect + Send + Sync>) {
        self.effects.push(effect);
    }

    /// Remove every effect with this name
    pub fn unregister(&mut self, name: &str) {
        self.effects.retain(|effect| effect.name() != name);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Run all effects in registration order
    pub fn run(&self, document: String) -> String {
        self.effects
            .iter()
            .fold(document, |current, effect| match effect.apply(&current) {
                Some(rewritten) => rewritten,
                None => current,
            })
    }
}
