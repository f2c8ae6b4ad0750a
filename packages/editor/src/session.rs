//! # Edit Session
//!
//! One user's editing state for one page: the canonical document behind
//! its [`Pipeline`], the selection, a generated patch waiting to be
//! applied, the site's global components and the soft-failure tally.
//!
//! Every entry point that changes the document re-derives the selection
//! afterwards, so callers never hold on to a node that no longer exists.

use std::path::Path;

use pagewright_components::{
    plan, promote, render_page, Classifier, Detections, GlobalAction, GlobalComponent,
    PageOverride, PageOverrides, Position, PromotionOffer, SiteComponents,
};
use pagewright_markup::{resolve, Address};
use pagewright_patch::{apply_patch, parse_patch, Patch, PatchApplyError};
use tracing::{debug, info, warn};

use crate::layers::{build_layers, LayerNode};
use crate::pipeline::{MutationOutcome, NoopReason, Pipeline};
use crate::post_effects::StripShadowedGlobals;
use crate::reorder::{translate_layer_drop, LayerDrop};
use crate::selection::{Rect, SelectionState};
use crate::soft_failures::{FailureKind, RetryAffordance, SoftFailures};
use crate::undo_stack::UndoStack;
use crate::{Document, EditorConfig, EditorError, Mutation};

const STRIP_GLOBALS: &str = "strip-shadowed-globals";

#[derive(Debug)]
pub struct EditSession {
    pipeline: Pipeline,
    config: EditorConfig,
    selection: SelectionState,
    failures: SoftFailures,
    pending: Option<Patch>,
    site: SiteComponents,
    overrides: PageOverrides,
}

impl EditSession {
    pub fn new(document: Document) -> Self {
        Self::with_config(document, EditorConfig::default())
    }

    pub fn with_config(document: Document, config: EditorConfig) -> Self {
        let history = UndoStack::with_max_levels(config.undo_levels);
        Self {
            pipeline: Pipeline::with_history(document, history),
            failures: SoftFailures::new(config.retry_after_failures),
            config,
            selection: SelectionState::new(),
            pending: None,
            site: SiteComponents::new(),
            overrides: PageOverrides::default(),
        }
    }

    /// Start editing a document handed over by the host
    pub fn load(source: impl Into<String>) -> Self {
        Self::new(Document::from_source(source))
    }

    /// Start editing a file on disk
    pub fn open(path: impl AsRef<Path>, config: EditorConfig) -> Result<Self, EditorError> {
        Ok(Self::with_config(Document::load(path)?, config))
    }

    /// The document to persist; file-backed documents are also written out
    pub fn save(&mut self) -> Result<String, EditorError> {
        let document = self.pipeline.document_mut();
        if document.is_file_backed() {
            document.save()?;
        }
        Ok(document.source().to_string())
    }

    pub fn document(&self) -> &Document {
        self.pipeline.document()
    }

    pub fn source(&self) -> &str {
        self.pipeline.source()
    }

    pub fn version(&self) -> u64 {
        self.pipeline.version()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn retry_affordance(&self) -> Option<RetryAffordance> {
        self.failures.retry_affordance()
    }

    pub fn failures(&self) -> &SoftFailures {
        &self.failures
    }

    fn classifier(&self) -> Classifier {
        Classifier::new().with_threshold(self.config.confidence_threshold)
    }

    fn reresolve(&mut self) {
        let dom = self.pipeline.document().dom();
        if !self.selection.reresolve(&dom, self.config.text_preview_length) {
            info!("selection cleared: element no longer exists");
        }
    }

    fn settle(&mut self, outcome: MutationOutcome) -> MutationOutcome {
        match &outcome {
            MutationOutcome::Applied { .. } => {
                self.failures.succeed(FailureKind::MutationNoop);
                self.failures.succeed(FailureKind::AddressMiss);
                self.reresolve();
            }
            MutationOutcome::Noop {
                reason: NoopReason::AddressMiss(address),
            } => {
                self.failures.record(FailureKind::AddressMiss, Some(address.as_str()));
                if self.selection.selected_address() == Some(address) {
                    self.selection.deselect();
                }
            }
            MutationOutcome::Noop { reason } => {
                self.failures
                    .record(FailureKind::MutationNoop, Some(&reason.to_string()));
            }
        }
        outcome
    }

    // Direct edits

    pub fn apply_mutation(&mut self, mutation: &Mutation) -> MutationOutcome {
        let outcome = self.pipeline.apply(mutation);
        self.settle(outcome)
    }

    /// Move `address` under `parent` at element index `index`
    pub fn move_element(&mut self, address: &Address, parent: &Address, index: usize) -> MutationOutcome {
        self.apply_mutation(&Mutation::MoveElement {
            address: address.clone(),
            parent: parent.clone(),
            index,
        })
    }

    /// Apply a drag in the layer outline
    pub fn drop_layer(&mut self, source: &Address, target: &Address, drop: LayerDrop) -> MutationOutcome {
        let dom = self.pipeline.document().dom();
        for address in [source, target] {
            if resolve(&dom, address).is_none() {
                return self.settle(MutationOutcome::Noop {
                    reason: NoopReason::AddressMiss(address.clone()),
                });
            }
        }

        match translate_layer_drop(&dom, source, target, drop) {
            Some(mutation) => self.apply_mutation(&mutation),
            None => {
                debug!(%source, %target, "layer drop changes nothing");
                MutationOutcome::Noop {
                    reason: NoopReason::Unchanged,
                }
            }
        }
    }

    /// Replace the document wholesale, e.g. with a reconstructed document
    /// reported by the rendering surface. The caller strips editor
    /// instrumentation first.
    pub fn replace_document(&mut self, next: impl Into<String>) -> MutationOutcome {
        let outcome = self.pipeline.replace_document(next, "Replace document");
        self.settle(outcome)
    }

    pub fn begin_batch(&mut self, description: &str) {
        self.pipeline.begin_batch(description);
    }

    pub fn end_batch(&mut self) {
        self.pipeline.end_batch();
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.pipeline.undo();
        if undone {
            self.reresolve();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.pipeline.redo();
        if redone {
            self.reresolve();
        }
        redone
    }

    // Generated patches

    /// Read a completed generation response.
    ///
    /// A well-formed patch is held until [`apply_pending`](Self::apply_pending);
    /// anything else applies nothing and counts as a soft failure.
    pub fn receive_response(&mut self, raw: &str) -> Result<&Patch, EditorError> {
        match parse_patch(raw) {
            Ok(patch) => {
                self.failures.succeed(FailureKind::PatchParse);
                debug!(operation = %patch.operation, "patch ready to apply");
                let patch: &Patch = self.pending.insert(patch);
                Ok(patch)
            }
            Err(error) => {
                warn!(%error, "response is not an applicable patch");
                self.failures.record(FailureKind::PatchParse, Some(raw));
                self.pending = None;
                Err(error.into())
            }
        }
    }

    /// Hold a patch that was already parsed strictly, e.g. by a stream
    /// consumer
    pub fn hold_patch(&mut self, patch: Patch) {
        self.failures.succeed(FailureKind::PatchParse);
        self.failures.succeed(FailureKind::Generation);
        self.pending = Some(patch);
    }

    /// Count a generation that failed or was unreadable
    pub fn record_generation_failure(&mut self, raw: &str) {
        self.failures.record(FailureKind::Generation, Some(raw));
        self.pending = None;
    }

    pub fn pending_patch(&self) -> Option<&Patch> {
        self.pending.as_ref()
    }

    pub fn discard_pending(&mut self) -> Option<Patch> {
        self.pending.take()
    }

    pub fn apply_pending(&mut self, target: Option<&Address>) -> Result<MutationOutcome, EditorError> {
        let patch = self.pending.take().ok_or(EditorError::NoPendingPatch)?;
        self.apply_patch(&patch, target)
    }

    /// Splice a patch into the document as one undo step
    pub fn apply_patch(&mut self, patch: &Patch, target: Option<&Address>) -> Result<MutationOutcome, EditorError> {
        let applied = match apply_patch(self.pipeline.source(), patch, target) {
            Ok(applied) => applied,
            Err(PatchApplyError::TargetMiss(address)) => {
                return Ok(self.settle(MutationOutcome::Noop {
                    reason: NoopReason::AddressMiss(Address::new(address)),
                }));
            }
            Err(PatchApplyError::NoMatchingTarget) => {
                return Ok(self.settle(MutationOutcome::Noop {
                    reason: NoopReason::NoPatchTarget(PatchApplyError::NoMatchingTarget.to_string()),
                }));
            }
            Err(error) => return Err(error.into()),
        };

        let description = match &patch.message {
            Some(message) => message.clone(),
            None => format!("{} patch", patch.operation),
        };
        debug!(region = %applied.region, "patch spliced");
        let outcome = self.pipeline.commit(applied.document, Some(&description));
        Ok(self.settle(outcome))
    }

    // Selection

    pub fn select(&mut self, address: &Address, rect: Option<Rect>) -> bool {
        let dom = self.pipeline.document().dom();
        let found = self
            .selection
            .select(&dom, address, rect, self.config.text_preview_length);
        if found {
            self.failures.succeed(FailureKind::AddressMiss);
        } else {
            self.failures.record(FailureKind::AddressMiss, Some(address.as_str()));
        }
        found
    }

    pub fn deselect(&mut self) {
        self.selection.deselect();
    }

    pub fn hover(&mut self, address: Option<&Address>) {
        let dom = self.pipeline.document().dom();
        self.selection.hover(&dom, address);
    }

    pub fn open_context_menu(&mut self, address: &Address, x: f64, y: f64) -> bool {
        let dom = self.pipeline.document().dom();
        self.selection
            .open_context_menu(&dom, address, x, y, self.config.text_preview_length)
    }

    pub fn close_context_menu(&mut self) {
        self.selection.close_context_menu();
    }

    pub fn layers(&self) -> Vec<LayerNode> {
        build_layers(&self.pipeline.document().dom())
    }

    // Global components

    pub fn site(&self) -> &SiteComponents {
        &self.site
    }

    /// Install the site's global components; later changes strip inline
    /// copies of positions the site covers
    pub fn set_site(&mut self, site: SiteComponents) {
        self.site = site;
        self.install_strip_effect();
    }

    fn install_strip_effect(&mut self) {
        let classifier = self.classifier();
        let effects = self.pipeline.effects_mut();
        effects.unregister(STRIP_GLOBALS);
        if !self.site.is_empty() {
            effects.register(Box::new(StripShadowedGlobals::new(
                self.site.clone(),
                self.overrides.clone(),
                classifier,
            )));
        }
    }

    pub fn overrides(&self) -> &PageOverrides {
        &self.overrides
    }

    pub fn set_override(&mut self, position: Position, value: Option<PageOverride>) {
        self.overrides.set(position, value);
        self.install_strip_effect();
    }

    pub fn detect_globals(&self) -> Detections {
        self.classifier().classify_document(self.pipeline.source())
    }

    pub fn plan_globals(&self) -> Vec<GlobalAction> {
        plan(&self.detect_globals(), &self.site, &self.overrides)
    }

    /// Run the current document through post-effects again
    pub fn refresh_globals(&mut self) -> MutationOutcome {
        let source = self.pipeline.source().to_string();
        let outcome = self.pipeline.commit(source, Some("Remove inline global components"));
        if outcome.is_applied() {
            self.reresolve();
        }
        outcome
    }

    /// Turn a detected header/footer into the site default and drop the
    /// inline copy from this page
    pub fn promote(&mut self, offer: &PromotionOffer, name: &str) -> Result<GlobalComponent, EditorError> {
        let mut site = self.site.clone();
        let component = promote(&mut site, offer, name)?;
        self.set_site(site);
        self.refresh_globals();
        Ok(component)
    }

    /// The page as visitors see it, with global components injected
    pub fn render(&self) -> Result<String, EditorError> {
        Ok(render_page(
            self.pipeline.source(),
            &self.site,
            &self.overrides,
            &self.classifier(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_patch::Operation;

    #[test]
    fn test_mutation_reresolves_selection() {
        let mut session = EditSession::load("<body><h1>Old</h1><p>x</p></body>");
        assert!(session.select(&Address::new("body > h1"), None));

        session.apply_mutation(&Mutation::SetText {
            address: Address::new("body > h1"),
            text: "New".to_string(),
        });
        assert_eq!(session.selection().snapshot().unwrap().text_preview, "New");

        session.apply_mutation(&Mutation::RemoveElement {
            address: Address::new("body > h1"),
        });
        assert!(session.selection().selected.is_none());
    }

    #[test]
    fn test_unparseable_response_is_soft_failure() {
        let mut session = EditSession::load("<body></body>");
        assert!(session.receive_response("Sorry, I can't help with that.").is_err());
        assert!(session.retry_affordance().is_none());
        assert!(session.receive_response("Still no patch").is_err());

        let retry = session.retry_affordance().unwrap();
        assert_eq!(retry.kind, FailureKind::PatchParse);
        assert_eq!(retry.last_raw.as_deref(), Some("Still no patch"));
        assert_eq!(session.source(), "<body></body>");
    }

    #[test]
    fn test_apply_pending() {
        let mut session = EditSession::load("<body><section id=\"s1\">Old</section></body>");
        assert!(matches!(
            session.apply_pending(None),
            Err(EditorError::NoPendingPatch)
        ));

        let patch = session
            .receive_response("MESSAGE: Update\n---\nOPERATION: modify\n---\n<section id=\"s1\">New</section>")
            .unwrap();
        assert_eq!(patch.operation, Operation::Modify);

        let outcome = session.apply_pending(None).unwrap();
        assert!(outcome.is_applied());
        assert_eq!(session.source(), "<body><section id=\"s1\">New</section></body>");
        assert_eq!(session.pipeline().history().undo_description(), Some("Update"));
    }

    #[test]
    fn test_modify_without_target_is_noop() {
        let mut session = EditSession::load("<body><p>x</p></body>");
        let outcome = session
            .apply_patch(&Patch::new(Operation::Modify, "<aside>y</aside>"), None)
            .unwrap();
        assert!(matches!(outcome.noop_reason(), Some(NoopReason::NoPatchTarget(_))));
        assert_eq!(session.source(), "<body><p>x</p></body>");
    }

    #[test]
    fn test_drop_layer_reorders() {
        let mut session = EditSession::load(
            "<body><ul><li id=\"a\"></li><li id=\"b\"></li><li id=\"c\"></li></ul></body>",
        );
        let outcome = session.drop_layer(&Address::new("#c"), &Address::new("#a"), LayerDrop::OnRow);
        assert!(outcome.is_applied());
        assert_eq!(
            session.source(),
            "<body><ul><li id=\"c\"></li><li id=\"a\"></li><li id=\"b\"></li></ul></body>"
        );

        let missed = session.drop_layer(&Address::new("#zz"), &Address::new("#a"), LayerDrop::OnRow);
        assert!(matches!(missed.noop_reason(), Some(NoopReason::AddressMiss(_))));
    }
}
