//! # Site
//!
//! The pages being edited together with the component library they share.
//! Every page session sees the same [`SiteComponents`]; a promotion on one
//! page is persisted to the store and pushed to all of them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use pagewright_components::{GlobalComponent, PromotionOffer, SiteComponents};
use pagewright_editor::{Document, EditSession, EditorConfig};
use pagewright_patch::Preview;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::content::ContentResolver;
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::generation::{run_generation, GenerationOutcome, GenerationRequest, GenerationService};
use crate::library::ComponentStore;

pub struct Site {
    store: Arc<dyn ComponentStore>,
    config: EditorConfig,
    pages: BTreeMap<String, EditSession>,
}

impl fmt::Debug for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("config", &self.config)
            .field("pages", &self.pages.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Site {
    pub fn new(store: Arc<dyn ComponentStore>, config: EditorConfig) -> Self {
        Self {
            store,
            config,
            pages: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn ComponentStore {
        self.store.as_ref()
    }

    /// Start editing `source` as page `name`, replacing any open page of
    /// that name
    pub fn open_page(&mut self, name: impl Into<String>, source: impl Into<String>) -> WorkspaceResult<&mut EditSession> {
        let session = EditSession::with_config(Document::from_source(source), self.config.clone());
        self.insert(name.into(), session)
    }

    pub fn open_page_file(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> WorkspaceResult<&mut EditSession> {
        let session = EditSession::open(path, self.config.clone())?;
        self.insert(name.into(), session)
    }

    fn insert(&mut self, name: String, mut session: EditSession) -> WorkspaceResult<&mut EditSession> {
        session.set_site(self.store.list()?);
        info!(page = %name, "page opened");
        self.pages.insert(name.clone(), session);
        self.page_mut(&name)
    }

    pub fn close_page(&mut self, name: &str) -> Option<EditSession> {
        self.pages.remove(name)
    }

    pub fn page_names(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub fn page(&self, name: &str) -> WorkspaceResult<&EditSession> {
        self.pages
            .get(name)
            .ok_or_else(|| WorkspaceError::UnknownPage(name.to_string()))
    }

    pub fn page_mut(&mut self, name: &str) -> WorkspaceResult<&mut EditSession> {
        self.pages
            .get_mut(name)
            .ok_or_else(|| WorkspaceError::UnknownPage(name.to_string()))
    }

    /// Reload the library and hand it to every open page
    pub fn refresh_components(&mut self) -> WorkspaceResult<SiteComponents> {
        let site = self.store.list()?;
        for session in self.pages.values_mut() {
            session.set_site(site.clone());
        }
        debug!(components = site.components().len(), pages = self.pages.len(), "components refreshed");
        Ok(site)
    }

    /// Promote a detected header/footer on `page` into the library.
    ///
    /// The promoted page loses its inline copy right away; other pages drop
    /// theirs on their next edit.
    pub fn promote(&mut self, page: &str, offer: &PromotionOffer, name: &str) -> WorkspaceResult<GlobalComponent> {
        let component = self.page_mut(page)?.promote(offer, name)?;
        self.store.save(component.clone())?;
        self.refresh_components()?;
        info!(page, id = %component.id, "component promoted");
        Ok(component)
    }

    pub fn save_component(&mut self, component: GlobalComponent) -> WorkspaceResult<()> {
        self.store.save(component)?;
        self.refresh_components()?;
        Ok(())
    }

    pub fn set_default_component(&mut self, id: &str) -> WorkspaceResult<()> {
        self.store.set_default(id)?;
        self.refresh_components()?;
        Ok(())
    }

    pub fn remove_component(&mut self, id: &str) -> WorkspaceResult<GlobalComponent> {
        let removed = self.store.remove(id)?;
        self.refresh_components()?;
        Ok(removed)
    }

    /// Hand a finished generation to `page`. A completed patch waits for
    /// the user to apply it; a failure only counts toward the retry offer.
    pub fn receive_generation(&mut self, page: &str, outcome: GenerationOutcome) -> WorkspaceResult<()> {
        let session = self.page_mut(page)?;
        match outcome {
            GenerationOutcome::Completed(patch) => {
                debug!(page, operation = %patch.operation, "generated patch pending");
                session.hold_patch(patch);
            }
            GenerationOutcome::Failed { error, raw } => {
                warn!(page, %error, "generation produced no applicable patch");
                session.record_generation_failure(&raw);
            }
            GenerationOutcome::Cancelled { .. } => debug!(page, "generation cancelled"),
        }
        Ok(())
    }

    /// Ask `service` for a change to `page`, using the current selection as
    /// context
    pub async fn generate<F>(
        &mut self,
        page: &str,
        service: &dyn GenerationService,
        prompt: &str,
        cancel: oneshot::Receiver<()>,
        on_preview: F,
    ) -> WorkspaceResult<GenerationOutcome>
    where
        F: FnMut(&Preview),
    {
        let request = {
            let session = self.page(page)?;
            GenerationRequest::new(prompt, session.source())
                .with_selection(session.selection().selected_address().cloned())
        };

        let outcome = run_generation(service, &request, cancel, on_preview).await;
        self.receive_generation(page, outcome.clone())?;
        Ok(outcome)
    }

    /// The page as visitors see it: globals injected, placeholders resolved
    pub async fn render(&self, page: &str, content: &mut ContentResolver) -> WorkspaceResult<String> {
        let rendered = self.page(page)?.render()?;
        Ok(content.resolve(&rendered).await)
    }
}
