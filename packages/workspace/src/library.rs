//! Site component library storage

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use pagewright_components::{GlobalComponent, SiteComponents};
use tracing::{debug, info};

use crate::error::{WorkspaceError, WorkspaceResult};

/// Where a site's global components live
pub trait ComponentStore: Send + Sync {
    fn list(&self) -> WorkspaceResult<SiteComponents>;

    fn get(&self, id: &str) -> WorkspaceResult<Option<GlobalComponent>>;

    /// Insert or replace by id
    fn save(&self, component: GlobalComponent) -> WorkspaceResult<()>;

    fn set_default(&self, id: &str) -> WorkspaceResult<()>;

    fn remove(&self, id: &str) -> WorkspaceResult<GlobalComponent>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    site: RwLock<SiteComponents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_components(site: SiteComponents) -> Self {
        Self {
            site: RwLock::new(site),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut SiteComponents) -> WorkspaceResult<T>) -> WorkspaceResult<T> {
        let mut site = self.site.write().map_err(|_| WorkspaceError::StorePoisoned)?;
        f(&mut site)
    }

    fn read<T>(&self, f: impl FnOnce(&SiteComponents) -> T) -> WorkspaceResult<T> {
        let site = self.site.read().map_err(|_| WorkspaceError::StorePoisoned)?;
        Ok(f(&site))
    }
}

impl ComponentStore for MemoryStore {
    fn list(&self) -> WorkspaceResult<SiteComponents> {
        self.read(SiteComponents::clone)
    }

    fn get(&self, id: &str) -> WorkspaceResult<Option<GlobalComponent>> {
        self.read(|site| site.get(id).cloned())
    }

    fn save(&self, component: GlobalComponent) -> WorkspaceResult<()> {
        debug!(id = %component.id, "saving component");
        self.write(|site| Ok(site.upsert(component)?))
    }

    fn set_default(&self, id: &str) -> WorkspaceResult<()> {
        self.write(|site| Ok(site.set_default(id)?))
    }

    fn remove(&self, id: &str) -> WorkspaceResult<GlobalComponent> {
        self.write(|site| Ok(site.remove(id)?))
    }
}

/// A [`MemoryStore`] mirrored to a JSON file after every write
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open `path`, starting empty when it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> WorkspaceResult<Self> {
        let path = path.as_ref().to_path_buf();
        let site = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            SiteComponents::from_json(&json)?
        } else {
            SiteComponents::new()
        };
        info!(path = %path.display(), components = site.components().len(), "opened component library");
        Ok(Self {
            path,
            inner: MemoryStore::with_components(site),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> WorkspaceResult<()> {
        let site = self.inner.list()?;
        let json = serde_json::to_string_pretty(&site)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ComponentStore for JsonFileStore {
    fn list(&self) -> WorkspaceResult<SiteComponents> {
        self.inner.list()
    }

    fn get(&self, id: &str) -> WorkspaceResult<Option<GlobalComponent>> {
        self.inner.get(id)
    }

    fn save(&self, component: GlobalComponent) -> WorkspaceResult<()> {
        self.inner.save(component)?;
        self.flush()
    }

    fn set_default(&self, id: &str) -> WorkspaceResult<()> {
        self.inner.set_default(id)?;
        self.flush()
    }

    fn remove(&self, id: &str) -> WorkspaceResult<GlobalComponent> {
        let removed = self.inner.remove(id)?;
        self.flush()?;
        Ok(removed)
    }
}
