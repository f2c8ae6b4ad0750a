use serde::{Deserialize, Serialize};
use tracing::info;

use crate::component::{GlobalComponent, PageOverride, PageOverrides, Position};
use crate::error::{ComponentError, ComponentResult};

/// Global components of one site, with at most one default per position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteComponents {
    components: Vec<GlobalComponent>,
}

impl SiteComponents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored records, keeping only the first default per
    /// position
    pub fn from_components(components: impl IntoIterator<Item = GlobalComponent>) -> Self {
        let mut site = Self::new();
        for mut component in components {
            if component.is_default && site.default_for(component.position).is_some() {
                component.is_default = false;
            }
            site.components.push(component);
        }
        site
    }

    pub fn from_json(json: &str) -> ComponentResult<Self> {
        let components: Vec<GlobalComponent> = serde_json::from_str(json)?;
        Ok(Self::from_components(components))
    }

    pub fn components(&self) -> &[GlobalComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GlobalComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn for_position(&self, position: Position) -> impl Iterator<Item = &GlobalComponent> {
        self.components
            .iter()
            .filter(move |c| c.position == position)
    }

    pub fn default_for(&self, position: Position) -> Option<&GlobalComponent> {
        self.components
            .iter()
            .find(|c| c.position == position && c.is_default)
    }

    /// Insert or replace by id. A default component demotes the previous
    /// default for its position.
    pub fn upsert(&mut self, component: GlobalComponent) -> ComponentResult<()> {
        if !component.position.is_global() {
            return Err(ComponentError::NotGlobal(component.position));
        }
        if component.is_default {
            self.clear_default(component.position);
        }

        match self.components.iter_mut().find(|c| c.id == component.id) {
            Some(existing) => *existing = component,
            None => self.components.push(component),
        }
        Ok(())
    }

    fn clear_default(&mut self, position: Position) {
        for component in self
            .components
            .iter_mut()
            .filter(|c| c.position == position)
        {
            component.is_default = false;
        }
    }

    pub fn set_default(&mut self, id: &str) -> ComponentResult<()> {
        let position = self
            .get(id)
            .map(|c| c.position)
            .ok_or_else(|| ComponentError::UnknownComponent(id.to_string()))?;

        self.clear_default(position);
        if let Some(component) = self.components.iter_mut().find(|c| c.id == id) {
            component.is_default = true;
            component.touch();
        }
        info!(id, %position, "set default global component");
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> ComponentResult<GlobalComponent> {
        let index = self
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ComponentError::UnknownComponent(id.to_string()))?;
        Ok(self.components.remove(index))
    }

    /// Whether the site owns `position` on a page with these overrides.
    ///
    /// True when the page renders a global there, or hides a position the
    /// site has components for. Inline copies are stripped exactly where
    /// this holds.
    pub fn covers(&self, position: Position, overrides: &PageOverrides) -> bool {
        match overrides.get(position) {
            Some(PageOverride::Hidden) => self.for_position(position).next().is_some(),
            Some(PageOverride::Component { id }) => self.get(id).is_some_and(|c| c.position == position),
            None => self.default_for(position).is_some(),
        }
    }

    /// The component a page renders at `position`, honoring its overrides
    pub fn effective(
        &self,
        position: Position,
        overrides: &PageOverrides,
    ) -> ComponentResult<Option<&GlobalComponent>> {
        match overrides.get(position) {
            Some(PageOverride::Hidden) => Ok(None),
            Some(PageOverride::Component { id }) => {
                let component = self
                    .get(id)
                    .ok_or_else(|| ComponentError::UnknownComponent(id.clone()))?;
                if component.position != position {
                    return Err(ComponentError::PositionMismatch {
                        id: id.clone(),
                        expected: position,
                        actual: component.position,
                    });
                }
                Ok(Some(component))
            }
            None => Ok(self.default_for(position)),
        }
    }
}
