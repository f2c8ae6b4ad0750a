use pagewright_markup::Address;
use serde::Serialize;
use tracing::info;

use crate::classifier::{Detection, Detections};
use crate::component::{GlobalComponent, PageOverrides, Position};
use crate::error::{ComponentError, ComponentResult};
use crate::site::SiteComponents;

/// A detected header/footer the user may turn into a global component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionOffer {
    pub position: Position,
    pub address: Address,
    pub markup: String,
    pub confidence: u32,
    pub suggested_name: String,
}

impl From<&Detection> for PromotionOffer {
    fn from(detection: &Detection) -> Self {
        let suggested_name = match detection.position {
            Position::Header => "Site header",
            Position::Footer => "Site footer",
            Position::Content => "Component",
        };
        Self {
            position: detection.position,
            address: detection.address.clone(),
            markup: detection.markup.clone(),
            confidence: detection.confidence,
            suggested_name: suggested_name.to_string(),
        }
    }
}

/// What to do with a detected header/footer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum GlobalAction {
    /// No global exists for the position yet
    Offer(PromotionOffer),
    /// A global exists; the inline copy must go
    Strip { position: Position, existing: String },
}

/// Decide, per detected position, whether to offer promotion or strip.
/// Only positions the page is covered at (see [`SiteComponents::covers`])
/// are stripped.
pub fn plan(detections: &Detections, site: &SiteComponents, overrides: &PageOverrides) -> Vec<GlobalAction> {
    detections
        .iter()
        .map(|detection| {
            let position = detection.position;
            let existing = if site.covers(position, overrides) {
                site.effective(position, overrides)
                    .ok()
                    .flatten()
                    .or_else(|| site.for_position(position).next())
            } else {
                None
            };
            match existing {
                Some(component) => GlobalAction::Strip {
                    position,
                    existing: component.id.clone(),
                },
                None => GlobalAction::Offer(PromotionOffer::from(detection)),
            }
        })
        .collect()
}

fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Accept an offer: the detected markup becomes the site default for its
/// position
pub fn promote(
    site: &mut SiteComponents,
    offer: &PromotionOffer,
    name: &str,
) -> ComponentResult<GlobalComponent> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ComponentError::EmptyName);
    }

    let base = match slug(name) {
        s if s.is_empty() => offer.position.as_str().to_string(),
        s => format!("{}-{}", offer.position, s),
    };
    let mut id = base.clone();
    let mut suffix = 2;
    while site.get(&id).is_some() {
        id = format!("{}-{}", base, suffix);
        suffix += 1;
    }

    let component = GlobalComponent::new(id, name, offer.markup.clone(), offer.position).as_default();
    site.upsert(component.clone())?;
    info!(id = %component.id, position = %component.position, "promoted detected markup to global component");
    Ok(component)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;

    const PAGE: &str = "<body><header><nav><a>1</a><a>2</a></nav></header><main></main><footer>&copy; 2024</footer></body>";

    #[test]
    fn test_offers_when_site_has_no_globals() {
        let detections = Classifier::new().classify_document(PAGE);
        let actions = plan(&detections, &SiteComponents::new(), &PageOverrides::default());
        assert_eq!(actions.len(), 2);
        assert!(matches!(&actions[0], GlobalAction::Offer(o) if o.position == Position::Header));
    }

    #[test]
    fn test_strips_when_global_exists() {
        let mut site = SiteComponents::new();
        site.upsert(GlobalComponent::new("h", "H", "<header></header>", Position::Header).as_default())
            .unwrap();

        let detections = Classifier::new().classify_document(PAGE);
        let actions = plan(&detections, &site, &PageOverrides::default());
        assert_eq!(
            actions[0],
            GlobalAction::Strip {
                position: Position::Header,
                existing: "h".to_string()
            }
        );
        assert!(matches!(&actions[1], GlobalAction::Offer(o) if o.position == Position::Footer));
    }

    #[test]
    fn test_promote_creates_default() {
        let detections = Classifier::new().classify_document(PAGE);
        let offer = PromotionOffer::from(detections.header.as_ref().unwrap());
        let mut site = SiteComponents::new();

        let first = promote(&mut site, &offer, "Main Nav!").unwrap();
        assert_eq!(first.id, "header-main-nav");
        assert!(first.is_default);
        assert_eq!(first.html, offer.markup);

        let second = promote(&mut site, &offer, "Main nav").unwrap();
        assert_eq!(second.id, "header-main-nav-2");
        assert_eq!(site.default_for(Position::Header).unwrap().id, second.id);

        assert!(matches!(promote(&mut site, &offer, "  "), Err(ComponentError::EmptyName)));
    }
}
