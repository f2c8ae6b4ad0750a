use std::collections::BTreeSet;

use pagewright_markup::{parse, parse_fragment, resolve, serialize, Dom, NodeId};
use tracing::debug;

use crate::classifier::Classifier;
use crate::component::{GlobalComponent, PageOverrides, Position};
use crate::error::{ComponentError, ComponentResult};
use crate::site::SiteComponents;

/// Marks markup injected from a global component; the value is its position
pub const GLOBAL_ATTR: &str = "data-pw-global";
/// Id of the global component the marked markup came from
pub const COMPONENT_ATTR: &str = "data-pw-component";

/// Elements that are inline copies of `position`
fn inline_globals(dom: &Dom, position: Position, classifier: &Classifier) -> Vec<NodeId> {
    let mut found = BTreeSet::new();

    for id in dom.elements() {
        if dom.attr(id, GLOBAL_ATTR) == Some(position.as_str()) {
            found.insert(id);
        }
    }

    if let Some(tag) = position.tag_name() {
        for id in dom.element_children(dom.body()) {
            if dom.tag_name(id) == Some(tag) {
                found.insert(id);
            }
        }
    }

    if let Some(detection) = classifier.detect(dom, position) {
        if let Some(id) = resolve(dom, &detection.address) {
            found.insert(id);
        }
    }

    let body = dom.body();
    found
        .into_iter()
        .filter(|&id| id != body && id != dom.root())
        .collect()
}

/// Remove inline copies of a global position, returning how many were
/// removed
pub fn strip_inline(dom: &mut Dom, position: Position, classifier: &Classifier) -> usize {
    let targets = inline_globals(dom, position, classifier);
    // Nested matches go away with their ancestor
    let mut removed = 0;
    for &id in &targets {
        if targets.iter().any(|&other| dom.is_ancestor(other, id)) {
            continue;
        }
        dom.detach(id);
        removed += 1;
    }
    if removed > 0 {
        debug!(%position, removed, "stripped inline global markup");
    }
    removed
}

/// Insert a component's markup: headers open the body, footers close it
pub fn inject(dom: &mut Dom, component: &GlobalComponent) -> ComponentResult<Vec<NodeId>> {
    if !component.position.is_global() {
        return Err(ComponentError::NotGlobal(component.position));
    }

    let fragment = parse_fragment(&component.html);
    let sources = fragment.element_children(fragment.body());
    if sources.is_empty() {
        return Err(ComponentError::EmptyMarkup);
    }

    let body = dom.body();
    let mut inserted = Vec::with_capacity(sources.len());
    for (index, source) in sources.into_iter().enumerate() {
        let node = dom.import(&fragment, source);
        if let Some(element) = dom.element_mut(node) {
            element.set_attr(GLOBAL_ATTR, Some(component.position.as_str().to_string()));
            element.set_attr(COMPONENT_ATTR, Some(component.id.clone()));
        }
        match component.position {
            Position::Header => dom.insert_child(body, index, node),
            _ => dom.append_child(body, node),
        }
        inserted.push(node);
    }
    Ok(inserted)
}

/// Outcome of removing inline copies of existing globals from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dedupe {
    pub document: String,
    pub stripped: Vec<(Position, usize)>,
}

impl Dedupe {
    pub fn changed(&self) -> bool {
        !self.stripped.is_empty()
    }
}

/// Strip the inline header/footer of every position the site covers for
/// this page (see [`SiteComponents::covers`]). The document is returned
/// untouched when nothing is stripped.
pub fn dedupe(
    document: &str,
    site: &SiteComponents,
    overrides: &PageOverrides,
    classifier: &Classifier,
) -> Dedupe {
    let positions: Vec<Position> = Position::GLOBAL
        .into_iter()
        .filter(|p| site.covers(*p, overrides))
        .collect();
    if positions.is_empty() {
        return Dedupe {
            document: document.to_string(),
            stripped: Vec::new(),
        };
    }

    let mut dom = parse(document);
    let stripped: Vec<(Position, usize)> = positions
        .into_iter()
        .map(|p| (p, strip_inline(&mut dom, p, classifier)))
        .filter(|(_, count)| *count > 0)
        .collect();

    let document = if stripped.is_empty() {
        document.to_string()
    } else {
        serialize(&dom)
    };
    Dedupe { document, stripped }
}

/// Render a page with the global components that apply to it
pub fn render_page(
    document: &str,
    site: &SiteComponents,
    overrides: &PageOverrides,
    classifier: &Classifier,
) -> ComponentResult<String> {
    let mut dom = parse(document);
    for position in Position::GLOBAL {
        if let Some(component) = site.effective(position, overrides)? {
            strip_inline(&mut dom, position, classifier);
            inject(&mut dom, component)?;
        }
    }
    Ok(serialize(&dom))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteComponents {
        SiteComponents::from_components(vec![
            GlobalComponent::new(
                "main-header",
                "Main header",
                "<header><nav><a href=\"/\">Home</a></nav></header>",
                Position::Header,
            )
            .as_default(),
            GlobalComponent::new(
                "main-footer",
                "Main footer",
                "<footer>&copy; Site</footer>",
                Position::Footer,
            )
            .as_default(),
        ])
    }

    #[test]
    fn test_inject_positions() {
        let site = site();
        let mut dom = parse("<body><main>x</main></body>");
        inject(&mut dom, site.get("main-header").unwrap()).unwrap();
        inject(&mut dom, site.get("main-footer").unwrap()).unwrap();

        let tags: Vec<_> = dom
            .element_children(dom.body())
            .into_iter()
            .filter_map(|id| dom.tag_name(id).map(str::to_string))
            .collect();
        assert_eq!(tags, ["header", "main", "footer"]);

        let header = dom.find_first("header").unwrap();
        assert_eq!(dom.attr(header, GLOBAL_ATTR), Some("header"));
        assert_eq!(dom.attr(header, COMPONENT_ATTR), Some("main-header"));
    }

    #[test]
    fn test_dedupe_without_globals_is_untouched() {
        let document = "<body>\n<header>inline</header>\n</body>";
        let result = dedupe(document, &SiteComponents::new(), &PageOverrides::default(), &Classifier::new());
        assert_eq!(result.document, document);
        assert!(!result.changed());
    }

    #[test]
    fn test_render_is_stable_on_rendered_output() {
        let site = site();
        let classifier = Classifier::new();
        let once = render_page("<body><main></main></body>", &site, &PageOverrides::default(), &classifier).unwrap();
        let twice = render_page(&once, &site, &PageOverrides::default(), &classifier).unwrap();
        assert_eq!(once, twice);
        assert_eq!(parse(&twice).find_all("header").len(), 1);
    }

    #[test]
    fn test_inject_rejects_empty_markup() {
        let mut dom = parse("<body></body>");
        let empty = GlobalComponent::new("x", "x", "just text", Position::Header);
        assert!(matches!(inject(&mut dom, &empty), Err(ComponentError::EmptyMarkup)));
    }
}
