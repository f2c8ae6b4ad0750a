//! # Structural moves
//!
//! One primitive, [`move_node`], backs every reorder gesture. Its index
//! counts element children of the destination after the moved node has
//! been detached, so "move to 0" always means "first element child"
//! whether or not the node started in the same parent.
//!
//! Layer outline drags are translated into that primitive by
//! [`translate_layer_drop`]. Drags inside the rendered page are not
//! translated at all: the surface reports the whole reconstructed document
//! and the session replaces its document with it.

use pagewright_markup::{address_of, resolve, Address, Dom, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mutations::{Mutation, MutationError};

/// Move `node` under `parent` at element index `index`.
///
/// Returns `Ok(false)` without touching the tree when `parent` is `node`
/// or one of its descendants. Void and raw-text parents are rejected, their
/// children would never be serialized.
pub fn move_node(
    dom: &mut Dom,
    node: NodeId,
    parent: NodeId,
    index: usize,
) -> Result<bool, MutationError> {
    if node == dom.root() || dom.contains(node, dom.body()) {
        return Err(MutationError::ProtectedNode("moved"));
    }
    if !dom.is_element(parent) && parent != dom.root() {
        return Err(MutationError::NotAnElement);
    }
    if !dom.can_hold_elements(parent) {
        return Err(MutationError::InvalidStructure(format!(
            "<{}> cannot contain elements",
            dom.tag_name(parent).unwrap_or_default()
        )));
    }
    if dom.contains(node, parent) {
        debug!(node, parent, "ignoring move into own subtree");
        return Ok(false);
    }

    dom.detach(node);
    let siblings = dom.element_children(parent);
    match siblings.get(index) {
        Some(&reference) => dom.insert_before(reference, node),
        None => dom.append_child(parent, node),
    }
    Ok(true)
}

/// How a layer was dropped onto another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerDrop {
    /// Onto a row of the outline
    OnRow,
    /// Into an expanded container row, as its first child
    IntoContainer,
}

fn element_index(dom: &Dom, node: NodeId) -> Option<usize> {
    let parent = dom.parent(node)?;
    dom.element_children(parent).iter().position(|c| *c == node)
}

/// Translate an outline drag into a move mutation.
///
/// - same parent: the source takes the target's index (array move)
/// - different parent: the source lands right after the target
/// - into an expanded container: the source becomes its first child
///
/// Returns `None` when either address misses, the drop is a no-op, or the
/// container cannot hold elements.
pub fn translate_layer_drop(
    dom: &Dom,
    source: &Address,
    target: &Address,
    drop: LayerDrop,
) -> Option<Mutation> {
    let source_node = resolve(dom, source)?;
    let target_node = resolve(dom, target)?;
    if source_node == target_node || dom.contains(source_node, target_node) {
        return None;
    }

    let (parent, index) = match drop {
        LayerDrop::IntoContainer if !dom.can_hold_elements(target_node) => return None,
        LayerDrop::IntoContainer => (target_node, 0),
        LayerDrop::OnRow => {
            let parent = dom.parent(target_node)?;
            let target_index = element_index(dom, target_node)?;
            if dom.parent(source_node) == Some(parent) {
                (parent, target_index)
            } else {
                (parent, target_index + 1)
            }
        }
    };

    Some(Mutation::MoveElement {
        address: source.clone(),
        parent: address_of(dom, parent)?,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_markup::{parse, serialize};

    fn ids(dom: &Dom, parent: NodeId) -> Vec<String> {
        dom.element_children(parent)
            .into_iter()
            .filter_map(|id| dom.attr(id, "id").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_move_last_to_front() {
        let mut dom = parse("<body><div id=\"p\"><i id=\"a\"></i><i id=\"b\"></i><i id=\"c\"></i></div></body>");
        let p = dom.find_by_id("p").unwrap();
        let c = dom.find_by_id("c").unwrap();

        assert!(move_node(&mut dom, c, p, 0).unwrap());
        assert_eq!(ids(&dom, p), ["c", "a", "b"]);
    }

    #[test]
    fn test_index_counts_after_detach() {
        let mut dom = parse("<body><div id=\"p\"><i id=\"a\"></i><i id=\"b\"></i><i id=\"c\"></i></div></body>");
        let p = dom.find_by_id("p").unwrap();
        let a = dom.find_by_id("a").unwrap();

        move_node(&mut dom, a, p, 1).unwrap();
        assert_eq!(ids(&dom, p), ["b", "a", "c"]);

        move_node(&mut dom, a, p, 99).unwrap();
        assert_eq!(ids(&dom, p), ["b", "c", "a"]);
    }

    #[test]
    fn test_move_into_self_is_noop() {
        let source = "<body><div id=\"a\"><div id=\"b\"></div></div></body>";
        let mut dom = parse(source);
        let a = dom.find_by_id("a").unwrap();
        let b = dom.find_by_id("b").unwrap();

        assert!(!move_node(&mut dom, a, a, 0).unwrap());
        assert!(!move_node(&mut dom, a, b, 0).unwrap());
        assert_eq!(serialize(&dom), source);
    }

    #[test]
    fn test_body_cannot_move() {
        let mut dom = parse("<html><body><div id=\"a\"></div></body></html>");
        let body = dom.body();
        let a = dom.find_by_id("a").unwrap();
        assert_eq!(
            move_node(&mut dom, body, a, 0),
            Err(MutationError::ProtectedNode("moved"))
        );
    }

    #[test]
    fn test_layer_drop_translation() {
        let dom = parse(
            "<body><ul id=\"l\"><li id=\"a\"></li><li id=\"b\"></li><li id=\"c\"></li></ul><ol id=\"o\"><li id=\"x\"></li></ol></body>",
        );

        let same_parent = translate_layer_drop(&dom, &Address::new("#c"), &Address::new("#a"), LayerDrop::OnRow);
        assert_eq!(
            same_parent,
            Some(Mutation::MoveElement {
                address: Address::new("#c"),
                parent: Address::new("#l"),
                index: 0,
            })
        );

        let cross_parent = translate_layer_drop(&dom, &Address::new("#x"), &Address::new("#a"), LayerDrop::OnRow);
        assert_eq!(
            cross_parent,
            Some(Mutation::MoveElement {
                address: Address::new("#x"),
                parent: Address::new("#l"),
                index: 1,
            })
        );

        let into = translate_layer_drop(&dom, &Address::new("#a"), &Address::new("#o"), LayerDrop::IntoContainer);
        assert_eq!(
            into,
            Some(Mutation::MoveElement {
                address: Address::new("#a"),
                parent: Address::new("#o"),
                index: 0,
            })
        );

        assert_eq!(
            translate_layer_drop(&dom, &Address::new("#l"), &Address::new("#b"), LayerDrop::OnRow),
            None
        );
    }

    #[test]
    fn test_void_and_raw_text_parents_are_rejected() {
        let source = "<body><img src=\"a.png\"><script>go()</script><p id=\"k\">Keep me</p></body>";
        let mut dom = parse(source);
        let p = dom.find_by_id("k").unwrap();
        let img = dom.find_all("img")[0];
        let script = dom.find_all("script")[0];

        assert!(matches!(
            move_node(&mut dom, p, img, 0),
            Err(MutationError::InvalidStructure(_))
        ));
        assert!(matches!(
            move_node(&mut dom, p, script, 0),
            Err(MutationError::InvalidStructure(_))
        ));
        assert_eq!(serialize(&dom), source);
    }

    #[test]
    fn test_layer_drop_into_void_element() {
        let dom = parse("<body><img src=\"a.png\"><p id=\"k\">Keep me</p></body>");
        assert_eq!(
            translate_layer_drop(&dom, &Address::new("#k"), &Address::new("body > img"), LayerDrop::IntoContainer),
            None
        );
    }
}
