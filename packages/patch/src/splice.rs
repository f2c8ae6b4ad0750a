use pagewright_markup::{
    outer_html, parse, parse_fragment, resolve, serialize, Address, Dom, NodeId, NodeKind,
};
use tracing::{debug, warn};

use crate::error::PatchApplyError;
use crate::patch::{Operation, Patch};

/// Result of splicing a patch into a tree
#[derive(Debug, Clone, PartialEq)]
pub struct Splice {
    /// Nodes that now hold the payload
    pub inserted: Vec<NodeId>,
    /// Markup of the changed region only
    pub region: String,
}

/// Result of applying a patch to a document string
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPatch {
    pub document: String,
    pub region: String,
}

/// Top-level payload nodes, unwrapped from a `body` if the payload has one
fn payload_nodes(fragment: &Dom) -> Vec<NodeId> {
    fragment
        .children(fragment.body())
        .iter()
        .copied()
        .filter(|&id| match fragment.kind(id) {
            Some(NodeKind::Text { content }) => !content.trim().is_empty(),
            Some(NodeKind::Element(_)) | Some(NodeKind::Comment { .. }) => true,
            _ => false,
        })
        .collect()
}

/// Trailing top-level footer of the body, if any
fn trailing_footer(dom: &Dom, body: NodeId) -> Option<NodeId> {
    let last = dom.element_children(body).into_iter().last()?;
    (dom.tag_name(last) == Some("footer")).then_some(last)
}

fn region_of(dom: &Dom, nodes: &[NodeId]) -> String {
    nodes.iter().map(|&id| outer_html(dom, id)).collect()
}

/// Splice a patch into `dom` in place.
///
/// `target` is the anchor for `add` and the replaced element for `modify`;
/// it is ignored by `replace_all`.
pub fn splice(
    dom: &mut Dom,
    patch: &Patch,
    target: Option<&Address>,
) -> Result<Splice, PatchApplyError> {
    match patch.operation {
        Operation::ReplaceAll => {
            *dom = parse(&patch.markup);
            let inserted = dom.children(dom.root()).to_vec();
            Ok(Splice {
                inserted,
                region: patch.markup.clone(),
            })
        }
        Operation::Add => splice_add(dom, &patch.markup, target),
        Operation::Modify => splice_modify(dom, &patch.markup, target),
    }
}

fn splice_add(
    dom: &mut Dom,
    markup: &str,
    anchor: Option<&Address>,
) -> Result<Splice, PatchApplyError> {
    let fragment = parse_fragment(markup);
    let payload = payload_nodes(&fragment);
    if !payload.iter().any(|&id| fragment.is_element(id)) {
        return Err(PatchApplyError::EmptyPayload);
    }

    let body = dom.body();
    // Anchoring on the body or one of its ancestors would place the payload
    // outside the body, so it is appended like an unanchored add.
    let anchor = match anchor {
        Some(address) => {
            let node = resolve(dom, address)
                .ok_or_else(|| PatchApplyError::TargetMiss(address.to_string()))?;
            (!dom.contains(node, body)).then_some(node)
        }
        None => None,
    };

    let footer = trailing_footer(dom, body);
    let mut inserted = Vec::with_capacity(payload.len());
    let mut previous = anchor;

    for source in payload {
        let node = dom.import(&fragment, source);
        match (previous, footer) {
            (Some(reference), _) => dom.insert_after(reference, node),
            (None, Some(footer)) => dom.insert_before(footer, node),
            (None, None) => dom.append_child(body, node),
        }
        if anchor.is_some() {
            previous = Some(node);
        }
        inserted.push(node);
    }

    debug!(
        nodes = inserted.len(),
        anchored = anchor.is_some(),
        before_footer = anchor.is_none() && footer.is_some(),
        "added patch payload"
    );

    let region = region_of(dom, &inserted);
    Ok(Splice { inserted, region })
}

/// Find the element a payload element replaces, skipping markup spliced in
/// by earlier elements of the same payload
fn modify_target(dom: &Dom, fragment: &Dom, source: NodeId, inserted: &[NodeId]) -> Option<NodeId> {
    let fresh = |node: NodeId| !inserted.iter().any(|&new| dom.contains(new, node));

    if let Some(id) = fragment.attr(source, "id") {
        if let Some(found) = dom.find_by_id(id).filter(|&found| fresh(found)) {
            return Some(found);
        }
    }

    let tag = fragment.tag_name(source)?;
    let body = dom.body();
    let mut same_tag = dom
        .descendants(body)
        .into_iter()
        .filter(|&id| dom.tag_name(id) == Some(tag) && fresh(id));
    match (same_tag.next(), same_tag.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

fn splice_modify(
    dom: &mut Dom,
    markup: &str,
    target: Option<&Address>,
) -> Result<Splice, PatchApplyError> {
    let fragment = parse_fragment(markup);
    let payload: Vec<NodeId> = payload_nodes(&fragment)
        .into_iter()
        .filter(|&id| fragment.is_element(id))
        .collect();
    if payload.is_empty() {
        return Err(PatchApplyError::EmptyPayload);
    }

    let mut explicit = match target {
        Some(address) => Some(
            resolve(dom, address)
                .ok_or_else(|| PatchApplyError::TargetMiss(address.to_string()))?,
        ),
        None => None,
    };

    let mut inserted = Vec::new();
    for source in payload {
        // An explicit target is consumed by the first payload element
        let Some(existing) = explicit.take().or_else(|| modify_target(dom, &fragment, source, &inserted))
        else {
            warn!(
                tag = fragment.tag_name(source).unwrap_or_default(),
                "no existing element matches modified markup"
            );
            continue;
        };
        if existing == dom.body() || existing == dom.root() {
            continue;
        }

        let node = dom.import(&fragment, source);
        dom.insert_before(existing, node);
        dom.detach(existing);
        inserted.push(node);
    }

    if inserted.is_empty() {
        return Err(PatchApplyError::NoMatchingTarget);
    }

    let region = region_of(dom, &inserted);
    Ok(Splice { inserted, region })
}

/// Apply a patch to a document string.
///
/// `replace_all` returns the payload verbatim; the other operations
/// reserialize the whole document after splicing.
pub fn apply_patch(
    document: &str,
    patch: &Patch,
    target: Option<&Address>,
) -> Result<AppliedPatch, PatchApplyError> {
    if patch.operation == Operation::ReplaceAll {
        return Ok(AppliedPatch {
            document: patch.markup.clone(),
            region: patch.markup.clone(),
        });
    }

    let mut dom = parse(document);
    let spliced = splice(&mut dom, patch, target)?;
    Ok(AppliedPatch {
        document: serialize(&dom),
        region: spliced.region,
    })
}
