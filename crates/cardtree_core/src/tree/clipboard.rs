//! Clipboard subtree extraction and re-materialization.
//!
//! # Responsibility
//! - Turn selected subtrees into detached, identity-free node trees.
//! - Mint fresh cards from clipboard trees at a resolved placement.
//!
//! # Invariants
//! - Copy reads through `child_ids`, so only structurally linked
//!   descendants travel with a root.
//! - Materialized cards carry brand-new identities; clipboard payloads can
//!   be pasted any number of times into any tab.

use crate::identity::IdentityProvider;
use crate::model::card::{Card, CardId};
use crate::model::clipboard::ClipboardNode;
use crate::tree::links::index_of;

/// Captures the subtrees rooted at `roots` as identity-free node trees.
///
/// Callers pass selection roots (see `selection::selection_roots`); each
/// root yields one independent tree inside the shared payload.
pub fn copy_subtrees(cards: &[Card], roots: &[CardId]) -> Vec<ClipboardNode> {
    roots
        .iter()
        .filter_map(|&root| index_of(cards, root))
        .map(|index| node_from(cards, index))
        .collect()
}

fn node_from(cards: &[Card], index: usize) -> ClipboardNode {
    let card = &cards[index];
    let children = card
        .child_ids
        .iter()
        .filter_map(|&child| index_of(cards, child))
        .map(|child_index| node_from(cards, child_index))
        .collect();
    ClipboardNode {
        title: card.title.clone(),
        body: card.body.clone(),
        status: card.status,
        kind: card.kind,
        trace_up: card.trace_up,
        trace_down: card.trace_down,
        children,
    }
}

/// Flattened paste-ready cards plus the ids of the new subtree roots.
#[derive(Debug, Clone)]
pub struct MaterializedCards {
    /// Depth-first order, ready to splice into the document array.
    pub cards: Vec<Card>,
    /// One id per clipboard tree, in payload order.
    pub root_ids: Vec<CardId>,
}

/// Mints fresh cards from the clipboard trees.
///
/// All roots share the given parent and depth, exactly like a multi-root
/// insert. Display codes are left unassigned; the owning tab numbers the
/// new cards in order after the splice.
pub fn materialize<I: IdentityProvider>(
    nodes: &[ClipboardNode],
    parent_id: Option<CardId>,
    depth: u32,
    identity: &mut I,
) -> MaterializedCards {
    let mut cards = Vec::new();
    let mut root_ids = Vec::with_capacity(nodes.len());
    for node in nodes {
        let root_id = materialize_node(node, parent_id, depth, identity, &mut cards);
        root_ids.push(root_id);
    }
    MaterializedCards { cards, root_ids }
}

fn materialize_node<I: IdentityProvider>(
    node: &ClipboardNode,
    parent_id: Option<CardId>,
    depth: u32,
    identity: &mut I,
    out: &mut Vec<Card>,
) -> CardId {
    let mut card = Card::with_id(identity.next_id(), node.kind, node.title.clone());
    card.body = node.body.clone();
    card.status = node.status;
    card.trace_up = node.trace_up;
    card.trace_down = node.trace_down;
    card.parent_id = parent_id;
    card.depth = depth;
    let id = card.id;
    out.push(card);
    for child in &node.children {
        materialize_node(child, Some(id), depth + 1, identity, out);
    }
    id
}
