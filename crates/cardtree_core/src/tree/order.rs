//! Normalization of untrusted card arrays into canonical document order.
//!
//! # Responsibility
//! - Re-emit an arbitrarily ordered card set in depth-first order with
//!   recomputed depths, so the contiguity invariant holds before any other
//!   engine code touches the data.
//!
//! # Invariants
//! - Cycle-safe: a visited set guarantees every card is emitted exactly once
//!   regardless of corrupt parent pointers.
//! - Lossless: unresolved or orphaned cards are appended as roots, never
//!   dropped.

use crate::model::card::{Card, CardId};
use crate::tree::links::rebuild_links;
use std::collections::{HashMap, HashSet};

/// Rewrites an untrusted card array into canonical depth-first order.
///
/// Roots are the cards whose parent is absent from the set. Children are
/// visited in the parent's cached `child_ids` order when those entries still
/// resolve and agree on parentage, then any remaining same-parent cards in
/// array order. Cards left unvisited after the root pass (missing parents,
/// parent cycles) become roots themselves: their `parent_id` is cleared and
/// their own subtree is emitted beneath them.
///
/// Every card array entering the engine from outside passes through here
/// exactly once; stored order and links are not trusted.
pub fn normalize_card_order(cards: Vec<Card>) -> Vec<Card> {
    let index_by_id: HashMap<CardId, usize> = cards
        .iter()
        .enumerate()
        .map(|(index, card)| (card.id, index))
        .collect();
    let mut children_by_parent: HashMap<CardId, Vec<usize>> = HashMap::new();
    for (index, card) in cards.iter().enumerate() {
        if let Some(parent_id) = card.parent_id {
            if index_by_id.contains_key(&parent_id) {
                children_by_parent.entry(parent_id).or_default().push(index);
            }
        }
    }

    let mut visited: HashSet<CardId> = HashSet::new();
    let mut ordered: Vec<Card> = Vec::with_capacity(cards.len());

    for (index, card) in cards.iter().enumerate() {
        let is_root = match card.parent_id {
            None => true,
            Some(parent_id) => !index_by_id.contains_key(&parent_id),
        };
        if is_root {
            emit_subtree(
                &cards,
                &index_by_id,
                &children_by_parent,
                &mut visited,
                &mut ordered,
                index,
                0,
                card.parent_id.is_some(),
            );
        }
    }

    // Leftovers are members of parent cycles. Break the cycle at the first
    // unvisited card in array order and emit its subtree as a new root.
    for index in 0..cards.len() {
        if !visited.contains(&cards[index].id) {
            emit_subtree(
                &cards,
                &index_by_id,
                &children_by_parent,
                &mut visited,
                &mut ordered,
                index,
                0,
                true,
            );
        }
    }

    rebuild_links(&mut ordered);
    ordered
}

/// Emits one subtree iteratively, depth-first.
///
/// `clear_root_parent` detaches the emitted root from an unresolvable
/// parent so the output is a forest of real trees.
#[allow(clippy::too_many_arguments)]
fn emit_subtree(
    cards: &[Card],
    index_by_id: &HashMap<CardId, usize>,
    children_by_parent: &HashMap<CardId, Vec<usize>>,
    visited: &mut HashSet<CardId>,
    ordered: &mut Vec<Card>,
    root_index: usize,
    root_depth: u32,
    clear_root_parent: bool,
) {
    let root_id = cards[root_index].id;
    let mut stack: Vec<(usize, u32)> = vec![(root_index, root_depth)];
    while let Some((index, depth)) = stack.pop() {
        let card = &cards[index];
        if !visited.insert(card.id) {
            continue;
        }

        let mut emitted = card.clone();
        emitted.depth = depth;
        if card.id == root_id && clear_root_parent {
            emitted.parent_id = None;
        }
        ordered.push(emitted);

        // Cached child order first, array order for anything the cache
        // missed; pushed reversed so the stack pops in visit order.
        let mut child_indices: Vec<usize> = Vec::new();
        for child_id in &card.child_ids {
            if let Some(&child_index) = index_by_id.get(child_id) {
                if cards[child_index].parent_id == Some(card.id)
                    && !visited.contains(child_id)
                    && !child_indices.contains(&child_index)
                {
                    child_indices.push(child_index);
                }
            }
        }
        if let Some(extra) = children_by_parent.get(&card.id) {
            for &child_index in extra {
                if !visited.contains(&cards[child_index].id)
                    && !child_indices.contains(&child_index)
                {
                    child_indices.push(child_index);
                }
            }
        }
        for &child_index in child_indices.iter().rev() {
            stack.push((child_index, depth + 1));
        }
    }
}
