//! Structural mutation engine: insert, delete, move and merge.
//!
//! # Responsibility
//! - Apply each structural edit as one pure transformation of the ordered
//!   card array, preserving subtree contiguity.
//!
//! # Invariants
//! - Validate first, mutate only when every check passes; a rejected
//!   operation leaves the array byte-for-byte unchanged.
//! - Every mutation ends with a full `rebuild_links` pass.

use crate::model::card::{Card, CardId};
use crate::tree::links::{index_of, is_descendant_of, rebuild_links, subtree_end};
use std::collections::HashSet;

/// Placement of new or moved cards relative to an anchor card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Same parent and depth as the anchor, at the anchor's index.
    Before,
    /// Same parent and depth as the anchor, after the anchor's subtree.
    After,
    /// Anchor becomes the parent; placed after the anchor's subtree.
    Child,
}

/// Resolved placement: splice index plus the parent/depth every inserted
/// root will take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub index: usize,
    pub parent_id: Option<CardId>,
    pub depth: u32,
}

/// Computes where cards land relative to the anchor at `anchor_index`.
pub fn resolve_insertion(cards: &[Card], anchor_index: usize, position: InsertPosition) -> Insertion {
    let anchor = &cards[anchor_index];
    match position {
        InsertPosition::Before => Insertion {
            index: anchor_index,
            parent_id: anchor.parent_id,
            depth: anchor.depth,
        },
        InsertPosition::After => Insertion {
            index: subtree_end(cards, anchor_index),
            parent_id: anchor.parent_id,
            depth: anchor.depth,
        },
        InsertPosition::Child => Insertion {
            index: subtree_end(cards, anchor_index),
            parent_id: Some(anchor.id),
            depth: anchor.depth + 1,
        },
    }
}

/// Placement used when a tab has no cards yet: a lone root at the end.
pub fn root_insertion(cards: &[Card]) -> Insertion {
    Insertion {
        index: cards.len(),
        parent_id: None,
        depth: 0,
    }
}

/// Splices one prepared card in at the resolved placement and relinks.
pub fn insert_card(cards: &mut Vec<Card>, mut card: Card, insertion: Insertion) {
    card.parent_id = insertion.parent_id;
    card.depth = insertion.depth;
    cards.insert(insertion.index.min(cards.len()), card);
    rebuild_links(cards);
}

/// Result of a subtree deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedSubtrees {
    /// Every removed card id, targets and descendants alike.
    pub removed_ids: Vec<CardId>,
    /// Smallest array index that was vacated; the caller clamps it against
    /// the shrunk array to pick the fallback selection.
    pub min_index: usize,
}

/// Removes every target together with its whole descendant set.
///
/// Descendants are collected depth-first through the cached `child_ids`
/// before anything is removed, so deleting a node always deletes its entire
/// subtree. Returns `None` when no target resolves to an existing card.
pub fn delete_subtrees(cards: &mut Vec<Card>, targets: &[CardId]) -> Option<DeletedSubtrees> {
    let mut removed: HashSet<CardId> = HashSet::new();
    let mut min_index = usize::MAX;
    for &target in targets {
        let Some(index) = index_of(cards, target) else {
            continue;
        };
        min_index = min_index.min(index);
        collect_descendants(cards, target, &mut removed);
    }
    if removed.is_empty() {
        return None;
    }

    let removed_ids: Vec<CardId> = cards
        .iter()
        .map(|card| card.id)
        .filter(|id| removed.contains(id))
        .collect();
    cards.retain(|card| !removed.contains(&card.id));
    rebuild_links(cards);
    Some(DeletedSubtrees {
        removed_ids,
        min_index,
    })
}

fn collect_descendants(cards: &[Card], root: CardId, out: &mut HashSet<CardId>) {
    if !out.insert(root) {
        return;
    }
    let Some(index) = index_of(cards, root) else {
        return;
    };
    for &child in &cards[index].child_ids {
        collect_descendants(cards, child, out);
    }
}

/// Moves the subtrees rooted at `moved_ids` next to `anchor_id`.
///
/// Validation is all-or-nothing: the anchor must exist, must not itself be
/// moved and must not descend from any moved card (cycle prevention).
/// Returns `false` with the array untouched on any failure. Moved ids are
/// reduced to their topmost roots; descendants keep their relative depth
/// offset from the root they follow.
pub fn move_subtrees(
    cards: &mut Vec<Card>,
    moved_ids: &[CardId],
    anchor_id: CardId,
    position: InsertPosition,
) -> bool {
    let moved_set: HashSet<CardId> = moved_ids
        .iter()
        .copied()
        .filter(|&id| index_of(cards, id).is_some())
        .collect();
    if moved_set.is_empty() {
        return false;
    }
    if moved_set.contains(&anchor_id) || index_of(cards, anchor_id).is_none() {
        return false;
    }
    for &moved in &moved_set {
        if is_descendant_of(cards, anchor_id, moved) {
            return false;
        }
    }

    // Topmost roots only, in document order; nested ids travel with their
    // containing subtree anyway.
    let mut root_indices: Vec<usize> = Vec::new();
    for (index, card) in cards.iter().enumerate() {
        if moved_set.contains(&card.id)
            && !moved_set
                .iter()
                .any(|&other| other != card.id && is_descendant_of(cards, card.id, other))
        {
            root_indices.push(index);
        }
    }

    let mut extracted: Vec<Card> = Vec::new();
    let mut extracted_roots: Vec<CardId> = Vec::new();
    let mut taken: HashSet<CardId> = HashSet::new();
    for &root_index in &root_indices {
        let end = subtree_end(cards, root_index);
        extracted_roots.push(cards[root_index].id);
        for card in &cards[root_index..end] {
            if taken.insert(card.id) {
                extracted.push(card.clone());
            }
        }
    }
    cards.retain(|card| !taken.contains(&card.id));

    let anchor_index = index_of(cards, anchor_id)
        .unwrap_or(cards.len().saturating_sub(1));
    let insertion = resolve_insertion(cards, anchor_index, position);

    // Rebase each extracted root on the shared target depth; descendants
    // follow with their original offset.
    let mut rebased: Vec<Card> = Vec::with_capacity(extracted.len());
    let mut current_root_depth = 0;
    for mut card in extracted {
        if extracted_roots.contains(&card.id) {
            current_root_depth = card.depth;
            card.parent_id = insertion.parent_id;
            card.depth = insertion.depth;
        } else {
            card.depth = insertion.depth + (card.depth - current_root_depth);
        }
        rebased.push(card);
    }

    let at = insertion.index.min(cards.len());
    cards.splice(at..at, rebased);
    rebuild_links(cards);
    true
}

/// Caller choices for a merge operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// OR-combine the originals' trace flags onto the merged card.
    pub combine_trace: bool,
    /// Keep the originals in place after the merged card instead of
    /// removing them.
    pub retain_originals: bool,
}

/// Merges two or more sibling cards into one replacement card.
///
/// Valid only when every id resolves, all share one parent and one depth,
/// none has children, and they sit contiguously in array order. Returns
/// `None` with the array untouched otherwise. The replacement card takes
/// the first card's kind and status, the earliest creation time, and sits
/// at the first card's former index.
pub fn merge_cards(
    cards: &mut Vec<Card>,
    ids: &[CardId],
    merged_id: CardId,
    merged_code: Option<u32>,
    options: MergeOptions,
) -> Option<Card> {
    if ids.len() < 2 {
        return None;
    }
    let mut indices: Vec<usize> = Vec::with_capacity(ids.len());
    for &id in ids {
        indices.push(index_of(cards, id)?);
    }
    indices.sort_unstable();
    if indices.windows(2).any(|pair| pair[1] != pair[0] + 1) {
        return None;
    }

    let first = &cards[indices[0]];
    let parent_id = first.parent_id;
    let depth = first.depth;
    for &index in &indices {
        let card = &cards[index];
        if card.parent_id != parent_id || card.depth != depth || !card.child_ids.is_empty() {
            return None;
        }
    }

    let originals: Vec<Card> = indices.iter().map(|&index| cards[index].clone()).collect();
    let mut merged = Card::with_id(merged_id, originals[0].kind, join_titles(&originals));
    merged.code = merged_code;
    merged.body = join_bodies(&originals);
    merged.status = originals[0].status;
    merged.created_at_ms = originals
        .iter()
        .map(|card| card.created_at_ms)
        .min()
        .unwrap_or(merged.created_at_ms);
    merged.parent_id = parent_id;
    merged.depth = depth;
    if options.combine_trace {
        merged.trace_up = originals.iter().any(|card| card.trace_up);
        merged.trace_down = originals.iter().any(|card| card.trace_down);
    } else {
        merged.trace_up = originals[0].trace_up;
        merged.trace_down = originals[0].trace_down;
    }

    let first_index = indices[0];
    if !options.retain_originals {
        cards.drain(first_index..=*indices.last().unwrap_or(&first_index));
    }
    cards.insert(first_index, merged.clone());
    rebuild_links(cards);
    Some(merged)
}

fn join_titles(originals: &[Card]) -> String {
    originals
        .iter()
        .map(|card| card.title.trim())
        .filter(|title| !title.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_bodies(originals: &[Card]) -> String {
    originals
        .iter()
        .map(|card| card.body.trim())
        .filter(|body| !body.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
