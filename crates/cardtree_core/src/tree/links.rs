//! Structural primitives over the ordered card array.
//!
//! # Responsibility
//! - Delimit subtree runs for insertion, removal and move.
//! - Recompute every denormalized link field from `parent_id` plus array
//!   position.
//!
//! # Invariants
//! - Subtree contiguity: a card's descendants occupy one consecutive run of
//!   positions immediately after it, at strictly greater depth.
//! - `rebuild_links` is the only writer of `child_ids`, `prev_id` and
//!   `next_id`; it runs after every structural mutation and is never
//!   replaced by incremental bookkeeping.

use crate::model::card::{Card, CardId};
use std::collections::{HashMap, HashSet};

/// Exclusive end of the subtree rooted at `index`.
///
/// Scans forward while depth stays strictly greater than the base card's
/// depth. Returns `cards.len()` for an out-of-range index so callers can
/// splice without extra bounds checks.
pub fn subtree_end(cards: &[Card], index: usize) -> usize {
    let Some(base) = cards.get(index) else {
        return cards.len();
    };
    let mut end = index + 1;
    while end < cards.len() && cards[end].depth > base.depth {
        end += 1;
    }
    end
}

/// Position of a card in document order.
pub fn index_of(cards: &[Card], id: CardId) -> Option<usize> {
    cards.iter().position(|card| card.id == id)
}

/// Whether `ancestor` appears on the parent chain of `id`.
///
/// Walks upward through `parent_id` with a visited set, so corrupt input
/// containing a parent cycle terminates instead of looping.
pub fn is_descendant_of(cards: &[Card], id: CardId, ancestor: CardId) -> bool {
    let index_by_id: HashMap<CardId, usize> = cards
        .iter()
        .enumerate()
        .map(|(index, card)| (card.id, index))
        .collect();
    let mut visited = HashSet::new();
    let mut cursor = index_by_id
        .get(&id)
        .and_then(|&index| cards[index].parent_id);
    while let Some(current) = cursor {
        if current == ancestor {
            return true;
        }
        if !visited.insert(current) {
            return false;
        }
        cursor = index_by_id
            .get(&current)
            .and_then(|&index| cards[index].parent_id);
    }
    false
}

/// Recomputes `child_ids`, `prev_id` and `next_id` for the whole array.
///
/// Groups cards by `parent_id` in array order: adjacent entries sharing a
/// parent become sibling-linked, and each resolvable parent collects its
/// children in document order. O(n) and run wholesale after each mutation.
pub fn rebuild_links(cards: &mut [Card]) {
    let index_by_id: HashMap<CardId, usize> = cards
        .iter()
        .enumerate()
        .map(|(index, card)| (card.id, index))
        .collect();

    for card in cards.iter_mut() {
        card.child_ids.clear();
        card.prev_id = None;
        card.next_id = None;
    }

    let mut last_sibling: HashMap<Option<CardId>, usize> = HashMap::new();
    for index in 0..cards.len() {
        let id = cards[index].id;
        let parent_id = cards[index].parent_id;

        if let Some(&previous) = last_sibling.get(&parent_id) {
            cards[previous].next_id = Some(id);
            cards[index].prev_id = Some(cards[previous].id);
        }
        last_sibling.insert(parent_id, index);

        if let Some(parent_id) = parent_id {
            if let Some(&parent_index) = index_by_id.get(&parent_id) {
                cards[parent_index].child_ids.push(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_descendant_of, rebuild_links, subtree_end};
    use crate::model::card::{Card, CardKind};

    fn card_at(depth: u32, parent: Option<&Card>) -> Card {
        let mut card = Card::new(CardKind::Paragraph, "p");
        card.depth = depth;
        card.parent_id = parent.map(|p| p.id);
        card
    }

    fn sample_tree() -> Vec<Card> {
        // root > (a > a1), b
        let root = card_at(0, None);
        let a = card_at(1, Some(&root));
        let a1 = card_at(2, Some(&a));
        let b = card_at(1, Some(&root));
        vec![root, a, a1, b]
    }

    #[test]
    fn subtree_end_covers_descendant_run() {
        let cards = sample_tree();
        assert_eq!(subtree_end(&cards, 0), 4);
        assert_eq!(subtree_end(&cards, 1), 3);
        assert_eq!(subtree_end(&cards, 2), 3);
        assert_eq!(subtree_end(&cards, 3), 4);
        assert_eq!(subtree_end(&cards, 9), 4);
    }

    #[test]
    fn rebuild_links_recomputes_children_and_siblings() {
        let mut cards = sample_tree();
        rebuild_links(&mut cards);

        assert_eq!(cards[0].child_ids, vec![cards[1].id, cards[3].id]);
        assert_eq!(cards[1].child_ids, vec![cards[2].id]);
        assert_eq!(cards[1].prev_id, None);
        assert_eq!(cards[1].next_id, Some(cards[3].id));
        assert_eq!(cards[3].prev_id, Some(cards[1].id));
        assert_eq!(cards[3].next_id, None);
        assert_eq!(cards[2].prev_id, None);
        assert_eq!(cards[2].next_id, None);
    }

    #[test]
    fn descendant_walk_follows_parent_chain() {
        let cards = sample_tree();
        assert!(is_descendant_of(&cards, cards[2].id, cards[0].id));
        assert!(is_descendant_of(&cards, cards[2].id, cards[1].id));
        assert!(!is_descendant_of(&cards, cards[0].id, cards[2].id));
        assert!(!is_descendant_of(&cards, cards[3].id, cards[1].id));
    }

    #[test]
    fn descendant_walk_survives_parent_cycles() {
        let mut first = Card::new(CardKind::Heading, "x");
        let mut second = Card::new(CardKind::Heading, "y");
        first.parent_id = Some(second.id);
        second.parent_id = Some(first.id);
        let outsider = Card::new(CardKind::Heading, "z");
        let cards = vec![first.clone(), second];

        assert!(!is_descendant_of(&cards, first.id, outsider.id));
    }
}
