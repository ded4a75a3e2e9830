//! Selection and range model over one tab's document order.
//!
//! # Responsibility
//! - Maintain the ordered selection vector (last entry is the range pivot).
//! - Reduce a selection to its topmost roots before subtree operations.

use crate::model::card::{Card, CardId};
use crate::tree::links::{index_of, is_descendant_of};
use std::collections::HashSet;

/// Replaces the selection with a single card.
pub fn select_single(selected: &mut Vec<CardId>, id: CardId) {
    selected.clear();
    selected.push(id);
}

/// Adds the card to the selection, or removes it when already selected.
///
/// A newly toggled-on card becomes the last-selected pivot.
pub fn toggle_select(selected: &mut Vec<CardId>, id: CardId) {
    if let Some(position) = selected.iter().position(|selected_id| *selected_id == id) {
        selected.remove(position);
    } else {
        selected.push(id);
    }
}

/// Selects the contiguous index span between the last-selected card and
/// `target` in current document order.
///
/// Falls back to single select when nothing was selected or the previous
/// pivot no longer exists. The target always ends up as the new pivot.
/// Returns `false` when `target` is not in the array.
pub fn range_select(cards: &[Card], selected: &mut Vec<CardId>, target: CardId) -> bool {
    let Some(target_index) = index_of(cards, target) else {
        return false;
    };
    let pivot_index = selected
        .last()
        .and_then(|&pivot| index_of(cards, pivot));
    let Some(pivot_index) = pivot_index else {
        select_single(selected, target);
        return true;
    };

    let (low, high) = if pivot_index <= target_index {
        (pivot_index, target_index)
    } else {
        (target_index, pivot_index)
    };
    selected.clear();
    for card in &cards[low..=high] {
        if card.id != target {
            selected.push(card.id);
        }
    }
    selected.push(target);
    true
}

/// Drops every selected id whose ancestor is also selected, keeping only
/// topmost roots in document order.
///
/// Run before copy and move so a parent and its already-selected children
/// are never processed independently.
pub fn selection_roots(cards: &[Card], selected: &[CardId]) -> Vec<CardId> {
    let selected_set: HashSet<CardId> = selected.iter().copied().collect();
    cards
        .iter()
        .filter(|card| selected_set.contains(&card.id))
        .filter(|card| {
            !selected_set
                .iter()
                .any(|&other| other != card.id && is_descendant_of(cards, card.id, other))
        })
        .map(|card| card.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{range_select, selection_roots, select_single, toggle_select};
    use crate::model::card::{Card, CardKind};
    use crate::tree::links::rebuild_links;

    fn flat(count: usize) -> Vec<Card> {
        let mut cards: Vec<Card> = (0..count)
            .map(|index| Card::new(CardKind::Paragraph, format!("c{index}")))
            .collect();
        rebuild_links(&mut cards);
        cards
    }

    #[test]
    fn toggle_flips_membership_and_sets_pivot() {
        let cards = flat(3);
        let mut selected = Vec::new();
        toggle_select(&mut selected, cards[0].id);
        toggle_select(&mut selected, cards[2].id);
        assert_eq!(selected, vec![cards[0].id, cards[2].id]);

        toggle_select(&mut selected, cards[0].id);
        assert_eq!(selected, vec![cards[2].id]);
    }

    #[test]
    fn range_select_spans_between_pivot_and_target() {
        let cards = flat(4);
        let mut selected = Vec::new();
        select_single(&mut selected, cards[3].id);
        assert!(range_select(&cards, &mut selected, cards[1].id));

        // Span in document order, target moved to the pivot slot.
        assert_eq!(selected, vec![cards[2].id, cards[3].id, cards[1].id]);
    }

    #[test]
    fn range_select_without_pivot_is_single_select() {
        let cards = flat(2);
        let mut selected = Vec::new();
        assert!(range_select(&cards, &mut selected, cards[1].id));
        assert_eq!(selected, vec![cards[1].id]);
    }

    #[test]
    fn selection_roots_drop_selected_descendants() {
        // root > (a > a1), with root, a and a1 all selected.
        let mut root = Card::new(CardKind::Heading, "root");
        root.depth = 0;
        let mut a = Card::new(CardKind::Paragraph, "a");
        a.parent_id = Some(root.id);
        a.depth = 1;
        let mut a1 = Card::new(CardKind::Bullet, "a1");
        a1.parent_id = Some(a.id);
        a1.depth = 2;
        let mut cards = vec![root.clone(), a.clone(), a1.clone()];
        rebuild_links(&mut cards);

        let roots = selection_roots(&cards, &[a1.id, root.id, a.id]);
        assert_eq!(roots, vec![root.id]);

        let partial = selection_roots(&cards, &[a1.id, a.id]);
        assert_eq!(partial, vec![a.id]);
    }
}
