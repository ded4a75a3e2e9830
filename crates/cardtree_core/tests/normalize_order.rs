use cardtree_core::{normalize_card_order, Card, CardKind, OpenOutcome, Workspace};
use uuid::Uuid;

fn shuffled_family() -> (Vec<Card>, Uuid, Uuid, Uuid) {
    let mut root = Card::new(CardKind::Heading, "root");
    let mut child = Card::new(CardKind::Paragraph, "child");
    let mut child2 = Card::new(CardKind::Paragraph, "child2");
    child.parent_id = Some(root.id);
    child2.parent_id = Some(root.id);
    root.child_ids = vec![child.id, child2.id];
    let (root_id, child_id, child2_id) = (root.id, child.id, child2.id);
    (vec![child2, root, child], root_id, child_id, child2_id)
}

#[test]
fn loaded_files_are_normalized_before_entering_the_engine() {
    let (cards, root_id, child_id, child2_id) = shuffled_family();

    let mut workspace = Workspace::new();
    let panel = workspace.add_panel();
    let outcome = workspace.open_file(panel, "family.cards", cards);
    let OpenOutcome::Opened(tab) = outcome else {
        panic!("expected opened, got {outcome:?}");
    };

    let normalized = &workspace.tab(tab).unwrap().cards;
    let ids: Vec<_> = normalized.iter().map(|card| card.id).collect();
    assert_eq!(ids, vec![root_id, child_id, child2_id]);
    let depths: Vec<_> = normalized.iter().map(|card| card.depth).collect();
    assert_eq!(depths, vec![0, 1, 1]);
    assert_eq!(normalized[0].child_ids, vec![child_id, child2_id]);
}

#[test]
fn normalization_is_idempotent() {
    let (cards, ..) = shuffled_family();
    let once = normalize_card_order(cards);
    let twice = normalize_card_order(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn corrupt_parent_links_never_drop_cards() {
    // One orphan pointing at a missing parent, plus a two-card parent cycle.
    let mut orphan = Card::new(CardKind::Paragraph, "orphan");
    orphan.parent_id = Some(Uuid::new_v4());
    let mut loop_a = Card::new(CardKind::Paragraph, "loop_a");
    let mut loop_b = Card::new(CardKind::Paragraph, "loop_b");
    loop_a.parent_id = Some(loop_b.id);
    loop_b.parent_id = Some(loop_a.id);
    let sound = Card::new(CardKind::Heading, "sound");

    let input = vec![orphan.clone(), loop_a.clone(), loop_b.clone(), sound.clone()];
    let ordered = normalize_card_order(input);

    assert_eq!(ordered.len(), 4);
    // The orphan and the cycle entry point become roots; nothing is lost
    // and no card keeps an unresolvable parent.
    for card in &ordered {
        if let Some(parent_id) = card.parent_id {
            assert!(ordered.iter().any(|other| other.id == parent_id));
        }
    }
    let orphan_out = ordered.iter().find(|card| card.id == orphan.id).unwrap();
    assert_eq!(orphan_out.parent_id, None);
}
