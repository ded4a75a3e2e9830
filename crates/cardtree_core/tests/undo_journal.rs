use cardtree_core::{CardKind, CardPatch, InsertPosition, Workspace, UNDO_CAPACITY};
use uuid::Uuid;

fn setup() -> (Workspace, Uuid) {
    let mut workspace = Workspace::new();
    let panel = workspace.add_panel();
    let tab = workspace.create_untitled(panel).unwrap();
    (workspace, tab)
}

#[test]
fn undo_restores_exact_prior_array_and_redo_replays() {
    let (mut workspace, tab) = setup();
    let card = workspace
        .insert_card(tab, None, InsertPosition::After, CardKind::Heading)
        .unwrap();
    let before_update = workspace.tab(tab).unwrap().cards.clone();

    assert!(workspace.update_card(
        tab,
        card,
        CardPatch {
            title: Some("revised".to_string()),
            ..CardPatch::default()
        },
    ));
    let after_update = workspace.tab(tab).unwrap().cards.clone();
    assert_ne!(before_update, after_update);

    assert!(workspace.undo(tab));
    assert_eq!(workspace.tab(tab).unwrap().cards, before_update);

    assert!(workspace.redo(tab));
    assert_eq!(workspace.tab(tab).unwrap().cards, after_update);
}

#[test]
fn empty_stacks_return_false() {
    let (mut workspace, tab) = setup();
    assert!(!workspace.undo(tab));
    assert!(!workspace.redo(tab));
}

#[test]
fn new_mutation_invalidates_redo() {
    let (mut workspace, tab) = setup();
    workspace
        .insert_card(tab, None, InsertPosition::After, CardKind::Paragraph)
        .unwrap();
    assert!(workspace.undo(tab));
    assert_eq!(workspace.journal_depths(tab), Some((0, 1)));

    workspace
        .insert_card(tab, None, InsertPosition::After, CardKind::Paragraph)
        .unwrap();
    assert_eq!(workspace.journal_depths(tab), Some((1, 0)));
    assert!(!workspace.redo(tab));
}

#[test]
fn undo_stack_is_capped_at_one_hundred() {
    let (mut workspace, tab) = setup();
    let card = workspace
        .insert_card(tab, None, InsertPosition::After, CardKind::Paragraph)
        .unwrap();

    for round in 0..(UNDO_CAPACITY + 20) {
        assert!(workspace.update_card(
            tab,
            card,
            CardPatch {
                body: Some(format!("revision {round}")),
                ..CardPatch::default()
            },
        ));
    }
    assert_eq!(
        workspace.journal_depths(tab).map(|(undo, _)| undo),
        Some(UNDO_CAPACITY)
    );

    let mut undone = 0;
    while workspace.undo(tab) {
        undone += 1;
    }
    assert_eq!(undone, UNDO_CAPACITY);
}

#[test]
fn trace_flag_updates_bypass_the_journal() {
    let (mut workspace, tab) = setup();
    let card = workspace
        .insert_card(tab, None, InsertPosition::After, CardKind::Test)
        .unwrap();
    let depths_before = workspace.journal_depths(tab);

    assert!(workspace.set_trace_flags(tab, &[(card, true, true)]));
    assert_eq!(workspace.journal_depths(tab), depths_before);

    let state = workspace.tab(tab).unwrap();
    let index = state.index_of(card).unwrap();
    assert!(state.cards[index].trace_up);
    assert!(state.cards[index].trace_down);

    // Undo rolls back the insert, not the trace flags: the flags belong to
    // an external subsystem and were never journaled.
    assert!(workspace.undo(tab));
    assert!(workspace.tab(tab).unwrap().cards.is_empty());
}

#[test]
fn trace_flag_update_with_only_unknown_ids_changes_nothing() {
    let (mut workspace, tab) = setup();
    workspace
        .insert_card(tab, None, InsertPosition::After, CardKind::Test)
        .unwrap();
    // Settle the dirty flag so the no-op below has to leave it alone.
    let reloaded = workspace.tab(tab).unwrap().cards.clone();
    let panel = workspace.tab(tab).unwrap().panel_id;
    let _ = workspace.rename_file(tab, "traced.cards");
    assert!(matches!(
        workspace.open_file(panel, "traced.cards", reloaded),
        cardtree_core::OpenOutcome::Activated(_)
    ));
    assert!(!workspace.tab(tab).unwrap().dirty);

    assert!(!workspace.set_trace_flags(tab, &[(Uuid::new_v4(), true, true)]));
    assert!(!workspace.set_trace_flags(tab, &[]));
    assert!(!workspace.tab(tab).unwrap().dirty);
}

#[test]
fn rejected_moves_and_merges_journal_nothing() {
    use cardtree_core::MergeOptions;

    let (mut workspace, tab) = setup();
    let root = workspace
        .insert_card(tab, None, InsertPosition::After, CardKind::Heading)
        .unwrap();
    let child = workspace
        .insert_card(tab, Some(root), InsertPosition::Child, CardKind::Bullet)
        .unwrap();
    let depths_before = workspace.journal_depths(tab);

    assert!(!workspace.move_cards(tab, &[root], child, InsertPosition::Child));
    assert!(workspace
        .merge_cards(tab, &[root, child], MergeOptions::default())
        .is_none());
    assert_eq!(workspace.journal_depths(tab), depths_before);
}

#[test]
fn undo_prunes_dangling_view_state() {
    let (mut workspace, tab) = setup();
    let first = workspace
        .insert_card(tab, None, InsertPosition::After, CardKind::Heading)
        .unwrap();
    let second = workspace
        .insert_card(tab, Some(first), InsertPosition::Child, CardKind::Bullet)
        .unwrap();
    assert!(workspace.set_editing(tab, Some(second)));

    // Undo removes `second`; no view state may keep pointing at it.
    assert!(workspace.undo(tab));
    let state = workspace.tab(tab).unwrap();
    assert!(state.cards.iter().all(|card| card.id != second));
    assert!(!state.selected.contains(&second));
    assert_eq!(state.editing_card, None);
}
