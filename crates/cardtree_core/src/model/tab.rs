//! Tab and panel session models.
//!
//! # Responsibility
//! - Represent one open file per tab and one tab set per panel.
//! - Keep per-tab view state (selection, expansion, editing cursor) next to
//!   the ordered card array it refers to.
//!
//! # Invariants
//! - `cards` array order is the ground truth for sibling sequence and
//!   subtree placement; `parent_id` alone never defines order.
//! - A tab without `file_name` is untitled and always dirty.
//! - `selected` keeps insertion order; its last entry is the range-select
//!   pivot ("last selected").

use crate::model::card::{Card, CardId};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier of one open tab.
pub type TabId = Uuid;

/// Stable identifier of one panel hosting a tab set.
pub type PanelId = Uuid;

/// Rendering mode requested for a tab. Rendering itself is out of scope;
/// the engine only stores the choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Outline,
    Document,
}

/// One open editing session bound to at most one source file.
#[derive(Debug, Clone)]
pub struct Tab {
    pub id: TabId,
    pub panel_id: PanelId,
    /// `None` means untitled/unsaved.
    pub file_name: Option<String>,
    /// Document order. Ground truth for the whole hierarchy.
    pub cards: Vec<Card>,
    /// Selected card ids in selection order.
    pub selected: Vec<CardId>,
    /// Cards with unsaved content edits.
    pub dirty_cards: BTreeSet<CardId>,
    /// Cards whose children are shown expanded.
    pub expanded: BTreeSet<CardId>,
    /// At most one card hosts the editing cursor.
    pub editing_card: Option<CardId>,
    pub dirty: bool,
    pub display_mode: DisplayMode,
    /// Next sequential display code handed to a freshly created card.
    pub next_code: u32,
}

impl Tab {
    /// Creates a tab owning an already-normalized card array.
    ///
    /// The display-code counter resumes after the highest code present in
    /// the loaded document so new cards never collide with stored ones.
    pub fn new(id: TabId, panel_id: PanelId, file_name: Option<String>, cards: Vec<Card>) -> Self {
        let next_code = cards
            .iter()
            .filter_map(|card| card.code)
            .max()
            .map_or(1, |max| max + 1);
        let dirty = file_name.is_none();
        Self {
            id,
            panel_id,
            file_name,
            cards,
            selected: Vec::new(),
            dirty_cards: BTreeSet::new(),
            expanded: BTreeSet::new(),
            editing_card: None,
            dirty,
            display_mode: DisplayMode::default(),
            next_code,
        }
    }

    /// Replaces the card array with freshly loaded contents.
    ///
    /// The display-code counter resumes past the highest loaded code, the
    /// same rule as on first open, so it never re-mints a stored code after
    /// a refresh. Per-card edit marks are dropped and the tab is clean
    /// afterwards; the undo journal is the caller's concern.
    pub fn refresh_contents(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        if let Some(max) = self.cards.iter().filter_map(|card| card.code).max() {
            self.next_code = self.next_code.max(max + 1);
        }
        self.dirty_cards.clear();
        self.prune_view_state();
        self.dirty = false;
    }

    /// Hands out the next sequential display code.
    pub fn take_code(&mut self) -> u32 {
        let code = self.next_code;
        self.next_code += 1;
        code
    }

    /// Drops view-state references to cards that no longer exist.
    ///
    /// Called after wholesale card-array replacement (undo/redo, reload) so
    /// selection, expansion and the editing cursor never dangle.
    pub fn prune_view_state(&mut self) {
        let live: BTreeSet<CardId> = self.cards.iter().map(|card| card.id).collect();
        self.selected.retain(|id| live.contains(id));
        self.dirty_cards.retain(|id| live.contains(id));
        self.expanded.retain(|id| live.contains(id));
        if let Some(editing) = self.editing_card {
            if !live.contains(&editing) {
                self.editing_card = None;
            }
        }
    }

    /// Returns the index of a card in document order.
    pub fn index_of(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|card| card.id == id)
    }
}

/// One region hosting an ordered tab set.
#[derive(Debug, Clone)]
pub struct Panel {
    pub id: PanelId,
    pub tab_ids: Vec<TabId>,
    pub active_tab: Option<TabId>,
}

impl Panel {
    pub fn new(id: PanelId) -> Self {
        Self {
            id,
            tab_ids: Vec::new(),
            active_tab: None,
        }
    }

    /// Removes one tab and repairs the active-tab pointer.
    ///
    /// The tab after the removed one becomes active, falling back to the
    /// last remaining tab, then to none.
    pub fn remove_tab(&mut self, tab_id: TabId) {
        let Some(position) = self.tab_ids.iter().position(|id| *id == tab_id) else {
            return;
        };
        self.tab_ids.remove(position);
        if self.active_tab == Some(tab_id) {
            self.active_tab = self
                .tab_ids
                .get(position)
                .or_else(|| self.tab_ids.last())
                .copied();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Panel, Tab};
    use crate::model::card::{Card, CardKind};
    use uuid::Uuid;

    #[test]
    fn untitled_tab_is_dirty_from_birth() {
        let tab = Tab::new(Uuid::new_v4(), Uuid::new_v4(), None, Vec::new());
        assert!(tab.dirty);
        assert_eq!(tab.next_code, 1);
    }

    #[test]
    fn code_counter_resumes_after_loaded_codes() {
        let mut card = Card::new(CardKind::Heading, "H");
        card.code = Some(41);
        let mut tab = Tab::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some("doc.cards".to_string()),
            vec![card],
        );
        assert!(!tab.dirty);
        assert_eq!(tab.take_code(), 42);
        assert_eq!(tab.take_code(), 43);
    }

    #[test]
    fn refresh_resumes_codes_and_drops_edit_marks() {
        let mut card = Card::new(CardKind::Heading, "H");
        card.code = Some(7);
        let mut tab = Tab::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some("doc.cards".to_string()),
            vec![card.clone()],
        );
        tab.dirty_cards.insert(card.id);
        tab.dirty = true;

        let mut reloaded = card.clone();
        reloaded.code = Some(50);
        tab.refresh_contents(vec![reloaded]);
        assert_eq!(tab.take_code(), 51);
        assert!(tab.dirty_cards.is_empty());
        assert!(!tab.dirty);

        // A reload with lower codes never rewinds the counter.
        let mut older = card.clone();
        older.code = Some(3);
        tab.refresh_contents(vec![older]);
        assert_eq!(tab.take_code(), 52);
    }

    #[test]
    fn removing_active_tab_activates_successor() {
        let mut panel = Panel::new(Uuid::new_v4());
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        panel.tab_ids = vec![first, second];
        panel.active_tab = Some(first);

        panel.remove_tab(first);
        assert_eq!(panel.active_tab, Some(second));

        panel.remove_tab(second);
        assert_eq!(panel.active_tab, None);
    }
}
