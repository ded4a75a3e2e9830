//! Workspace service: tab/panel registry and the public command surface.
//!
//! # Responsibility
//! - Own every piece of cross-tab state (panels, tabs, file bindings,
//!   journals, clipboard, pending history) behind one context object.
//! - Route each command through snapshot -> pure tree mutation -> publish,
//!   then notify the history recorder outside the transaction.
//!
//! # Invariants
//! - A file name binds to at most one panel at a time; the binding map
//!   changes in the same step as the tab create/remove touching it.
//! - Every operation validates fully before mutating; expected failures are
//!   outcome values, never errors or panics.
//! - Loaded card arrays pass through `normalize_card_order` before the
//!   engine trusts them.

use crate::identity::{IdentityProvider, UuidIdentity};
use crate::model::card::{Card, CardId, CardKind, CardStatus, now_epoch_ms};
use crate::model::clipboard::ClipboardNode;
use crate::model::tab::{DisplayMode, Panel, PanelId, Tab, TabId};
use crate::service::history::{HistoryRecorder, LogRecorder, VersionRecord};
use crate::service::journal::{Journal, JournalEntry, OpTag};
use crate::tree::clipboard::{copy_subtrees, materialize};
use crate::tree::links::rebuild_links;
use crate::tree::mutate::{
    delete_subtrees, insert_card, merge_cards, move_subtrees, resolve_insertion, root_insertion,
    InsertPosition, Insertion, MergeOptions,
};
use crate::tree::order::normalize_card_order;
use crate::tree::selection::{range_select, select_single, selection_roots, toggle_select};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;

/// Outcome of opening a file in a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new tab was created and bound.
    Opened(TabId),
    /// The file was already open in this panel; the existing tab was
    /// reactivated and refreshed.
    Activated(TabId),
    /// The open was refused; `panel_id` names the conflicting panel.
    Denied { panel_id: PanelId, reason: String },
}

/// Outcome of renaming a tab's backing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    /// The target name is bound elsewhere.
    Conflict { panel_id: PanelId, reason: String },
    /// The rename request itself was invalid.
    Rejected(String),
}

/// Partial content update for one card. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<CardStatus>,
    pub kind: Option<CardKind>,
}

impl CardPatch {
    fn is_noop(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.status.is_none() && self.kind.is_none()
    }
}

/// Owning context for every open panel and tab.
///
/// Single-threaded and synchronous: each command is one atomic transition
/// from a fully formed state to the next. Identity generation and history
/// recording are pluggable seams.
pub struct Workspace<I: IdentityProvider = UuidIdentity, H: HistoryRecorder = LogRecorder> {
    panels: BTreeMap<PanelId, Panel>,
    tabs: BTreeMap<TabId, Tab>,
    file_bindings: BTreeMap<String, PanelId>,
    journals: BTreeMap<TabId, Journal>,
    clipboard: Vec<ClipboardNode>,
    pending_history: BTreeMap<TabId, Vec<(CardId, VersionRecord)>>,
    identity: I,
    recorder: H,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_parts(UuidIdentity, LogRecorder)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: IdentityProvider, H: HistoryRecorder> Workspace<I, H> {
    /// Creates a workspace with custom identity and history seams.
    pub fn with_parts(identity: I, recorder: H) -> Self {
        Self {
            panels: BTreeMap::new(),
            tabs: BTreeMap::new(),
            file_bindings: BTreeMap::new(),
            journals: BTreeMap::new(),
            clipboard: Vec::new(),
            pending_history: BTreeMap::new(),
            identity,
            recorder,
        }
    }

    // ---- panels and tabs ----------------------------------------------

    /// Creates one empty panel.
    pub fn add_panel(&mut self) -> PanelId {
        let panel_id = self.identity.next_id();
        self.panels.insert(panel_id, Panel::new(panel_id));
        info!("event=panel_open module=workspace status=ok panel={panel_id}");
        panel_id
    }

    /// Closes a panel and every tab it hosts.
    pub fn close_panel(&mut self, panel_id: PanelId) -> bool {
        let Some(panel) = self.panels.get(&panel_id) else {
            return false;
        };
        for tab_id in panel.tab_ids.clone() {
            self.close_tab(tab_id);
        }
        self.panels.remove(&panel_id);
        info!("event=panel_close module=workspace status=ok panel={panel_id}");
        true
    }

    /// Opens a file in a panel, enforcing the one-file-one-panel rule.
    ///
    /// `cards` is the untrusted array from the external file service; it is
    /// normalized before entering the engine. Reactivating an already-open
    /// file refreshes its contents without touching undo history.
    pub fn open_file(&mut self, panel_id: PanelId, file_name: &str, cards: Vec<Card>) -> OpenOutcome {
        let name = file_name.trim().to_string();
        if name.is_empty() {
            return OpenOutcome::Denied {
                panel_id,
                reason: "file name must not be blank".to_string(),
            };
        }
        if !self.panels.contains_key(&panel_id) {
            error!("event=file_open module=workspace status=error panel={panel_id} reason=panel_missing");
            return OpenOutcome::Denied {
                panel_id,
                reason: format!("panel {panel_id} does not exist"),
            };
        }

        if let Some(&bound_panel) = self.file_bindings.get(&name) {
            if bound_panel != panel_id {
                info!(
                    "event=file_open module=workspace status=denied file={name} panel={panel_id} bound_panel={bound_panel}"
                );
                return OpenOutcome::Denied {
                    panel_id: bound_panel,
                    reason: format!("file `{name}` is already open in panel {bound_panel}"),
                };
            }

            let existing = self
                .tabs
                .values()
                .find(|tab| tab.panel_id == panel_id && tab.file_name.as_deref() == Some(&name))
                .map(|tab| tab.id);
            if let Some(tab_id) = existing {
                if let Some(tab) = self.tabs.get_mut(&tab_id) {
                    tab.refresh_contents(normalize_card_order(cards));
                }
                if let Some(panel) = self.panels.get_mut(&panel_id) {
                    panel.active_tab = Some(tab_id);
                }
                info!("event=file_open module=workspace status=activated file={name} tab={tab_id}");
                return OpenOutcome::Activated(tab_id);
            }
            // Binding without a live tab is an internal invariant breach;
            // heal by rebinding through the create path below.
            error!("event=file_open module=workspace status=error file={name} reason=stale_binding");
        }

        let tab_id = self.identity.next_id();
        let tab = Tab::new(tab_id, panel_id, Some(name.clone()), normalize_card_order(cards));
        self.tabs.insert(tab_id, tab);
        self.journals.insert(tab_id, Journal::new());
        if let Some(panel) = self.panels.get_mut(&panel_id) {
            panel.tab_ids.push(tab_id);
            panel.active_tab = Some(tab_id);
        }
        self.file_bindings.insert(name.clone(), panel_id);
        info!("event=file_open module=workspace status=opened file={name} tab={tab_id}");
        OpenOutcome::Opened(tab_id)
    }

    /// Creates an untitled tab. Never touches the binding map; the tab is
    /// dirty from birth.
    pub fn create_untitled(&mut self, panel_id: PanelId) -> Option<TabId> {
        if !self.panels.contains_key(&panel_id) {
            error!("event=tab_create module=workspace status=error panel={panel_id} reason=panel_missing");
            return None;
        }
        let tab_id = self.identity.next_id();
        self.tabs.insert(tab_id, Tab::new(tab_id, panel_id, None, Vec::new()));
        self.journals.insert(tab_id, Journal::new());
        if let Some(panel) = self.panels.get_mut(&panel_id) {
            panel.tab_ids.push(tab_id);
            panel.active_tab = Some(tab_id);
        }
        info!("event=tab_create module=workspace status=ok tab={tab_id} panel={panel_id}");
        Some(tab_id)
    }

    /// Closes a tab, releasing its binding and discarding its journal and
    /// any pending (not-yet-flushed) history.
    pub fn close_tab(&mut self, tab_id: TabId) -> bool {
        let Some(tab) = self.tabs.remove(&tab_id) else {
            return false;
        };
        if let Some(name) = &tab.file_name {
            if self.file_bindings.get(name) == Some(&tab.panel_id) {
                self.file_bindings.remove(name);
            }
        }
        self.journals.remove(&tab_id);
        self.pending_history.remove(&tab_id);
        if let Some(panel) = self.panels.get_mut(&tab.panel_id) {
            panel.remove_tab(tab_id);
        }
        info!("event=tab_close module=workspace status=ok tab={tab_id}");
        true
    }

    /// Renames a tab's backing file. Binding never reverts to unbound: an
    /// untitled tab becomes bound, a bound tab is rebound to the new name.
    /// The first bind flushes the tab's pending history in commit order.
    pub fn rename_file(&mut self, tab_id: TabId, file_name: &str) -> RenameOutcome {
        let name = file_name.trim();
        if name.is_empty() {
            return RenameOutcome::Rejected("file name must not be blank".to_string());
        }
        let Some((panel_id, old_name)) = self
            .tabs
            .get(&tab_id)
            .map(|tab| (tab.panel_id, tab.file_name.clone()))
        else {
            return RenameOutcome::Rejected(format!("tab {tab_id} does not exist"));
        };
        if old_name.as_deref() == Some(name) {
            return RenameOutcome::Renamed;
        }
        if let Some(&bound_panel) = self.file_bindings.get(name) {
            return RenameOutcome::Conflict {
                panel_id: bound_panel,
                reason: format!("file `{name}` is already open in panel {bound_panel}"),
            };
        }

        if let Some(old) = &old_name {
            if self.file_bindings.get(old) == Some(&panel_id) {
                self.file_bindings.remove(old);
            }
        }
        self.file_bindings.insert(name.to_string(), panel_id);
        if let Some(tab) = self.tabs.get_mut(&tab_id) {
            tab.file_name = Some(name.to_string());
        }

        if let Some(entries) = self.pending_history.remove(&tab_id) {
            for (card_id, record) in entries {
                if let Err(err) = self.recorder.record(name, card_id, &record) {
                    warn!(
                        "event=history_flush module=workspace status=error file={name} card={card_id} error={err}"
                    );
                }
            }
        }
        info!("event=file_rename module=workspace status=ok tab={tab_id} file={name}");
        RenameOutcome::Renamed
    }

    // ---- selection and view state --------------------------------------

    /// Replaces the tab's selection with one card.
    pub fn select(&mut self, tab_id: TabId, card_id: CardId) -> bool {
        let Some(tab) = self.tab_mut_checked(tab_id) else {
            return false;
        };
        if tab.index_of(card_id).is_none() {
            return false;
        }
        select_single(&mut tab.selected, card_id);
        true
    }

    /// Adds or removes one card from the multi-selection.
    pub fn toggle_select(&mut self, tab_id: TabId, card_id: CardId) -> bool {
        let Some(tab) = self.tab_mut_checked(tab_id) else {
            return false;
        };
        if tab.index_of(card_id).is_none() {
            return false;
        }
        toggle_select(&mut tab.selected, card_id);
        true
    }

    /// Selects the contiguous span between the last-selected card and the
    /// target in current document order.
    pub fn range_select(&mut self, tab_id: TabId, card_id: CardId) -> bool {
        let Some(tab) = self.tab_mut_checked(tab_id) else {
            return false;
        };
        range_select(&tab.cards, &mut tab.selected, card_id)
    }

    /// Moves the editing cursor; at most one card hosts it.
    pub fn set_editing(&mut self, tab_id: TabId, card_id: Option<CardId>) -> bool {
        let Some(tab) = self.tab_mut_checked(tab_id) else {
            return false;
        };
        if let Some(id) = card_id {
            if tab.index_of(id).is_none() {
                return false;
            }
        }
        tab.editing_card = card_id;
        true
    }

    pub fn set_display_mode(&mut self, tab_id: TabId, mode: DisplayMode) -> bool {
        let Some(tab) = self.tab_mut_checked(tab_id) else {
            return false;
        };
        tab.display_mode = mode;
        true
    }

    // ---- structural and content mutations ------------------------------

    /// Inserts a fresh card relative to an anchor.
    ///
    /// Anchor resolution order: explicit id, last-selected card, last card
    /// in the document; an empty tab inserts a root without an anchor. An
    /// explicit anchor that does not exist yields `None`.
    pub fn insert_card(
        &mut self,
        tab_id: TabId,
        anchor: Option<CardId>,
        position: InsertPosition,
        kind: CardKind,
    ) -> Option<CardId> {
        let (insertion, expand_parent) = {
            let tab = self.tab_checked(tab_id)?;
            let anchor_index = match anchor {
                Some(id) => Some(tab.index_of(id)?),
                None => tab
                    .selected
                    .last()
                    .and_then(|&id| tab.index_of(id))
                    .or_else(|| tab.cards.len().checked_sub(1)),
            };
            match anchor_index {
                Some(index) => {
                    let insertion = resolve_insertion(&tab.cards, index, position);
                    let expand = matches!(position, InsertPosition::Child)
                        .then(|| tab.cards[index].id);
                    (insertion, expand)
                }
                None => (root_insertion(&tab.cards), None),
            }
        };

        self.snapshot(tab_id, OpTag::Insert, "insert card");
        let card_id = self.identity.next_id();
        let record = {
            let tab = self.tabs.get_mut(&tab_id)?;
            let mut card = Card::with_id(card_id, kind, "");
            card.code = Some(tab.take_code());
            let record = version_record(OpTag::Insert, &card);
            insert_card(&mut tab.cards, card, insertion);
            if let Some(parent_id) = expand_parent {
                tab.expanded.insert(parent_id);
            }
            select_single(&mut tab.selected, card_id);
            tab.dirty_cards.insert(card_id);
            tab.dirty = true;
            record
        };
        self.emit_history(tab_id, card_id, record);
        debug!("event=card_insert module=workspace status=ok tab={tab_id} card={card_id}");
        Some(card_id)
    }

    /// Applies a partial content update to one card.
    pub fn update_card(&mut self, tab_id: TabId, card_id: CardId, patch: CardPatch) -> bool {
        {
            let Some(tab) = self.tab_checked(tab_id) else {
                return false;
            };
            if tab.index_of(card_id).is_none() || patch.is_noop() {
                return false;
            }
        }

        self.snapshot(tab_id, OpTag::Update, "update card");
        let record = {
            let Some(tab) = self.tabs.get_mut(&tab_id) else {
                return false;
            };
            let Some(index) = tab.index_of(card_id) else {
                return false;
            };
            let card = &mut tab.cards[index];
            if let Some(title) = patch.title {
                card.title = title;
            }
            if let Some(body) = patch.body {
                card.body = body;
            }
            if let Some(status) = patch.status {
                card.status = status;
            }
            if let Some(kind) = patch.kind {
                card.kind = kind;
            }
            card.touch();
            let record = version_record(OpTag::Update, card);
            tab.dirty_cards.insert(card_id);
            tab.dirty = true;
            record
        };
        self.emit_history(tab_id, card_id, record);
        debug!("event=card_update module=workspace status=ok tab={tab_id} card={card_id}");
        true
    }

    /// Advances one card's status along the cyclic progression.
    pub fn cycle_status(&mut self, tab_id: TabId, card_id: CardId) -> Option<CardStatus> {
        let current = {
            let tab = self.tab_checked(tab_id)?;
            let index = tab.index_of(card_id)?;
            tab.cards[index].status
        };
        let advanced = current.next();
        if self.update_card(
            tab_id,
            card_id,
            CardPatch {
                status: Some(advanced),
                ..CardPatch::default()
            },
        ) {
            Some(advanced)
        } else {
            None
        }
    }

    /// Deletes the given cards (or the current selection) together with
    /// their whole subtrees. The card sliding into the lowest vacated index
    /// becomes the new selection, when one remains.
    pub fn delete_cards(&mut self, tab_id: TabId, targets: Option<&[CardId]>) -> bool {
        let targets: Vec<CardId> = {
            let Some(tab) = self.tab_checked(tab_id) else {
                return false;
            };
            let candidates: Vec<CardId> = match targets {
                Some(ids) => ids.to_vec(),
                None => tab.selected.clone(),
            };
            let resolved: Vec<CardId> = candidates
                .into_iter()
                .filter(|&id| tab.index_of(id).is_some())
                .collect();
            if resolved.is_empty() {
                return false;
            }
            resolved
        };

        self.snapshot(tab_id, OpTag::Delete, "delete cards");
        let Some(tab) = self.tabs.get_mut(&tab_id) else {
            return false;
        };
        let Some(deleted) = delete_subtrees(&mut tab.cards, &targets) else {
            return false;
        };
        tab.selected.clear();
        if !tab.cards.is_empty() {
            let fallback = deleted.min_index.min(tab.cards.len() - 1);
            select_single(&mut tab.selected, tab.cards[fallback].id);
        }
        for id in &deleted.removed_ids {
            tab.expanded.remove(id);
            tab.dirty_cards.remove(id);
            if tab.editing_card == Some(*id) {
                tab.editing_card = None;
            }
        }
        tab.dirty = true;
        debug!(
            "event=card_delete module=workspace status=ok tab={tab_id} removed={}",
            deleted.removed_ids.len()
        );
        true
    }

    /// Moves the subtrees rooted at `ids` next to `anchor`. Returns `false`
    /// (tree untouched, nothing journaled) on self-target or cycle.
    pub fn move_cards(
        &mut self,
        tab_id: TabId,
        ids: &[CardId],
        anchor: CardId,
        position: InsertPosition,
    ) -> bool {
        let prior = {
            let Some(tab) = self.tabs.get_mut(&tab_id) else {
                error!("event=card_move module=workspace status=error tab={tab_id} reason=tab_missing");
                return false;
            };
            let prior = tab.cards.clone();
            if !move_subtrees(&mut tab.cards, ids, anchor, position) {
                return false;
            }
            if matches!(position, InsertPosition::Child) {
                tab.expanded.insert(anchor);
            }
            tab.dirty = true;
            prior
        };
        self.journals.entry(tab_id).or_default().push(JournalEntry {
            tag: OpTag::Move,
            tab_id,
            cards: prior,
            description: "move cards".to_string(),
        });
        debug!("event=card_move module=workspace status=ok tab={tab_id} moved={}", ids.len());
        true
    }

    /// Merges contiguous childless same-depth siblings into one card, which
    /// becomes the selection. Returns `None` (nothing journaled) when the
    /// merge preconditions fail.
    pub fn merge_cards(
        &mut self,
        tab_id: TabId,
        ids: &[CardId],
        options: MergeOptions,
    ) -> Option<CardId> {
        let merged_id = self.identity.next_id();
        let (prior, record) = {
            let tab = self.tabs.get_mut(&tab_id)?;
            let prior = tab.cards.clone();
            let code = tab.next_code;
            let merged = merge_cards(&mut tab.cards, ids, merged_id, Some(code), options)?;
            tab.next_code += 1;
            select_single(&mut tab.selected, merged.id);
            if !options.retain_originals {
                for id in ids {
                    tab.expanded.remove(id);
                    tab.dirty_cards.remove(id);
                    if tab.editing_card == Some(*id) {
                        tab.editing_card = None;
                    }
                }
            }
            tab.dirty_cards.insert(merged.id);
            tab.dirty = true;
            (prior, version_record(OpTag::Merge, &merged))
        };
        self.journals.entry(tab_id).or_default().push(JournalEntry {
            tag: OpTag::Merge,
            tab_id,
            cards: prior,
            description: "merge cards".to_string(),
        });
        self.emit_history(tab_id, merged_id, record);
        debug!("event=card_merge module=workspace status=ok tab={tab_id} card={merged_id}");
        Some(merged_id)
    }

    // ---- clipboard ------------------------------------------------------

    /// Copies the selection roots into the shared clipboard payload.
    /// Returns `false` when nothing is selected.
    pub fn copy(&mut self, tab_id: TabId) -> bool {
        let payload = {
            let Some(tab) = self.tab_checked(tab_id) else {
                return false;
            };
            let roots = selection_roots(&tab.cards, &tab.selected);
            if roots.is_empty() {
                return false;
            }
            copy_subtrees(&tab.cards, &roots)
        };
        debug!(
            "event=clipboard_copy module=workspace status=ok tab={tab_id} trees={}",
            payload.len()
        );
        self.clipboard = payload;
        true
    }

    /// Materializes the clipboard at the anchor with fresh identities.
    ///
    /// All pasted roots share one computed parent/depth; new cards are
    /// numbered sequentially in paste order and the new roots become the
    /// selection. Returns `None` when the clipboard is empty or the anchor
    /// cannot be resolved.
    pub fn paste(
        &mut self,
        tab_id: TabId,
        anchor: Option<CardId>,
        position: InsertPosition,
    ) -> Option<Vec<CardId>> {
        if self.clipboard.is_empty() {
            return None;
        }
        let (insertion, expand_parent) = {
            let tab = self.tab_checked(tab_id)?;
            let anchor_index = match anchor {
                Some(id) => Some(tab.index_of(id)?),
                None => tab
                    .selected
                    .last()
                    .and_then(|&id| tab.index_of(id))
                    .or_else(|| tab.cards.len().checked_sub(1)),
            };
            match anchor_index {
                Some(index) => {
                    let insertion = resolve_insertion(&tab.cards, index, position);
                    let expand = matches!(position, InsertPosition::Child)
                        .then(|| tab.cards[index].id);
                    (insertion, expand)
                }
                None => (root_insertion(&tab.cards), None),
            }
        };

        let minted = materialize(
            &self.clipboard,
            insertion.parent_id,
            insertion.depth,
            &mut self.identity,
        );
        self.snapshot(tab_id, OpTag::Paste, "paste cards");

        let root_records = {
            let tab = self.tabs.get_mut(&tab_id)?;
            let mut cards = minted.cards;
            for card in &mut cards {
                card.code = Some(tab.take_code());
                tab.dirty_cards.insert(card.id);
            }
            let root_records: Vec<(CardId, VersionRecord)> = cards
                .iter()
                .filter(|card| minted.root_ids.contains(&card.id))
                .map(|card| (card.id, version_record(OpTag::Paste, card)))
                .collect();
            splice_at(&mut tab.cards, insertion, cards);
            tab.selected = minted.root_ids.clone();
            if let Some(parent_id) = expand_parent {
                tab.expanded.insert(parent_id);
            }
            tab.dirty = true;
            root_records
        };
        for (card_id, record) in root_records {
            self.emit_history(tab_id, card_id, record);
        }
        debug!(
            "event=clipboard_paste module=workspace status=ok tab={tab_id} roots={}",
            minted.root_ids.len()
        );
        Some(minted.root_ids)
    }

    // ---- journal --------------------------------------------------------

    /// Restores the previous snapshot. Returns `false` on an empty stack.
    pub fn undo(&mut self, tab_id: TabId) -> bool {
        let Some(tab) = self.tabs.get_mut(&tab_id) else {
            return false;
        };
        let Some(journal) = self.journals.get_mut(&tab_id) else {
            return false;
        };
        let Some(restored) = journal.undo(tab_id, &tab.cards) else {
            return false;
        };
        tab.cards = restored;
        tab.prune_view_state();
        tab.dirty = true;
        debug!("event=undo module=workspace status=ok tab={tab_id}");
        true
    }

    /// Mirror of `undo`. Returns `false` on an empty stack.
    pub fn redo(&mut self, tab_id: TabId) -> bool {
        let Some(tab) = self.tabs.get_mut(&tab_id) else {
            return false;
        };
        let Some(journal) = self.journals.get_mut(&tab_id) else {
            return false;
        };
        let Some(restored) = journal.redo(tab_id, &tab.cards) else {
            return false;
        };
        tab.cards = restored;
        tab.prune_view_state();
        tab.dirty = true;
        debug!("event=redo module=workspace status=ok tab={tab_id}");
        true
    }

    // ---- trace flags ----------------------------------------------------

    /// Bulk trace-flag update driven by the external relation subsystem.
    ///
    /// Bypasses the journal entirely: the flags are owned elsewhere, so
    /// they are not undoable here. Unknown card ids are skipped.
    pub fn set_trace_flags(&mut self, tab_id: TabId, updates: &[(CardId, bool, bool)]) -> bool {
        let Some(tab) = self.tab_mut_checked(tab_id) else {
            return false;
        };
        let mut touched = 0usize;
        for &(card_id, trace_up, trace_down) in updates {
            if let Some(index) = tab.index_of(card_id) {
                tab.cards[index].trace_up = trace_up;
                tab.cards[index].trace_down = trace_down;
                touched += 1;
            }
        }
        if touched == 0 {
            return false;
        }
        tab.dirty = true;
        debug!("event=trace_update module=workspace status=ok tab={tab_id} cards={touched}");
        true
    }

    // ---- read accessors -------------------------------------------------

    pub fn tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs.get(&tab_id)
    }

    pub fn panel(&self, panel_id: PanelId) -> Option<&Panel> {
        self.panels.get(&panel_id)
    }

    /// Panel currently bound to a file name, if any.
    pub fn panel_for_file(&self, file_name: &str) -> Option<PanelId> {
        self.file_bindings.get(file_name.trim()).copied()
    }

    pub fn has_clipboard(&self) -> bool {
        !self.clipboard.is_empty()
    }

    /// Undo/redo stack depths for one tab, mainly for diagnostics.
    pub fn journal_depths(&self, tab_id: TabId) -> Option<(usize, usize)> {
        self.journals
            .get(&tab_id)
            .map(|journal| (journal.undo_len(), journal.redo_len()))
    }

    // ---- internals ------------------------------------------------------

    fn tab_checked(&self, tab_id: TabId) -> Option<&Tab> {
        let tab = self.tabs.get(&tab_id);
        if tab.is_none() {
            error!("event=command module=workspace status=error tab={tab_id} reason=tab_missing");
        }
        tab
    }

    fn tab_mut_checked(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        if !self.tabs.contains_key(&tab_id) {
            error!("event=command module=workspace status=error tab={tab_id} reason=tab_missing");
            return None;
        }
        self.tabs.get_mut(&tab_id)
    }

    /// Pushes a full pre-mutation snapshot into the tab's journal.
    fn snapshot(&mut self, tab_id: TabId, tag: OpTag, description: &str) {
        let Some(cards) = self.tabs.get(&tab_id).map(|tab| tab.cards.clone()) else {
            return;
        };
        self.journals.entry(tab_id).or_default().push(JournalEntry {
            tag,
            tab_id,
            cards,
            description: description.to_string(),
        });
    }

    /// Hands one committed version record to the recorder, or parks it in
    /// the per-tab queue while the tab is still untitled.
    fn emit_history(&mut self, tab_id: TabId, card_id: CardId, record: VersionRecord) {
        let file_name = self.tabs.get(&tab_id).and_then(|tab| tab.file_name.clone());
        match file_name {
            Some(name) => {
                if let Err(err) = self.recorder.record(&name, card_id, &record) {
                    warn!(
                        "event=history_record module=workspace status=error file={name} card={card_id} error={err}"
                    );
                }
            }
            None => {
                self.pending_history
                    .entry(tab_id)
                    .or_default()
                    .push((card_id, record));
            }
        }
    }
}

fn version_record(tag: OpTag, card: &Card) -> VersionRecord {
    VersionRecord {
        tag,
        title: card.title.clone(),
        body: card.body.clone(),
        status: card.status,
        recorded_at_ms: now_epoch_ms(),
    }
}

fn splice_at(cards: &mut Vec<Card>, insertion: Insertion, minted: Vec<Card>) {
    let at = insertion.index.min(cards.len());
    cards.splice(at..at, minted);
    rebuild_links(cards);
}
