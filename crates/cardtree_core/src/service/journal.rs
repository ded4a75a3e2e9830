//! Snapshot-based undo/redo journal, one per tab.
//!
//! # Responsibility
//! - Capture a full pre-mutation copy of the tab's card array before every
//!   journaled operation.
//! - Serve undo/redo as wholesale array restores.
//!
//! # Invariants
//! - A new mutation invalidates the redo stack.
//! - The undo stack holds at most `UNDO_CAPACITY` snapshots; the oldest is
//!   dropped first.
//! - Trace-flag-only updates never reach the journal; that state is owned
//!   by an external relation subsystem and is not undoable here.

use crate::model::card::Card;
use crate::model::tab::TabId;

/// Maximum retained undo snapshots per tab.
pub const UNDO_CAPACITY: usize = 100;

/// Operation class recorded with each snapshot and version record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    Insert,
    Delete,
    Update,
    Move,
    Merge,
    Paste,
}

impl OpTag {
    /// Stable lowercase token used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Update => "update",
            Self::Move => "move",
            Self::Merge => "merge",
            Self::Paste => "paste",
        }
    }
}

/// One journal snapshot: the affected tab's entire card array as it was
/// immediately before the operation.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub tag: OpTag,
    pub tab_id: TabId,
    pub cards: Vec<Card>,
    pub description: String,
}

/// Per-tab undo/redo stacks.
#[derive(Debug, Default)]
pub struct Journal {
    undo: Vec<JournalEntry>,
    redo: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pre-mutation snapshot, invalidating any redo history.
    pub fn push(&mut self, entry: JournalEntry) {
        self.redo.clear();
        self.undo.push(entry);
        if self.undo.len() > UNDO_CAPACITY {
            self.undo.remove(0);
        }
    }

    /// Pops the latest snapshot, parking the current state on the redo
    /// stack. Returns `None` when there is nothing to undo.
    pub fn undo(&mut self, tab_id: TabId, current: &[Card]) -> Option<Vec<Card>> {
        let entry = self.undo.pop()?;
        self.redo.push(JournalEntry {
            tag: entry.tag,
            tab_id,
            cards: current.to_vec(),
            description: entry.description.clone(),
        });
        Some(entry.cards)
    }

    /// Mirror of `undo`. Returns `None` when there is nothing to redo.
    pub fn redo(&mut self, tab_id: TabId, current: &[Card]) -> Option<Vec<Card>> {
        let entry = self.redo.pop()?;
        self.undo.push(JournalEntry {
            tag: entry.tag,
            tab_id,
            cards: current.to_vec(),
            description: entry.description.clone(),
        });
        Some(entry.cards)
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}
