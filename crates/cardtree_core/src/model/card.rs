//! Card domain model.
//!
//! # Responsibility
//! - Define the canonical content unit stored in a tab's document order.
//! - Provide lifecycle helpers for status progression and timestamps.
//!
//! # Invariants
//! - `id` is stable and never reused for another card.
//! - `parent_id` is the only independently true hierarchy pointer;
//!   `child_ids`, `prev_id`, `next_id` and `depth` are denormalized caches
//!   recomputed by `tree::links::rebuild_links` and never edited directly.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for every card inside the engine.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type CardId = Uuid;

/// Structural role of one card within the document hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// Section heading, usually a subtree root.
    Heading,
    /// Free-form prose paragraph.
    Paragraph,
    /// List bullet.
    Bullet,
    /// Figure placeholder with caption text.
    Figure,
    /// Tabular content.
    Table,
    /// Test description card.
    Test,
    /// Question/answer card.
    Qa,
}

/// Review lifecycle state, advanced cyclically by the status command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Draft,
    Review,
    Approved,
    Deprecated,
}

impl CardStatus {
    /// Returns the next status in the cyclic progression
    /// draft -> review -> approved -> deprecated -> draft.
    pub fn next(self) -> Self {
        match self {
            Self::Draft => Self::Review,
            Self::Review => Self::Approved,
            Self::Approved => Self::Deprecated,
            Self::Deprecated => Self::Draft,
        }
    }
}

/// Canonical content unit held in a tab's ordered card array.
///
/// The ordered array owning these records is the authoritative persisted
/// document form; external storage details stay outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Stable global ID used for selection, linking and history records.
    pub id: CardId,
    /// User-facing sequential display code, assigned per tab on creation.
    pub code: Option<u32>,
    pub title: String,
    pub body: String,
    pub status: CardStatus,
    pub kind: CardKind,
    /// Upstream trace flag. Owned by an external relation subsystem; the
    /// engine only stores and forwards it.
    pub trace_up: bool,
    /// Downstream trace flag, same ownership rule as `trace_up`.
    pub trace_down: bool,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
    /// Unix epoch milliseconds, bumped on every content mutation.
    pub updated_at_ms: i64,
    /// Parent card, `None` for roots. Ground truth for hierarchy together
    /// with array position.
    pub parent_id: Option<CardId>,
    /// Derived cache: direct children in document order.
    pub child_ids: Vec<CardId>,
    /// Derived cache: previous sibling under the same parent.
    pub prev_id: Option<CardId>,
    /// Derived cache: next sibling under the same parent.
    pub next_id: Option<CardId>,
    /// Derived cache: 0 for roots, parent depth + 1 otherwise.
    pub depth: u32,
}

impl Card {
    /// Creates a new card with a generated stable ID.
    pub fn new(kind: CardKind, title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), kind, title)
    }

    /// Creates a new card with a caller-provided stable ID.
    ///
    /// Used by the workspace service, which routes identity generation
    /// through its `IdentityProvider` seam.
    pub fn with_id(id: CardId, kind: CardKind, title: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id,
            code: None,
            title: title.into(),
            body: String::new(),
            status: CardStatus::Draft,
            kind,
            trace_up: false,
            trace_down: false,
            created_at_ms: now,
            updated_at_ms: now,
            parent_id: None,
            child_ids: Vec::new(),
            prev_id: None,
            next_id: None,
            depth: 0,
        }
    }

    /// Marks this card as mutated now.
    pub fn touch(&mut self) {
        self.updated_at_ms = now_epoch_ms();
    }
}

/// Current wall clock as Unix epoch milliseconds.
///
/// Falls back to 0 when the system clock reports a pre-epoch time instead of
/// propagating an error through every mutation path.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
