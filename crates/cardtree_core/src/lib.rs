//! Core engine for hierarchical card documents.
//!
//! Cards form a mutable hierarchy stored as one ordered array per tab;
//! every structural edit is a pure transformation that keeps the derived
//! links (children, siblings, depth) consistent. This crate is the single
//! source of truth for those invariants; rendering, persistence and
//! transport live with embedders.

pub mod identity;
pub mod logging;
pub mod model;
pub mod service;
pub mod tree;

pub use identity::{IdentityProvider, UuidIdentity};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::card::{Card, CardId, CardKind, CardStatus};
pub use model::clipboard::ClipboardNode;
pub use model::tab::{DisplayMode, Panel, PanelId, Tab, TabId};
pub use service::history::{HistoryError, HistoryRecorder, LogRecorder, VersionRecord};
pub use service::journal::{Journal, JournalEntry, OpTag, UNDO_CAPACITY};
pub use service::workspace::{CardPatch, OpenOutcome, RenameOutcome, Workspace};
pub use tree::links::{rebuild_links, subtree_end};
pub use tree::mutate::{InsertPosition, MergeOptions};
pub use tree::order::normalize_card_order;
pub use tree::selection::selection_roots;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
