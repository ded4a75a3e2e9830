//! History recorder seam for per-card version records.
//!
//! # Responsibility
//! - Define the contract consumed by the workspace to hand committed
//!   version records to an external append-only store.
//!
//! # Invariants
//! - Recording happens strictly after the in-memory transaction commits;
//!   a recorder failure is logged and never rolled back or retried.
//! - Records for untitled tabs are queued by the workspace and flushed in
//!   commit order once the tab gets a file name.

use crate::model::card::{CardId, CardStatus};
use crate::service::journal::OpTag;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One committed content version of one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub tag: OpTag,
    pub title: String,
    pub body: String,
    pub status: CardStatus,
    pub recorded_at_ms: i64,
}

/// Errors surfaced by history recorder implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The backing store rejected or could not take the record.
    Unavailable(String),
}

impl Display for HistoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "history store unavailable: {reason}"),
        }
    }
}

impl Error for HistoryError {}

/// External collaborator storing append-only per-card version history.
pub trait HistoryRecorder {
    fn record(
        &self,
        file_name: &str,
        card_id: CardId,
        record: &VersionRecord,
    ) -> Result<(), HistoryError>;
}

/// Default recorder that only emits a log event.
///
/// Embedders wire a real persistence-backed recorder; the engine works the
/// same either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRecorder;

impl HistoryRecorder for LogRecorder {
    fn record(
        &self,
        file_name: &str,
        card_id: CardId,
        record: &VersionRecord,
    ) -> Result<(), HistoryError> {
        info!(
            "event=history_record module=history status=ok file={file_name} card={card_id} op={}",
            record.tag.as_str()
        );
        Ok(())
    }
}
