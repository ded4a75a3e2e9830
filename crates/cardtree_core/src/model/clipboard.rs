//! Detached clipboard subtree model.
//!
//! # Invariants
//! - A clipboard node carries content fields only: no identity, no parent
//!   pointer, no display code. Paste always mints fresh cards, so copying
//!   between tabs (or pasting twice) can never duplicate an id.

use crate::model::card::{CardKind, CardStatus};
use serde::{Deserialize, Serialize};

/// One node of an identity-free subtree captured by copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardNode {
    pub title: String,
    pub body: String,
    pub status: CardStatus,
    pub kind: CardKind,
    pub trace_up: bool,
    pub trace_down: bool,
    pub children: Vec<ClipboardNode>,
}

impl ClipboardNode {
    /// Number of nodes in this tree including itself.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ClipboardNode::node_count)
            .sum::<usize>()
    }
}
