//! Domain model for the card-tree workspace.
//!
//! # Responsibility
//! - Define canonical data structures used by the tree engine and the
//!   workspace service.
//! - Keep hierarchy knowledge in one card-centric shape; everything beyond
//!   `parent_id` plus array position is a rebuildable cache.
//!
//! # Invariants
//! - Every domain object is identified by a stable uuid-backed id.
//! - Clipboard content is identity-free by construction.

pub mod card;
pub mod clipboard;
pub mod tab;
