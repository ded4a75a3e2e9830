//! Stateful services layered over the pure tree engine.
//!
//! # Responsibility
//! - Orchestrate tree mutations into atomic, journaled workspace commands.
//! - Keep external collaborators (identity, history) behind trait seams.

pub mod history;
pub mod journal;
pub mod workspace;
