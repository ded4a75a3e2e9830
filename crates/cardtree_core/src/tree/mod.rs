//! Pure tree engine over the ordered card array.
//!
//! # Responsibility
//! - Implement every structural algorithm (placement resolution, subtree
//!   delimitation, link rebuild, normalization, mutation, selection,
//!   clipboard transfer) as pure functions with no workspace state.
//!
//! # Invariants
//! - Subtree contiguity holds on exit from every function here.
//! - Rejected operations leave their input untouched.

pub mod clipboard;
pub mod links;
pub mod mutate;
pub mod order;
pub mod selection;
