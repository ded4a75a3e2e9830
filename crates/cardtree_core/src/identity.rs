//! Identity generation seam.
//!
//! The engine never invents ids inline; every fresh identity flows through
//! this trait so tests and embedders can substitute deterministic sources.

use uuid::Uuid;

/// Produces globally unique opaque identities on demand.
pub trait IdentityProvider {
    fn next_id(&mut self) -> Uuid;
}

/// Default provider backed by random v4 uuids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdentity;

impl IdentityProvider for UuidIdentity {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}
