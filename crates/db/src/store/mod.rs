//! Storage capability shared by the local and remote backends.
//!
//! Repositories depend only on [`EntityStore`]; which backend is active is
//! decided once, when the services are wired (see [`crate::Services`]).
//!
//! # Backends
//!
//! - [`LocalStore`]: JSON slots on disk, seeded on first read
//! - [`PgStore`]: PostgreSQL tables, one targeted statement per operation

use async_trait::async_trait;
use copejem_core::entity::Entity;
use copejem_core::member::Member;
use copejem_core::types::EntityId;

use crate::error::StoreResult;

pub mod local;
pub mod pg;
pub mod slots;

pub use local::LocalStore;
pub use pg::PgStore;
pub use slots::SlotStore;

/// Uniform persistence for one entity kind.
///
/// `list` returns the backend's natural order: insertion order for the
/// local backend, the collection-specific sort key for the remote one.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<E>>;

    async fn find_by_id(&self, id: EntityId) -> StoreResult<Option<E>>;

    /// Persist a fully built record and return it as stored.
    async fn insert(&self, record: E) -> StoreResult<E>;

    /// Overwrite the record with the same id. `None` when no such id exists.
    async fn replace(&self, record: E) -> StoreResult<Option<E>>;

    /// Remove by id. Returns `true` if a record was removed.
    async fn delete(&self, id: EntityId) -> StoreResult<bool>;
}

/// Credential lookup used by the authentication service.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// First member whose email or tax id equals `identifier` and whose
    /// stored secret equals `secret` exactly.
    async fn find_by_credentials(
        &self,
        identifier: &str,
        secret: &str,
    ) -> StoreResult<Option<Member>>;
}
