//! Generic CRUD repository.
//!
//! One [`Repository`] per entity kind, layered over an [`EntityStore`]. It
//! adds identifier generation, timestamping, required-field validation,
//! shallow-merge updates, and the deletion guard. It does not check who is
//! acting; authorization belongs to the services in [`crate::services`].

use std::sync::Arc;

use chrono::Utc;
use copejem_core::entity::{Deletable, Entity, RecordStamp};
use copejem_core::error::CoreError;
use copejem_core::history;
use copejem_core::types::{new_id, EntityId};
use validator::Validate;

use crate::error::StoreResult;
use crate::store::EntityStore;

/// CRUD operations for entity kind `E`.
pub struct Repository<E: Entity> {
    store: Arc<dyn EntityStore<E>>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(store: Arc<dyn EntityStore<E>>) -> Self {
        Self { store }
    }

    fn not_found(id: EntityId) -> CoreError {
        CoreError::NotFound {
            entity: E::KIND.label(),
            id,
        }
    }

    /// Full ordered snapshot of the collection.
    pub async fn get_all(&self) -> StoreResult<Vec<E>> {
        self.store.list().await
    }

    /// Single record, or `None` when the id is unknown.
    pub async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<E>> {
        self.store.find_by_id(id).await
    }

    /// Validate `input`, assign a fresh id and timestamps, and persist.
    ///
    /// `actor` is recorded as the creator on kinds that track one.
    pub async fn create(&self, input: E::Create, actor: Option<EntityId>) -> StoreResult<E> {
        input.validate().map_err(CoreError::from)?;
        let stamp = RecordStamp {
            id: new_id(),
            at: Utc::now(),
            by: actor,
        };
        let record = E::from_create(input, stamp);
        record.validate_record()?;

        let created = self.store.insert(record).await?;
        tracing::info!(entity = E::KIND.label(), id = %created.id(), "Record created");
        Ok(created)
    }

    /// Merge `patch` onto the stored record and persist the result.
    ///
    /// Fails with `NotFound` when `id` does not exist, on every backend.
    pub async fn update(&self, id: EntityId, patch: &E::Patch) -> StoreResult<E> {
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        let next = current.apply_patch(patch, Utc::now());
        next.validate_record()?;

        let updated = self
            .store
            .replace(next)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        tracing::debug!(entity = E::KIND.label(), id = %id, "Record updated");
        Ok(updated)
    }
}

impl<E: Deletable> Repository<E> {
    /// Remove a record after its deletion guard passes.
    ///
    /// A guard failure aborts before any write, leaving the collection as it was.
    pub async fn delete(&self, id: EntityId) -> StoreResult<()> {
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        current.deletion_guard(history::current_year())?;

        if !self.store.delete(id).await? {
            return Err(Self::not_found(id).into());
        }
        tracing::info!(entity = E::KIND.label(), id = %id, "Record deleted");
        Ok(())
    }
}
