//! Local durable backend: one slot per entity kind.
//!
//! Every operation reads the whole slot, edits it in memory, and writes it
//! back with [`SlotStore::replace_all`]. An uninitialized slot is seeded
//! with [`Entity::seed`] and the seed is persisted before it is returned,
//! so the first read of a seeded collection is never empty and a second
//! read returns the same records.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use copejem_core::entity::Entity;
use copejem_core::member::Member;
use copejem_core::types::EntityId;

use super::slots::SlotStore;
use super::{CredentialStore, EntityStore};
use crate::error::StoreResult;

/// [`EntityStore`] over a named slot of a [`SlotStore`].
pub struct LocalStore<E> {
    slots: SlotStore,
    _kind: PhantomData<fn() -> E>,
}

impl<E> Clone for LocalStore<E> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            _kind: PhantomData,
        }
    }
}

impl<E: Entity> LocalStore<E> {
    pub fn new(slots: SlotStore) -> Self {
        Self {
            slots,
            _kind: PhantomData,
        }
    }

    fn slot(&self) -> &'static str {
        E::KIND.slot()
    }

    /// Read the full collection, seeding the slot on first access.
    pub async fn list_records(&self) -> StoreResult<Vec<E>> {
        match self.slots.load(self.slot()).await? {
            Some(raw) => raw
                .into_iter()
                .map(|mut value| {
                    E::upgrade_legacy(&mut value);
                    serde_json::from_value(value).map_err(Into::into)
                })
                .collect(),
            None => {
                let seed = E::seed(Utc::now());
                self.replace_all(&seed).await?;
                tracing::debug!(
                    slot = self.slot(),
                    records = seed.len(),
                    "Seeded empty slot"
                );
                Ok(seed)
            }
        }
    }

    /// Overwrite the collection.
    pub async fn replace_all(&self, records: &[E]) -> StoreResult<()> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.slots.replace_all(self.slot(), &values).await
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for LocalStore<E> {
    async fn list(&self) -> StoreResult<Vec<E>> {
        self.list_records().await
    }

    async fn find_by_id(&self, id: EntityId) -> StoreResult<Option<E>> {
        Ok(self
            .list_records()
            .await?
            .into_iter()
            .find(|record| record.id() == id))
    }

    async fn insert(&self, record: E) -> StoreResult<E> {
        let mut records = self.list_records().await?;
        records.push(record.clone());
        self.replace_all(&records).await?;
        Ok(record)
    }

    async fn replace(&self, record: E) -> StoreResult<Option<E>> {
        let mut records = self.list_records().await?;
        let Some(slot) = records.iter_mut().find(|r| r.id() == record.id()) else {
            return Ok(None);
        };
        *slot = record.clone();
        self.replace_all(&records).await?;
        Ok(Some(record))
    }

    async fn delete(&self, id: EntityId) -> StoreResult<bool> {
        let mut records = self.list_records().await?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.replace_all(&records).await?;
        Ok(true)
    }
}

#[async_trait]
impl CredentialStore for LocalStore<Member> {
    async fn find_by_credentials(
        &self,
        identifier: &str,
        secret: &str,
    ) -> StoreResult<Option<Member>> {
        Ok(self
            .list_records()
            .await?
            .into_iter()
            .find(|m| m.answers_to(identifier) && m.secret_matches(secret)))
    }
}

#[cfg(test)]
mod tests {
    use copejem_core::company::{Company, SEED_COMPANY_ID};
    use copejem_core::member::MemberStatus;
    use serde_json::json;

    use super::*;

    fn store<E: Entity>(dir: &tempfile::TempDir) -> LocalStore<E> {
        LocalStore::new(SlotStore::new(dir.path()))
    }

    #[tokio::test]
    async fn first_read_seeds_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let companies = store::<Company>(&dir);

        let first = companies.list().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, SEED_COMPANY_ID);

        let slots = SlotStore::new(dir.path());
        assert!(slots.exists("copejem_companies").await.unwrap());

        let second = companies.list().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn replace_unknown_id_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let companies = store::<Company>(&dir);
        let mut ghost = companies.list().await.unwrap().remove(0);
        ghost.id = copejem_core::types::new_id();
        assert!(companies.replace(ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_id_leaves_slot_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let members = store::<Member>(&dir);
        let before = members.list().await.unwrap();
        assert!(!members.delete(copejem_core::types::new_id()).await.unwrap());
        assert_eq!(members.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn legacy_member_records_are_upgraded_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let slots = SlotStore::new(dir.path());
        let legacy = json!({
            "id": "00000000-0000-0000-0000-0000000000ff",
            "name": "Legacy Lu",
            "companyName": "",
            "role": "Member",
            "email": "lu@example.com",
            "active": true,
            "admissionYear": 2019
        });
        slots
            .replace_all("copejem_members", &[legacy])
            .await
            .unwrap();

        let members = store::<Member>(&dir).list().await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].status, MemberStatus::Active);
        assert!(members[0].password.is_none());
    }

    #[tokio::test]
    async fn credentials_match_email_or_tax_id() {
        let dir = tempfile::tempdir().unwrap();
        let members = store::<Member>(&dir);

        let by_email = members
            .find_by_credentials("email@makework.tech", "Teste@123")
            .await
            .unwrap();
        assert!(by_email.is_some());

        let by_cpf = members
            .find_by_credentials("000.000.000-00", "Teste@123")
            .await
            .unwrap();
        assert_eq!(by_cpf, by_email);

        let wrong = members
            .find_by_credentials("email@makework.tech", "teste@123")
            .await
            .unwrap();
        assert!(wrong.is_none());
    }
}
