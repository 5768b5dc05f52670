//! The contract shared by every persisted entity kind.
//!
//! Stores and repositories are generic over [`Entity`]; the per-kind
//! modules ([`crate::company`], [`crate::member`], [`crate::project`])
//! supply identifier access, construction from a create DTO, patch
//! application, and the seed dataset used by the local backend.

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

/// The three entity kinds managed by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Company,
    Member,
    Project,
}

impl EntityKind {
    /// Singular label used in errors and log fields.
    pub fn label(self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Member => "Member",
            Self::Project => "Project",
        }
    }

    /// Remote table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Company => "companies",
            Self::Member => "members",
            Self::Project => "projects",
        }
    }

    /// Local durable slot name.
    pub fn slot(self) -> &'static str {
        match self {
            Self::Company => "copejem_companies",
            Self::Member => "copejem_members",
            Self::Project => "copejem_projects",
        }
    }
}

/// Values stamped onto a record at creation time by the repository.
#[derive(Debug, Clone, Copy)]
pub struct RecordStamp {
    pub id: EntityId,
    pub at: Timestamp,
    /// Member id of the acting session, if any.
    pub by: Option<EntityId>,
}

/// A persisted entity kind.
pub trait Entity:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Validate + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Input accepted by `create` (everything except id and timestamps).
    type Create: Validate + Send + Sync;

    /// Shallow partial update. Each populated field fully replaces the old value.
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> EntityId;

    /// Build a complete record from validated input and the creation stamp.
    fn from_create(input: Self::Create, stamp: RecordStamp) -> Self;

    /// Produce a new record with `patch` merged onto `self`.
    ///
    /// Timestamped kinds re-stamp `updated_at` with `now`.
    fn apply_patch(&self, patch: &Self::Patch, now: Timestamp) -> Self;

    /// Default dataset written to an empty local slot.
    fn seed(now: Timestamp) -> Vec<Self>;

    /// Rewrite a raw stored record from an older layout in place.
    fn upgrade_legacy(_record: &mut serde_json::Value) {}

    /// Check required fields on a complete record.
    fn validate_record(&self) -> Result<(), CoreError> {
        self.validate()?;
        Ok(())
    }
}

/// Entity kinds that expose a delete operation.
///
/// Companies are never deleted, so they do not implement this trait.
pub trait Deletable: Entity {
    /// Reject the delete before any mutation happens.
    fn deletion_guard(&self, _current_year: i32) -> Result<(), CoreError> {
        Ok(())
    }
}

/// `validator` custom rule: reject empty or whitespace-only text.
pub(crate) fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Merge helper: replace `current` when the patch carries a value.
pub(crate) fn merge<T: Clone>(current: &T, patch: &Option<T>) -> T {
    patch.as_ref().unwrap_or(current).clone()
}

/// Serde helper for nullable patch fields.
///
/// An absent key stays `None` (leave unchanged) while an explicit `null`
/// becomes `Some(None)` (clear the field).
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_and_tables_are_distinct_per_kind() {
        let kinds = [EntityKind::Company, EntityKind::Member, EntityKind::Project];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.slot(), b.slot());
                assert_ne!(a.table(), b.table());
            }
        }
    }

    #[test]
    fn not_blank_rejects_whitespace() {
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
        assert!(not_blank("Acme").is_ok());
    }

    #[test]
    fn merge_prefers_patch_value() {
        assert_eq!(merge(&1, &Some(2)), 2);
        assert_eq!(merge(&1, &None), 1);
    }
}
