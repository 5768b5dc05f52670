//! Durable named slots, one JSON file per slot.
//!
//! A slot holds an ordered JSON array of records. Writes go to a temporary
//! file that is renamed over the slot, so a reader never sees a partial
//! array.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreResult;

/// Directory-backed key-value store of JSON arrays.
#[derive(Debug, Clone)]
pub struct SlotStore {
    root: PathBuf,
}

impl SlotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.root.join(format!("{slot}.json"))
    }

    /// Read a slot. `None` when it was never initialized.
    pub async fn load(&self, slot: &str) -> StoreResult<Option<Vec<serde_json::Value>>> {
        let bytes = match tokio::fs::read(self.slot_path(slot)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let records: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;
        Ok(Some(records))
    }

    /// Replace the whole content of a slot.
    pub async fn replace_all(&self, slot: &str, records: &[serde_json::Value]) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let bytes = serde_json::to_vec_pretty(records)?;
        let path = self.slot_path(slot);
        let tmp = self.root.join(format!(".{slot}.json.tmp"));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(slot, records = records.len(), "Slot written");
        Ok(())
    }

    /// Whether a slot has been initialized.
    pub async fn exists(&self, slot: &str) -> StoreResult<bool> {
        Ok(tokio::fs::try_exists(self.slot_path(slot)).await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn missing_slot_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let slots = SlotStore::new(dir.path());
        assert!(slots.load("nothing").await.unwrap().is_none());
        assert!(!slots.exists("nothing").await.unwrap());
    }

    #[tokio::test]
    async fn replace_all_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let slots = SlotStore::new(dir.path().join("nested"));
        let records = vec![json!({"n": 3}), json!({"n": 1}), json!({"n": 2})];

        slots.replace_all("numbers", &records).await.unwrap();

        assert_eq!(slots.load("numbers").await.unwrap(), Some(records));
        assert!(slots.exists("numbers").await.unwrap());
        assert!(slots.root().join("numbers.json").is_file());
        assert!(!slots.root().join(".numbers.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_slot_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("bad.json"), b"{not json")
            .await
            .unwrap();
        let slots = SlotStore::new(dir.path());
        let err = slots.load("bad").await.unwrap_err();
        assert!(matches!(err, crate::error::StoreError::Serialization(_)));
    }
}
