use std::sync::Arc;

use classroom_core::Clock;
use classroom_core::model::{
    Capsule, CapsuleDraft, CapsuleId, IndexEntry, Progress, SCHEMA_TAG, remove_entry,
    upsert_entry,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::{KeyValueStore, StorageError};

/// Key holding the ordered library index.
pub const INDEX_KEY: &str = "pc_capsules_index";

#[must_use]
pub fn capsule_key(id: &CapsuleId) -> String {
    format!("pc_capsule_{id}")
}

#[must_use]
pub fn progress_key(id: &CapsuleId) -> String {
    format!("pc_progress_{id}")
}

/// Capsule, index and progress records laid out over a key-value medium.
///
/// Nothing is cached: every read goes back to the medium. Multi-key writes
/// (`save_capsule`, `delete_capsule`) are not atomic; a failure part way
/// through can leave the index and the bodies out of step.
#[derive(Clone)]
pub struct CapsuleStore {
    clock: Clock,
    items: Arc<dyn KeyValueStore>,
}

impl CapsuleStore {
    #[must_use]
    pub fn new(clock: Clock, items: Arc<dyn KeyValueStore>) -> Self {
        Self { clock, items }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Library summaries, most recently created first.
    ///
    /// A missing or unreadable index reads as empty. Entries are read one by
    /// one, so a single bad row is dropped without hiding the rest.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the medium itself fails.
    pub async fn get_index(&self) -> Result<Vec<IndexEntry>, StorageError> {
        let rows: Vec<serde_json::Value> = self.read_json(INDEX_KEY).await?.unwrap_or_default();
        let mut index = Vec::with_capacity(rows.len());
        for (pos, row) in rows.into_iter().enumerate() {
            match serde_json::from_value(row) {
                Ok(entry) => index.push(entry),
                Err(err) => tracing::warn!(pos, error = %err, "skipping unreadable index entry"),
            }
        }
        Ok(index)
    }

    /// Validate, stamp and persist a draft, then refresh its index entry.
    ///
    /// A draft without an id gets a fresh one. Nothing is written when
    /// validation fails.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Invalid` with the rejection reason, or other
    /// `StorageError`s if the medium fails.
    pub async fn save_capsule(&self, mut draft: CapsuleDraft) -> Result<CapsuleId, StorageError> {
        if draft.id.is_none() {
            draft.id = Some(CapsuleId::generate(&self.clock));
        }
        let mut capsule = draft.validate()?;
        let now = self.clock.now();
        capsule.touch(now);

        self.write_json(&capsule_key(capsule.id()), &capsule.to_draft())
            .await?;

        let mut index = self.get_index().await?;
        upsert_entry(&mut index, capsule.index_entry(now));
        self.write_json(INDEX_KEY, &index).await?;

        tracing::debug!(id = %capsule.id(), "capsule saved");
        Ok(capsule.id().clone())
    }

    /// Whether a body is stored under `id`, readable or not.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the medium itself fails.
    pub async fn contains(&self, id: &CapsuleId) -> Result<bool, StorageError> {
        Ok(self.items.get_item(&capsule_key(id)).await?.is_some())
    }

    /// Load a capsule body.
    ///
    /// Bodies that fail to parse, carry another schema, or no longer pass
    /// validation read as absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the medium itself fails.
    pub async fn get_capsule(&self, id: &CapsuleId) -> Result<Option<Capsule>, StorageError> {
        let Some(mut draft) = self.read_json::<CapsuleDraft>(&capsule_key(id)).await? else {
            return Ok(None);
        };
        if draft.schema != SCHEMA_TAG {
            tracing::warn!(%id, schema = %draft.schema, "ignoring capsule with foreign schema");
            return Ok(None);
        }
        // The key is authoritative for records that lost their id field.
        draft.id.get_or_insert_with(|| id.clone());
        match draft.validate() {
            Ok(capsule) => Ok(Some(capsule)),
            Err(err) => {
                tracing::warn!(%id, error = %err, "ignoring invalid stored capsule");
                Ok(None)
            }
        }
    }

    /// Remove the body, the index entry and the progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any of the three writes fails.
    pub async fn delete_capsule(&self, id: &CapsuleId) -> Result<(), StorageError> {
        self.items.remove_item(&capsule_key(id)).await?;
        let mut index = self.get_index().await?;
        remove_entry(&mut index, id);
        self.write_json(INDEX_KEY, &index).await?;
        self.items.remove_item(&progress_key(id)).await?;
        tracing::info!(%id, "capsule deleted");
        Ok(())
    }

    /// Progress for a capsule, defaulting to zero values.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the medium itself fails.
    pub async fn get_progress(&self, id: &CapsuleId) -> Result<Progress, StorageError> {
        Ok(self.read_json(&progress_key(id)).await?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the medium cannot be written.
    pub async fn save_progress(
        &self,
        id: &CapsuleId,
        progress: &Progress,
    ) -> Result<(), StorageError> {
        self.write_json(&progress_key(id), progress).await
    }

    /// Wipe the whole medium: every capsule, the index and all progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the medium cannot be written.
    pub async fn clear_all(&self) -> Result<(), StorageError> {
        self.items.clear().await?;
        tracing::info!("storage cleared");
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.items.get_item(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key, error = %err, "treating malformed record as absent");
                Ok(None)
            }
        }
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.items.set_item(key, raw).await
    }
}
