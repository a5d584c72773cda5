use classroom_core::model::exchange::{export_document, export_file_name, parse_document};
use classroom_core::model::{Capsule, CapsuleDraft, CapsuleId, IndexEntry, sample};
use storage::CapsuleStore;

use crate::error::LibraryError;

/// A capsule rendered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedCapsule {
    pub file_name: String,
    pub json: String,
}

/// Library-level operations: listing, persistence, exchange and cleanup.
#[derive(Clone)]
pub struct LibraryService {
    store: CapsuleStore,
}

impl LibraryService {
    #[must_use]
    pub fn new(store: CapsuleStore) -> Self {
        Self { store }
    }

    /// Index entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the medium fails.
    pub async fn list(&self) -> Result<Vec<IndexEntry>, LibraryError> {
        Ok(self.store.get_index().await?)
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the medium fails.
    pub async fn get(&self, id: &CapsuleId) -> Result<Option<Capsule>, LibraryError> {
        Ok(self.store.get_capsule(id).await?)
    }

    /// Validate and persist a draft.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Rejected` with the reason when the draft is not
    /// persistable, or `LibraryError::Storage` if the medium fails.
    pub async fn save_draft(&self, draft: CapsuleDraft) -> Result<CapsuleId, LibraryError> {
        Ok(self.store.save_capsule(draft).await?)
    }

    /// Remove a capsule together with its index entry and progress.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the medium fails.
    pub async fn delete(&self, id: &CapsuleId) -> Result<(), LibraryError> {
        Ok(self.store.delete_capsule(id).await?)
    }

    /// Serialize a stored capsule for download.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NotFound` if no readable capsule has this id.
    pub async fn export(&self, id: &CapsuleId) -> Result<ExportedCapsule, LibraryError> {
        let capsule = self
            .store
            .get_capsule(id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(id.clone()))?;
        Ok(ExportedCapsule {
            file_name: export_file_name(capsule.title()),
            json: export_document(&capsule)?,
        })
    }

    /// Import an exchange document.
    ///
    /// Documents without an id get a fresh `imp-…` id that is not yet taken,
    /// so they never replace an existing capsule by accident. Nothing is
    /// stored unless the whole document is accepted.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Exchange` for unreadable JSON or a foreign
    /// schema, and `LibraryError::Rejected` when the content fails validation.
    pub async fn import_json(&self, text: &str) -> Result<CapsuleId, LibraryError> {
        let mut draft = parse_document(text)?;
        let clock = self.store.clock();
        if draft.id.is_none() {
            let mut id = CapsuleId::for_import(&clock);
            while self.store.contains(&id).await? {
                id = CapsuleId::for_import(&clock);
            }
            draft.id = Some(id);
        }
        draft.updated_at = Some(clock.now());
        let id = self.save_draft(draft).await?;
        tracing::info!(%id, "capsule imported");
        Ok(id)
    }

    /// Remove every capsule and all progress.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the medium fails.
    pub async fn clear_all(&self) -> Result<(), LibraryError> {
        Ok(self.store.clear_all().await?)
    }

    /// Store the "Learning to Code" starter capsule.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the medium fails.
    pub async fn add_sample(&self) -> Result<CapsuleId, LibraryError> {
        self.save_draft(sample::learning_to_code()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::model::{CapsuleError, ExchangeError};
    use classroom_core::Clock;
    use classroom_core::time::fixed_clock;
    use std::sync::Arc;
    use storage::InMemoryStore;

    fn service() -> LibraryService {
        let items = Arc::new(InMemoryStore::new());
        LibraryService::new(CapsuleStore::new(fixed_clock(), items))
    }

    #[tokio::test]
    async fn import_without_id_gets_fresh_id_at_top() {
        let library = service();
        let existing = library.add_sample().await.unwrap();

        let id = library
            .import_json(
                r#"{"schema":"pocket-classroom/v1","meta":{"title":"Imported"},"notes":["n"]}"#,
            )
            .await
            .unwrap();

        assert!(id.as_str().starts_with("imp-"));
        let index = library.list().await.unwrap();
        assert_eq!(index[0].id, id);
        assert_eq!(index[1].id, existing);
    }

    #[tokio::test]
    async fn back_to_back_imports_without_id_both_survive() {
        let items = Arc::new(InMemoryStore::new());
        let library = LibraryService::new(CapsuleStore::new(Clock::system(), items));
        let doc = r#"{"schema":"pocket-classroom/v1","meta":{"title":"Twin"},"notes":["n"]}"#;

        let a = library.import_json(doc).await.unwrap();
        let b = library.import_json(doc).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(library.list().await.unwrap().len(), 2);
        assert!(library.get(&a).await.unwrap().is_some());
        assert!(library.get(&b).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn import_rejects_foreign_schema_without_writing() {
        let library = service();
        let err = library
            .import_json(r#"{"schema":"flashcards/v9","meta":{"title":"x"},"notes":["n"]}"#)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LibraryError::Exchange(ExchangeError::UnsupportedSchema { .. })
        ));
        assert!(library.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_rejects_empty_content() {
        let library = service();
        let err = library
            .import_json(r#"{"schema":"pocket-classroom/v1","meta":{"title":"Empty"}}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::Rejected(CapsuleError::NoContent)));
    }

    #[tokio::test]
    async fn import_keeps_supplied_id() {
        let library = service();
        let id = library
            .import_json(
                r#"{"schema":"pocket-classroom/v1","id":"capsule-given","meta":{"title":"T"},"notes":["n"]}"#,
            )
            .await
            .unwrap();
        assert_eq!(id.as_str(), "capsule-given");
    }

    #[tokio::test]
    async fn export_names_file_from_title_and_round_trips() {
        let library = service();
        let id = library.add_sample().await.unwrap();

        let exported = library.export(&id).await.unwrap();
        assert_eq!(exported.file_name, "Learning_to_Code.json");

        let other = service();
        let imported = other.import_json(&exported.json).await.unwrap();
        assert_eq!(imported, id);
        let original = library.get(&id).await.unwrap().unwrap();
        let copy = other.get(&id).await.unwrap().unwrap();
        assert_eq!(copy.quiz(), original.quiz());
        assert_eq!(copy.flashcards(), original.flashcards());
    }

    #[tokio::test]
    async fn export_of_missing_capsule_is_not_found() {
        let library = service();
        let id = CapsuleId::new("capsule-missing").unwrap();
        let err = library.export(&id).await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound(ref missing) if *missing == id));
    }

    #[tokio::test]
    async fn save_draft_reports_rejection_reason() {
        let library = service();
        let err = library.save_draft(CapsuleDraft::default()).await.unwrap_err();
        assert!(matches!(err, LibraryError::Rejected(CapsuleError::MissingTitle)));
        assert_eq!(err.to_string(), "Title is required.");
    }

    #[tokio::test]
    async fn clear_all_and_delete() {
        let library = service();
        let a = library.add_sample().await.unwrap();
        let b = library.add_sample().await.unwrap();
        library.delete(&a).await.unwrap();
        assert_eq!(library.list().await.unwrap().len(), 1);
        assert!(library.get(&a).await.unwrap().is_none());

        library.clear_all().await.unwrap();
        assert!(library.list().await.unwrap().is_empty());
        assert!(library.get(&b).await.unwrap().is_none());
    }
}
