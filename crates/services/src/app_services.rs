use classroom_core::model::CapsuleId;
use storage::{CapsuleStore, Storage};

use crate::Clock;
use crate::authoring::AuthoringSession;
use crate::error::{AppServicesError, AuthoringError, LearningError};
use crate::learning::LearningSession;
use crate::library_service::LibraryService;
use crate::timings::SessionTimings;

/// Assembles app-facing services over one storage medium.
#[derive(Clone)]
pub struct AppServices {
    store: CapsuleStore,
    library: LibraryService,
    timings: SessionTimings,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or
    /// migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        timings: SessionTimings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, timings))
    }

    /// Build services over a throwaway in-memory medium.
    #[must_use]
    pub fn in_memory(clock: Clock, timings: SessionTimings) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, timings)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, timings: SessionTimings) -> Self {
        let store = CapsuleStore::new(clock, storage.items.clone());
        Self {
            library: LibraryService::new(store.clone()),
            store,
            timings,
        }
    }

    #[must_use]
    pub fn library(&self) -> &LibraryService {
        &self.library
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.store.clock()
    }

    #[must_use]
    pub fn timings(&self) -> SessionTimings {
        self.timings
    }

    /// Open an authoring session; `None` starts a new capsule.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Storage` if the medium fails.
    pub async fn open_author(
        &self,
        id: Option<&CapsuleId>,
    ) -> Result<AuthoringSession, AuthoringError> {
        AuthoringSession::open(self.store.clone(), id, self.timings).await
    }

    /// Open a learning session, or `None` if the capsule is missing.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::Storage` if the medium fails.
    pub async fn open_learn(
        &self,
        id: &CapsuleId,
    ) -> Result<Option<LearningSession>, LearningError> {
        LearningSession::open(self.store.clone(), id, self.timings).await
    }
}
