//! Shared error types for the services crate.

use thiserror::Error;

use classroom_core::model::{CapsuleError, CapsuleId, ExchangeError};
use storage::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `LibraryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryError {
    #[error("Capsule not found.")]
    NotFound(CapsuleId),
    #[error(transparent)]
    Rejected(CapsuleError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for LibraryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Invalid(reason) => Self::Rejected(reason),
            other => Self::Storage(other),
        }
    }
}

/// Item lists an authoring edit can address by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftList {
    Notes,
    Flashcards,
    Quiz,
    Choices,
}

impl std::fmt::Display for DraftList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DraftList::Notes => "note",
            DraftList::Flashcards => "flashcard",
            DraftList::Quiz => "question",
            DraftList::Choices => "choice",
        })
    }
}

/// Errors emitted by `AuthoringSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthoringError {
    #[error("Note is empty.")]
    EmptyNote,
    #[error("no {list} at position {index} (have {len})")]
    OutOfRange {
        list: DraftList,
        index: usize,
        len: usize,
    },
    #[error(transparent)]
    Rejected(CapsuleError),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for AuthoringError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Invalid(reason) => Self::Rejected(reason),
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted by `LearningSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LearningError {
    #[error("choice {0} does not exist, pick 0..=3")]
    InvalidChoice(usize),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
