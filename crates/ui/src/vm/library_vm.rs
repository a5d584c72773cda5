use chrono::{DateTime, Utc};
use classroom_core::model::{CapsuleId, IndexEntry};

use crate::vm::time_fmt::time_ago;

/// One line of the library listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryRowVm {
    pub id: CapsuleId,
    pub title: String,
    /// `"subject · level"`.
    pub details: String,
    pub updated: String,
}

impl LibraryRowVm {
    #[must_use]
    pub fn new(entry: &IndexEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.title.clone(),
            details: format!("{} · {}", entry.subject, entry.level),
            updated: time_ago(entry.updated_at, now),
        }
    }

    /// Render as a numbered line; `position` is 1-based.
    #[must_use]
    pub fn line(&self, position: usize) -> String {
        format!(
            "{position:>3}. {}  [{}]  {}  ({})",
            self.title, self.details, self.updated, self.id
        )
    }
}

#[must_use]
pub fn map_library_rows(entries: &[IndexEntry], now: DateTime<Utc>) -> Vec<LibraryRowVm> {
    entries
        .iter()
        .map(|entry| LibraryRowVm::new(entry, now))
        .collect()
}
