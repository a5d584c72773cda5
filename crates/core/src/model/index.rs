use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::capsule::Level;
use crate::model::ids::CapsuleId;

/// Library summary of one capsule, kept so listing never loads full bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: CapsuleId,
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub level: Level,
    pub updated_at: DateTime<Utc>,
}

/// Insert or refresh `entry` in `index`.
///
/// An existing entry with the same id is replaced where it stands; a new id
/// goes to the front.
pub fn upsert_entry(index: &mut Vec<IndexEntry>, entry: IndexEntry) {
    match index.iter_mut().find(|e| e.id == entry.id) {
        Some(slot) => *slot = entry,
        None => index.insert(0, entry),
    }
}

/// Drop the entry for `id`, returning whether one was present.
pub fn remove_entry(index: &mut Vec<IndexEntry>, id: &CapsuleId) -> bool {
    let before = index.len();
    index.retain(|e| &e.id != id);
    index.len() != before
}
