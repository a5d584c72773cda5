#![forbid(unsafe_code)]

pub mod capsule_store;
pub mod repository;
pub mod sqlite;

pub use capsule_store::CapsuleStore;
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
