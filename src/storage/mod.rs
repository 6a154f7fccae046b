//! Flat key-value persistence for the note and alarm collections.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

pub const NOTES_KEY: &str = "notes";
pub const ALARMS_KEY: &str = "alarms";

/// Synchronous storage addressed by string keys.
pub trait KeyValueStore {
    /// `Ok(None)` when nothing has been stored under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Load a JSON array stored under `key`. Absent, unreadable or malformed
/// documents all come back as an empty collection.
pub fn load_collection<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Vec<T> {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::warn!("Failed to read {}: {}", key, e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            log::warn!("Discarding malformed {}: {}", key, e);
            Vec::new()
        }
    }
}

/// Serialize `items` under `key`. Failures are logged; the caller's in-memory
/// copy stays authoritative.
pub fn save_collection<T: Serialize>(store: &mut impl KeyValueStore, key: &str, items: &[T]) {
    match serde_json::to_string(items) {
        Ok(json) => {
            if let Err(e) = store.save(key, &json) {
                log::error!("Failed to save {}: {}", key, e);
            }
        }
        Err(e) => log::error!("Failed to serialize {}: {}", key, e),
    }
}
