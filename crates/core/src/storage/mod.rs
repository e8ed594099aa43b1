//! Local persistence: a namespaced key-value blob store and the record store on top.

pub mod file;
pub mod records;

pub use file::JsonFileStorage;
pub use records::{RecordStore, StoreEvent};

use std::collections::HashMap;

/// Namespaced string blobs; the moral equivalent of browser local storage.
pub trait KeyValueStorage {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()>;

    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

/// Non-persistent storage for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}
