//! Watch-time record repository
//!
//! One record per item under `watchTime_<itemId>`. Absent or corrupt data
//! yields a fresh empty record, never an error.

use std::sync::Arc;

use recap_core::{ItemId, PersistentStore, Result, WatchTimeRecord};

use crate::{codec, keys};

/// Repository for per-item watch-time records
#[derive(Clone)]
pub struct WatchTimes {
    store: Arc<dyn PersistentStore>,
}

impl WatchTimes {
    /// Create a repository over an injected store
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    /// Fetch the record for an item, defaulting to an empty one
    pub fn get(&self, item_id: &ItemId) -> Result<WatchTimeRecord> {
        let key = keys::watch_time(item_id);
        let value = self.store.get(&key)?;
        Ok(codec::decode_or(&key, value, || {
            WatchTimeRecord::new(item_id.clone())
        }))
    }

    /// Fetch the record only if one was ever persisted
    pub fn get_existing(&self, item_id: &ItemId) -> Result<Option<WatchTimeRecord>> {
        let key = keys::watch_time(item_id);
        let Some(value) = self.store.get(&key)? else {
            return Ok(None);
        };
        Ok(Some(codec::decode_or(&key, Some(value), || {
            WatchTimeRecord::new(item_id.clone())
        })))
    }

    /// Persist a record
    pub fn save(&self, record: &WatchTimeRecord) -> Result<()> {
        let key = keys::watch_time(&record.item_id);
        self.store.set(&key, serde_json::to_value(record)?)
    }

    /// Drop an item's record (on completion or cascade delete)
    pub fn clear(&self, item_id: &ItemId) -> Result<()> {
        self.store.remove(&keys::watch_time(item_id))
    }
}
