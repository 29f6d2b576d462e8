//! Durable file-backed store
//!
//! A single redb table of JSON strings, one row per namespace key. Durable
//! across restarts of the host. There is no cross-process push channel, so
//! `subscribe_external` hands back a receiver that never fires and callers
//! rely on the reconciliation poll for staleness.

use std::path::Path;

use redb::{Database, TableDefinition};
use tokio::sync::broadcast;
use tracing::warn;

use recap_core::{PersistentStore, Result, StoreChange};

use crate::error::StoreError;

const KV: TableDefinition<&str, &str> = TableDefinition::new("kv");

/// redb-backed `PersistentStore`
pub struct RedbStore {
    db: Database,
    // Held only so subscribers get a live (if silent) channel
    tx: broadcast::Sender<StoreChange>,
}

impl RedbStore {
    /// Open (or create) a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path).map_err(StoreError::backend)?;

        // Create the table up front so first-run reads don't special-case
        let wtx = db.begin_write().map_err(StoreError::backend)?;
        wtx.open_table(KV).map_err(StoreError::backend)?;
        wtx.commit().map_err(StoreError::backend)?;

        let (tx, _) = broadcast::channel(1);
        Ok(Self { db, tx })
    }
}

impl PersistentStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let rtx = self.db.begin_read().map_err(StoreError::backend)?;
        let table = rtx.open_table(KV).map_err(StoreError::backend)?;

        let Some(raw) = table.get(key).map_err(StoreError::backend)? else {
            return Ok(None);
        };

        match serde_json::from_str(raw.value()) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(key, %err, "malformed row in store, treating as absent");
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let encoded = serde_json::to_string(&value)?;

        let wtx = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut table = wtx.open_table(KV).map_err(StoreError::backend)?;
            table
                .insert(key, encoded.as_str())
                .map_err(StoreError::backend)?;
        }
        wtx.commit().map_err(StoreError::backend)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let wtx = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut table = wtx.open_table(KV).map_err(StoreError::backend)?;
            table.remove(key).map_err(StoreError::backend)?;
        }
        wtx.commit().map_err(StoreError::backend)?;
        Ok(())
    }

    fn subscribe_external(&self) -> broadcast::Receiver<StoreChange> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recap.redb");

        {
            let store = RedbStore::open(&path).unwrap();
            store.set("k", serde_json::json!({"progress": 100})).unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(
            store.get("k").unwrap(),
            Some(serde_json::json!({"progress": 100}))
        );
    }

    #[test]
    fn remove_then_get_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("recap.redb")).unwrap();

        store.set("k", serde_json::json!(1)).unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        // Removing again is a no-op
        store.remove("k").unwrap();
    }

    #[test]
    fn subscription_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("recap.redb")).unwrap();

        let mut rx = store.subscribe_external();
        store.set("k", serde_json::json!(1)).unwrap();
        assert!(rx.try_recv().is_err());
    }
}
