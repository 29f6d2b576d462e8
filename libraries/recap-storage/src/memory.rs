//! In-memory shared namespace
//!
//! One [`SharedNamespace`] models the single shared local store; each
//! [`MemoryStore`] handle opened from it models one execution context
//! (window) of the application. Writes broadcast a [`StoreChange`] to every
//! *other* context, never back to the writer, matching the external-change
//! contract of the real store.
//!
//! Last-write-wins, no transactions. This is both the multi-context
//! simulation used in integration tests and a perfectly serviceable store
//! for hosts that persist elsewhere.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use recap_core::{PersistentStore, Result, StoreChange};

use crate::error::StoreError;

/// Capacity of each context's change channel. Lagging receivers drop the
/// oldest notifications; the reconciliation poll covers whatever is missed.
const CHANGE_CAPACITY: usize = 64;

struct ContextChannel {
    id: u64,
    tx: broadcast::Sender<StoreChange>,
}

struct NamespaceInner {
    data: Mutex<HashMap<String, serde_json::Value>>,
    contexts: Mutex<Vec<ContextChannel>>,
    next_context: Mutex<u64>,
}

/// The shared flat key-value namespace
#[derive(Clone)]
pub struct SharedNamespace {
    inner: Arc<NamespaceInner>,
}

impl SharedNamespace {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self {
            inner: Arc::new(NamespaceInner {
                data: Mutex::new(HashMap::new()),
                contexts: Mutex::new(Vec::new()),
                next_context: Mutex::new(0),
            }),
        }
    }

    /// Open a new execution-context handle on this namespace
    pub fn open_context(&self) -> MemoryStore {
        let (tx, _) = broadcast::channel(CHANGE_CAPACITY);

        let id = {
            let mut next = self
                .inner
                .next_context
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let id = *next;
            *next += 1;
            id
        };

        if let Ok(mut contexts) = self.inner.contexts.lock() {
            contexts.push(ContextChannel { id, tx: tx.clone() });
        }

        MemoryStore {
            inner: Arc::clone(&self.inner),
            context_id: id,
            tx,
        }
    }
}

impl Default for SharedNamespace {
    fn default() -> Self {
        Self::new()
    }
}

/// One execution context's handle on a [`SharedNamespace`]
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<NamespaceInner>,
    context_id: u64,
    tx: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    /// Open a store with its own private namespace (single context)
    pub fn standalone() -> Self {
        SharedNamespace::new().open_context()
    }

    fn notify_others(&self, key: &str) {
        let Ok(contexts) = self.inner.contexts.lock() else {
            return;
        };
        for context in contexts.iter().filter(|c| c.id != self.context_id) {
            // Send fails only when the context has no live receiver
            let _ = context.tx.send(StoreChange {
                key: key.to_string(),
            });
        }
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let data = self.inner.data.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<()> {
        {
            let mut data = self.inner.data.lock().map_err(|_| StoreError::Poisoned)?;
            data.insert(key.to_string(), value);
        }
        self.notify_others(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let removed = {
            let mut data = self.inner.data.lock().map_err(|_| StoreError::Poisoned)?;
            data.remove(key).is_some()
        };
        if removed {
            self.notify_others(key);
        }
        Ok(())
    }

    fn subscribe_external(&self) -> broadcast::Receiver<StoreChange> {
        self.tx.subscribe()
    }
}
