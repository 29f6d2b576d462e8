//! Persistent store seam
//!
//! Every component takes a `PersistentStore` by injection; nothing reaches
//! for an ambient global. The store is a flat key-value namespace shared by
//! every execution context (window) of the application, with last-write-wins
//! semantics and no transactions.

use tokio::sync::broadcast;

use crate::error::Result;

/// A write made to the shared namespace by another execution context.
///
/// Carries only the key; subscribers re-read the value fresh, which also
/// covers the case where a newer write landed in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    /// Key that was written or removed
    pub key: String,
}

/// Flat key-value store shared across execution contexts.
///
/// Reads always hit the backing namespace; implementations must not keep a
/// read cache, so staleness across contexts stays bounded by the
/// reconciliation poll interval.
pub trait PersistentStore: Send + Sync {
    /// Read a value, or `None` if the key is absent
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Write a value (last-write-wins across contexts)
    fn set(&self, key: &str, value: serde_json::Value) -> Result<()>;

    /// Remove a key; removing an absent key is a no-op
    fn remove(&self, key: &str) -> Result<()>;

    /// Subscribe to writes made by *other* execution contexts.
    ///
    /// Local writes are never echoed back. Stores without a push channel
    /// (e.g. a plain file-backed store) return a receiver that never fires;
    /// callers fall back on the reconciliation poll.
    fn subscribe_external(&self) -> broadcast::Receiver<StoreChange>;
}
