//! Recap Storage
//!
//! Repositories over the flat key-value namespace shared by every execution
//! context, plus two `PersistentStore` implementations:
//!
//! - [`SharedNamespace`]/[`MemoryStore`]: an in-memory namespace that any
//!   number of context handles can open, with change notification between
//!   contexts. Models several windows over one shared local store; also the
//!   test double.
//! - [`RedbStore`]: a durable file-backed store. No cross-process push
//!   channel; staleness is bounded by the reconciliation poll.
//!
//! All persisted-data parsing is defensive: corruption degrades to defaults
//! and a warning log, never to an error for the caller.

#![forbid(unsafe_code)]

mod codec;
mod completion;
mod error;
pub mod keys;
mod memory;
mod playlists;
mod redb_store;
mod watch_time;

pub use completion::CompletionLedger;
pub use error::StoreError;
pub use memory::{MemoryStore, SharedNamespace};
pub use playlists::Playlists;
pub use redb_store::RedbStore;
pub use watch_time::WatchTimes;
