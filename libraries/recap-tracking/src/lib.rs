//! Recap Tracking
//!
//! Progress-tracking and playlist-sequencing engine for Recap.
//!
//! This crate provides:
//! - Playback event normalization (de-duplicated player signals)
//! - Wall-clock watch-time accumulation, persisted every tick
//! - An idempotent, durable completion ledger (via `recap-storage`)
//! - Reconciliation of cached progress against the ledger
//! - Sequencing to the next/previous uncompleted item
//!
//! # Architecture
//!
//! The engine is a set of synchronous state machines coordinated by
//! [`StudySession`]; the host drains [`SessionEvent`]s after each call.
//! Periodic work (the ~1 s watch-time tick, the ~1 s reconciliation poll)
//! and the shared store's external-change subscription run on one
//! [`SessionDriver`] task. Several execution contexts (windows) may run
//! their own engine against one shared store; consistency between them is
//! eventual, resolved toward the ledger on every reconciliation pass.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use recap_core::{PersistentStore, PlaylistKind, VideoItem};
//! use recap_storage::{MemoryStore, Playlists};
//! use recap_tracking::{StudySession, TrackingConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::standalone());
//!
//! let playlists = Playlists::new(store.clone());
//! let playlist = playlists.create("DSA-101", PlaylistKind::Course)?;
//! playlists.add_item(&playlist.id, VideoItem::new("abc123", "Arrays"))?;
//!
//! let mut session = StudySession::new(store, playlist.id, TrackingConfig::default())?;
//!
//! // Player reports it started playing (raw code 1)
//! session.on_player_state_change(1)?;
//!
//! // ...ticks accumulate watch time; the learner finishes the item
//! session.mark_complete()?;
//!
//! for event in session.drain_events() {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod accumulator;
pub mod adapter;
mod config;
mod error;
mod events;
pub mod reconcile;
pub mod sequencer;
mod session;

// Public exports
pub use accumulator::WatchTimeAccumulator;
pub use adapter::{ErrorClass, PlaybackEventAdapter, PlayerEvent};
pub use config::TrackingConfig;
pub use error::{Result, TrackingError};
pub use events::SessionEvent;
pub use reconcile::Reconciler;
pub use sequencer::Selection;
pub use session::{SessionDriver, SessionState, StudySession};
