//! Recap Core
//!
//! Platform-agnostic core types, traits, and error handling for Recap.
//!
//! This crate provides the foundational building blocks shared by the
//! storage and tracking crates:
//! - **Domain Types**: `VideoItem`, `Playlist`, `WatchTimeRecord`,
//!   `CompletionEntry`
//! - **Store Seam**: the `PersistentStore` trait every component gets
//!   injected with (no ambient singletons)
//! - **Error Handling**: unified `RecapError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use recap_core::types::{Playlist, PlaylistKind, VideoItem};
//!
//! let mut playlist = Playlist::new("DSA-101", PlaylistKind::Course);
//! playlist.items.push(VideoItem::new("dQw4w9WgXcQ", "Arrays in 10 minutes"));
//!
//! assert_eq!(playlist.items[0].progress, 0);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{RecapError, Result};
pub use store::{PersistentStore, StoreChange};
pub use types::{
    CompletionEntry, ItemId, Playlist, PlaylistId, PlaylistKind, VideoItem, WatchTimeRecord,
};
