//! Watch-time accounting and completion ledger types

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::{ItemId, PlaylistId};

/// Per-item watch-time accounting record.
///
/// At most one exists per item (keyed by `watchTime_<itemId>` in the store).
/// Created on the first PLAYING event, updated on every tick while tracking,
/// cleared when the item is marked complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchTimeRecord {
    /// Item this record belongs to
    pub item_id: ItemId,

    /// Total watched seconds in the current accounting window
    #[serde(default)]
    pub total_watch_secs: f64,

    /// Last known playback position in seconds
    #[serde(default)]
    pub last_position_secs: f64,

    /// Unix millis of the last tick that touched this record
    #[serde(default)]
    pub last_update_ms: i64,

    /// How many times tracking was started for this item
    #[serde(default)]
    pub play_count: u32,

    /// How many times tracking was stopped
    #[serde(default)]
    pub stop_count: u32,

    /// Lifetime watched seconds; non-decreasing while tracking
    #[serde(default)]
    pub cumulative_secs: f64,
}

impl WatchTimeRecord {
    /// Create an empty record for an item
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            total_watch_secs: 0.0,
            last_position_secs: 0.0,
            last_update_ms: Utc::now().timestamp_millis(),
            play_count: 0,
            stop_count: 0,
            cumulative_secs: 0.0,
        }
    }
}

/// Authoritative record that an item is done.
///
/// Append-mostly: insertion is idempotent per item ID, removal happens only
/// on an explicit reset. Carries enough playlist context to survive the
/// playlist itself being edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEntry {
    /// Completed item
    pub item_id: ItemId,

    /// Item title at completion time
    pub title: String,

    /// Playlist the item belonged to
    pub playlist_id: PlaylistId,

    /// Playlist title at completion time
    pub playlist_title: String,

    /// Unix millis of completion
    pub completed_at_ms: i64,

    /// Watch-time snapshot taken at completion, if one existed
    #[serde(default)]
    pub watch_time: Option<WatchTimeRecord>,
}
