//! Session events
//!
//! Event-based communication for host/UI synchronization. The session
//! collects events as it works; the host drains them after each call
//! (`StudySession::drain_events`).

use serde::{Deserialize, Serialize};

use recap_core::ItemId;

/// Events emitted by a tracking session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A new item was selected for playback
    Selected {
        /// The selected item
        item_id: ItemId,
    },

    /// The selected item has a prior watch record; the host may seek here
    ResumeAt {
        /// Item the position belongs to
        item_id: ItemId,
        /// Last known playback position in seconds
        position_secs: f64,
    },

    /// The player reached the end of the current item.
    ///
    /// Completion stays an explicit host action (`mark_complete`).
    ItemEnded {
        /// Item that ended
        item_id: ItemId,
    },

    /// An item was marked complete and recorded in the ledger
    ItemCompleted {
        /// Completed item
        item_id: ItemId,
    },

    /// A playback error was skipped past; the item keeps its prior progress
    PlaybackSkipped {
        /// Item that errored
        item_id: ItemId,
        /// User-facing message (the error class only changes this text)
        message: String,
    },

    /// Reconciliation or a cascade rewrote the stored playlist value
    PlaylistChanged,

    /// Terminal: no uncompleted items remain in the playlist
    PlaylistComplete,
}
