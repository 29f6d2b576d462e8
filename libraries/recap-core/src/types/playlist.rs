//! Playlist domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ItemId, PlaylistId, VideoItem};

/// Playlist kind (display-only; sequencing treats both the same)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistKind {
    /// Curated course playlist
    Course,

    /// User-assembled playlist
    Custom,
}

/// An ordered collection of video items.
///
/// Item order is significant: it defines the sequencing scan. Positions are
/// resolved by item ID lookup, never by a caller-held raw index, so they
/// stay correct across insertions and deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist title
    pub title: String,

    /// Playlist kind
    pub kind: PlaylistKind,

    /// Ordered item sequence
    #[serde(default)]
    pub items: Vec<VideoItem>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Create a new empty playlist
    pub fn new(title: impl Into<String>, kind: PlaylistKind) -> Self {
        Self {
            id: PlaylistId::generate(),
            title: title.into(),
            kind,
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Position of an item in the sequence
    pub fn position_of(&self, item_id: &ItemId) -> Option<usize> {
        self.items.iter().position(|i| &i.id == item_id)
    }

    /// Look up an item by ID
    pub fn item(&self, item_id: &ItemId) -> Option<&VideoItem> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    /// Whether every item in the sequence is complete
    pub fn is_fully_complete(&self) -> bool {
        self.items.iter().all(VideoItem::is_complete)
    }
}
