//! Video item domain type

use serde::{Deserialize, Serialize};

use crate::types::ItemId;

/// One video (or equivalent unit) inside a playlist's ordered sequence.
///
/// `progress` is a cached projection of the completion ledger, not the
/// authoritative record: reconciliation overwrites it whenever the ledger
/// disagrees. The only writers that may set it to 100 are `mark_complete`
/// and the reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    /// Unique item identifier
    pub id: ItemId,

    /// Source locator (embed video id or URL)
    pub source: String,

    /// Item title
    pub title: String,

    /// Duration in seconds, if known
    #[serde(default)]
    pub duration_secs: Option<u32>,

    /// Cached completion percentage (0-100)
    #[serde(default)]
    pub progress: u8,
}

impl VideoItem {
    /// Create a new item with zero progress
    pub fn new(source: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: ItemId::generate(),
            source: source.into(),
            title: title.into(),
            duration_secs: None,
            progress: 0,
        }
    }

    /// Whether the cached projection says this item is done
    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_starts_unwatched() {
        let item = VideoItem::new("abc123", "Intro");
        assert_eq!(item.progress, 0);
        assert!(!item.is_complete());
    }
}
