//! Completion ledger
//!
//! The durable, authoritative registry of "this item is done", stored as an
//! array under `completedItems`. Written only by explicit completion/reset
//! calls; never derived from an item's cached `progress`, so it survives
//! playlists being edited or deleted independently.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use recap_core::{
    CompletionEntry, ItemId, PersistentStore, Playlist, Result, VideoItem, WatchTimeRecord,
};

use crate::{codec, keys};

/// Repository for the completion ledger
#[derive(Clone)]
pub struct CompletionLedger {
    store: Arc<dyn PersistentStore>,
}

impl CompletionLedger {
    /// Create a ledger over an injected store
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    /// All ledger entries, oldest first
    pub fn entries(&self) -> Result<Vec<CompletionEntry>> {
        let value = self.store.get(keys::COMPLETED_ITEMS)?;
        Ok(codec::decode_vec(keys::COMPLETED_ITEMS, value))
    }

    /// The set of completed item IDs (one fresh read)
    pub fn completed_ids(&self) -> Result<HashSet<ItemId>> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|entry| entry.item_id)
            .collect())
    }

    /// Whether an item has a ledger entry
    pub fn is_complete(&self, item_id: &ItemId) -> Result<bool> {
        Ok(self.entries()?.iter().any(|e| &e.item_id == item_id))
    }

    /// Record a completion. Idempotent: a second call for the same item is
    /// a no-op and returns `false`.
    pub fn record_completion(
        &self,
        item: &VideoItem,
        playlist: &Playlist,
        watch_time: Option<WatchTimeRecord>,
    ) -> Result<bool> {
        let mut entries = self.entries()?;
        if entries.iter().any(|e| e.item_id == item.id) {
            debug!(item_id = %item.id, "completion already recorded");
            return Ok(false);
        }

        entries.push(CompletionEntry {
            item_id: item.id.clone(),
            title: item.title.clone(),
            playlist_id: playlist.id.clone(),
            playlist_title: playlist.title.clone(),
            completed_at_ms: Utc::now().timestamp_millis(),
            watch_time,
        });

        self.store
            .set(keys::COMPLETED_ITEMS, serde_json::to_value(&entries)?)?;
        debug!(item_id = %item.id, "completion recorded");
        Ok(true)
    }

    /// Remove an item's entry unconditionally (undo completion)
    pub fn reset(&self, item_id: &ItemId) -> Result<()> {
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|e| &e.item_id != item_id);

        if entries.len() != before {
            self.store
                .set(keys::COMPLETED_ITEMS, serde_json::to_value(&entries)?)?;
            debug!(%item_id, "completion reset");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use recap_core::PlaylistKind;

    fn fixtures() -> (CompletionLedger, Playlist, VideoItem) {
        let ledger = CompletionLedger::new(Arc::new(MemoryStore::standalone()));
        let mut playlist = Playlist::new("Course", PlaylistKind::Course);
        let item = VideoItem::new("src", "Lesson 1");
        playlist.items.push(item.clone());
        (ledger, playlist, item)
    }

    #[test]
    fn record_completion_is_idempotent() {
        let (ledger, playlist, item) = fixtures();

        assert!(ledger.record_completion(&item, &playlist, None).unwrap());
        assert!(!ledger.record_completion(&item, &playlist, None).unwrap());

        assert_eq!(ledger.entries().unwrap().len(), 1);
        assert!(ledger.is_complete(&item.id).unwrap());
    }

    #[test]
    fn reset_removes_entry() {
        let (ledger, playlist, item) = fixtures();

        ledger.record_completion(&item, &playlist, None).unwrap();
        ledger.reset(&item.id).unwrap();

        assert!(!ledger.is_complete(&item.id).unwrap());
        assert!(ledger.entries().unwrap().is_empty());

        // Resetting an absent item is a no-op
        ledger.reset(&item.id).unwrap();
    }

    #[test]
    fn entry_keeps_playlist_context() {
        let (ledger, playlist, item) = fixtures();
        let record = WatchTimeRecord::new(item.id.clone());

        ledger
            .record_completion(&item, &playlist, Some(record))
            .unwrap();

        let entries = ledger.entries().unwrap();
        assert_eq!(entries[0].playlist_title, "Course");
        assert!(entries[0].watch_time.is_some());
    }

    #[test]
    fn corrupt_ledger_degrades_to_empty() {
        let store = Arc::new(MemoryStore::standalone());
        store
            .set(keys::COMPLETED_ITEMS, serde_json::json!(17))
            .unwrap();

        let ledger = CompletionLedger::new(store);
        assert!(ledger.entries().unwrap().is_empty());
    }
}
