//! Playlist repository
//!
//! CRUD over the `playlists` array. Every operation reads the key fresh and
//! writes the whole array back; the namespace is flat KV with last-write-wins
//! semantics, so there is nothing finer-grained to hold on to.
//!
//! Deletions cascade: an item takes its watch-time record and its completion
//! ledger entry with it.

use std::sync::Arc;

use tracing::debug;

use recap_core::{
    ItemId, PersistentStore, Playlist, PlaylistId, PlaylistKind, RecapError, Result, VideoItem,
};

use crate::{codec, keys, CompletionLedger, WatchTimes};

/// Repository for playlists and their items
#[derive(Clone)]
pub struct Playlists {
    store: Arc<dyn PersistentStore>,
    watch_times: WatchTimes,
    ledger: CompletionLedger,
}

impl Playlists {
    /// Create a repository over an injected store
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self {
            watch_times: WatchTimes::new(Arc::clone(&store)),
            ledger: CompletionLedger::new(Arc::clone(&store)),
            store,
        }
    }

    /// All playlists, in stored order
    pub fn all(&self) -> Result<Vec<Playlist>> {
        let value = self.store.get(keys::PLAYLISTS)?;
        Ok(codec::decode_vec(keys::PLAYLISTS, value))
    }

    /// Look up a playlist by ID
    pub fn get(&self, id: &PlaylistId) -> Result<Option<Playlist>> {
        Ok(self.all()?.into_iter().find(|p| &p.id == id))
    }

    /// Create and persist a new empty playlist
    pub fn create(&self, title: impl Into<String>, kind: PlaylistKind) -> Result<Playlist> {
        let playlist = Playlist::new(title, kind);
        self.save(&playlist)?;
        Ok(playlist)
    }

    /// Persist a playlist, replacing any stored version with the same ID
    pub fn save(&self, playlist: &Playlist) -> Result<()> {
        let mut playlists = self.all()?;
        match playlists.iter_mut().find(|p| p.id == playlist.id) {
            Some(existing) => *existing = playlist.clone(),
            None => playlists.push(playlist.clone()),
        }
        self.write_all(&playlists)
    }

    /// Delete a playlist, cascading over every item it holds
    pub fn delete(&self, id: &PlaylistId) -> Result<()> {
        let mut playlists = self.all()?;
        let Some(index) = playlists.iter().position(|p| &p.id == id) else {
            return Err(RecapError::PlaylistNotFound(id.clone()));
        };

        let removed = playlists.remove(index);
        for item in &removed.items {
            self.cascade_item(&item.id)?;
        }
        self.write_all(&playlists)?;
        debug!(playlist_id = %id, items = removed.items.len(), "playlist deleted");
        Ok(())
    }

    /// Append an item to a playlist's sequence
    pub fn add_item(&self, playlist_id: &PlaylistId, item: VideoItem) -> Result<()> {
        let mut playlists = self.all()?;
        let playlist = playlists
            .iter_mut()
            .find(|p| &p.id == playlist_id)
            .ok_or_else(|| RecapError::PlaylistNotFound(playlist_id.clone()))?;

        playlist.items.push(item);
        self.write_all(&playlists)
    }

    /// Remove an item from a playlist, cascading its watch-time record and
    /// ledger entry.
    ///
    /// Returns the item's former position so the sequencer can recompute
    /// from there; `None` if the item was not in the playlist.
    pub fn delete_item(
        &self,
        playlist_id: &PlaylistId,
        item_id: &ItemId,
    ) -> Result<Option<usize>> {
        let mut playlists = self.all()?;
        let playlist = playlists
            .iter_mut()
            .find(|p| &p.id == playlist_id)
            .ok_or_else(|| RecapError::PlaylistNotFound(playlist_id.clone()))?;

        let Some(position) = playlist.position_of(item_id) else {
            return Ok(None);
        };
        playlist.items.remove(position);

        self.cascade_item(item_id)?;
        self.write_all(&playlists)?;
        debug!(%item_id, position, "item deleted");
        Ok(Some(position))
    }

    /// Overwrite an item's cached progress with a value below 100.
    ///
    /// Also resets the item's ledger entry, keeping ledger and cache
    /// mutually consistent on manual un-completion. A value of 100 is
    /// refused: completion goes through `mark_complete`/reconciliation only.
    pub fn set_progress(&self, item_id: &ItemId, value: u8) -> Result<()> {
        if value >= 100 {
            return Err(RecapError::invalid_input(
                "progress 100 is written by completion, not set_progress",
            ));
        }

        let mut playlists = self.all()?;
        let mut found = false;
        for playlist in &mut playlists {
            if let Some(item) = playlist.items.iter_mut().find(|i| &i.id == item_id) {
                item.progress = value;
                found = true;
            }
        }
        if !found {
            return Err(RecapError::ItemNotFound(item_id.clone()));
        }

        self.ledger.reset(item_id)?;
        self.write_all(&playlists)
    }

    fn cascade_item(&self, item_id: &ItemId) -> Result<()> {
        self.watch_times.clear(item_id)?;
        self.ledger.reset(item_id)
    }

    fn write_all(&self, playlists: &[Playlist]) -> Result<()> {
        self.store
            .set(keys::PLAYLISTS, serde_json::to_value(playlists)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use recap_core::WatchTimeRecord;

    fn repo_with_store() -> (Playlists, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::standalone());
        (Playlists::new(store.clone()), store)
    }

    fn seeded(repo: &Playlists) -> (Playlist, ItemId, ItemId) {
        let playlist = repo.create("DSA-101", PlaylistKind::Course).unwrap();
        let a = VideoItem::new("a", "A");
        let b = VideoItem::new("b", "B");
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        repo.add_item(&playlist.id, a).unwrap();
        repo.add_item(&playlist.id, b).unwrap();
        (repo.get(&playlist.id).unwrap().unwrap(), a_id, b_id)
    }

    #[test]
    fn create_and_get() {
        let (repo, _) = repo_with_store();
        let (playlist, _, _) = seeded(&repo);

        assert_eq!(playlist.items.len(), 2);
        assert_eq!(repo.all().unwrap().len(), 1);
        assert_eq!(repo.get(&PlaylistId::new("missing")).unwrap(), None);
    }

    #[test]
    fn delete_item_reports_former_position_and_cascades() {
        let (repo, store) = repo_with_store();
        let (playlist, a_id, _) = seeded(&repo);

        // Give item A a watch record and a ledger entry
        let watch = WatchTimes::new(store.clone());
        watch.save(&WatchTimeRecord::new(a_id.clone())).unwrap();
        let ledger = CompletionLedger::new(store.clone());
        let item_a = playlist.item(&a_id).unwrap().clone();
        ledger.record_completion(&item_a, &playlist, None).unwrap();

        let position = repo.delete_item(&playlist.id, &a_id).unwrap();
        assert_eq!(position, Some(0));

        assert_eq!(watch.get_existing(&a_id).unwrap(), None);
        assert!(!ledger.is_complete(&a_id).unwrap());
        assert_eq!(repo.get(&playlist.id).unwrap().unwrap().items.len(), 1);
    }

    #[test]
    fn delete_playlist_cascades_every_item() {
        let (repo, store) = repo_with_store();
        let (playlist, a_id, b_id) = seeded(&repo);

        let watch = WatchTimes::new(store.clone());
        watch.save(&WatchTimeRecord::new(a_id.clone())).unwrap();
        watch.save(&WatchTimeRecord::new(b_id.clone())).unwrap();

        repo.delete(&playlist.id).unwrap();

        assert!(repo.all().unwrap().is_empty());
        assert_eq!(watch.get_existing(&a_id).unwrap(), None);
        assert_eq!(watch.get_existing(&b_id).unwrap(), None);
    }

    #[test]
    fn set_progress_resets_ledger() {
        let (repo, store) = repo_with_store();
        let (playlist, a_id, _) = seeded(&repo);

        let ledger = CompletionLedger::new(store);
        let item_a = playlist.item(&a_id).unwrap().clone();
        ledger.record_completion(&item_a, &playlist, None).unwrap();

        repo.set_progress(&a_id, 40).unwrap();

        assert!(!ledger.is_complete(&a_id).unwrap());
        let stored = repo.get(&playlist.id).unwrap().unwrap();
        assert_eq!(stored.item(&a_id).unwrap().progress, 40);
    }

    #[test]
    fn set_progress_refuses_completion_value() {
        let (repo, _) = repo_with_store();
        let (_, a_id, _) = seeded(&repo);

        assert!(matches!(
            repo.set_progress(&a_id, 100),
            Err(RecapError::InvalidInput(_))
        ));
    }

    #[test]
    fn missing_playlist_errors() {
        let (repo, _) = repo_with_store();
        let missing = PlaylistId::new("missing");
        assert!(matches!(
            repo.delete(&missing),
            Err(RecapError::PlaylistNotFound(_))
        ));
    }
}
