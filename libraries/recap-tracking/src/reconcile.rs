//! Reconciliation
//!
//! Projects the completion ledger onto a playlist's cached `progress`
//! fields. The ledger is authoritative; drift is always resolved in its
//! favor and never surfaced as an error.
//!
//! `project` is pure and returns `None` when nothing changed, which is the
//! signal callers branch on (no write, no re-render) instead of re-deriving
//! equality themselves. It reaches a fixed point after one pass per ledger
//! change.

use std::collections::HashSet;
use std::sync::Arc;

use recap_core::{ItemId, PersistentStore, Playlist};
use recap_storage::CompletionLedger;

use crate::error::Result;

/// Project a set of completed item IDs onto a playlist.
///
/// Returns the updated playlist, or `None` if every item already agreed
/// with the ledger.
pub fn project(playlist: &Playlist, completed: &HashSet<ItemId>) -> Option<Playlist> {
    let drifted = playlist
        .items
        .iter()
        .any(|item| item.progress != 100 && completed.contains(&item.id));
    if !drifted {
        return None;
    }

    let mut updated = playlist.clone();
    for item in &mut updated.items {
        if item.progress != 100 && completed.contains(&item.id) {
            item.progress = 100;
        }
    }
    Some(updated)
}

/// Reconciler bound to a ledger; reads the ledger fresh on every pass
#[derive(Clone)]
pub struct Reconciler {
    ledger: CompletionLedger,
}

impl Reconciler {
    /// Create a reconciler over an injected store
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self {
            ledger: CompletionLedger::new(store),
        }
    }

    /// One reconciliation pass against the current ledger state
    pub fn reconcile(&self, playlist: &Playlist) -> Result<Option<Playlist>> {
        let completed = self.ledger.completed_ids()?;
        Ok(project(playlist, &completed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_core::{PlaylistKind, VideoItem};

    fn playlist_of(progresses: &[u8]) -> Playlist {
        let mut playlist = Playlist::new("Test", PlaylistKind::Course);
        for (i, &p) in progresses.iter().enumerate() {
            let mut item = VideoItem::new(format!("src{i}"), format!("Item {i}"));
            item.progress = p;
            playlist.items.push(item);
        }
        playlist
    }

    #[test]
    fn ledger_entry_flips_cached_progress() {
        let playlist = playlist_of(&[0, 40]);
        let completed: HashSet<_> = [playlist.items[1].id.clone()].into();

        let updated = project(&playlist, &completed).unwrap();
        assert_eq!(updated.items[0].progress, 0);
        assert_eq!(updated.items[1].progress, 100);
    }

    #[test]
    fn consistent_playlist_passes_through_untouched() {
        let playlist = playlist_of(&[100, 0]);
        let completed: HashSet<_> = [playlist.items[0].id.clone()].into();

        assert!(project(&playlist, &completed).is_none());
    }

    #[test]
    fn reconcile_is_a_fixed_point_after_one_pass() {
        let playlist = playlist_of(&[0, 0, 55]);
        let completed: HashSet<_> = playlist.items.iter().map(|i| i.id.clone()).collect();

        let once = project(&playlist, &completed).unwrap();
        assert!(project(&once, &completed).is_none());
    }

    #[test]
    fn reconciler_reads_ledger_fresh_each_pass() {
        use recap_core::PersistentStore;
        use recap_storage::MemoryStore;

        let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::standalone());
        let ledger = CompletionLedger::new(Arc::clone(&store));
        let reconciler = Reconciler::new(Arc::clone(&store));

        let playlist = playlist_of(&[0]);
        assert!(reconciler.reconcile(&playlist).unwrap().is_none());

        // Ledger gains an entry between passes
        ledger
            .record_completion(&playlist.items[0], &playlist, None)
            .unwrap();

        let updated = reconciler.reconcile(&playlist).unwrap().unwrap();
        assert_eq!(updated.items[0].progress, 100);
        assert!(reconciler.reconcile(&updated).unwrap().is_none());
    }

    #[test]
    fn reconcile_never_unmarks() {
        // Ledger reset happens through set_progress, not reconciliation:
        // a cached 100 with no ledger entry is left alone here.
        let playlist = playlist_of(&[100]);
        assert!(project(&playlist, &HashSet::new()).is_none());
    }
}
