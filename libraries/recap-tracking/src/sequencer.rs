//! Playlist sequencing
//!
//! Scans the playlist's ordered sequence for the next or previous item
//! whose cached progress is below 100. Selection is guarded: a completed
//! item is never selected, even when explicitly requested, whether by
//! resume logic or a direct click.
//!
//! Positions are transient scan inputs only; results are item IDs, so they
//! stay valid across insertions and deletions.

use recap_core::{ItemId, Playlist};

/// Outcome of a sequencing scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The next playable item
    Item(ItemId),
    /// Terminal: no uncompleted items remain
    Exhausted,
}

impl Selection {
    /// The selected item ID, if any
    pub fn item_id(&self) -> Option<&ItemId> {
        match self {
            Selection::Item(id) => Some(id),
            Selection::Exhausted => None,
        }
    }
}

/// Scan forward from `from_pos` (inclusive) for the first uncompleted item
pub fn select_next(playlist: &Playlist, from_pos: usize) -> Selection {
    playlist
        .items
        .iter()
        .skip(from_pos)
        .find(|item| !item.is_complete())
        .map_or(Selection::Exhausted, |item| Selection::Item(item.id.clone()))
}

/// Scan backward from `from_pos` (inclusive) for the first uncompleted item
pub fn select_previous(playlist: &Playlist, from_pos: usize) -> Selection {
    playlist
        .items
        .iter()
        .take(from_pos.saturating_add(1).min(playlist.items.len()))
        .rev()
        .find(|item| !item.is_complete())
        .map_or(Selection::Exhausted, |item| Selection::Item(item.id.clone()))
}

/// Resolve an explicit request for an item.
///
/// An uncompleted item is granted as-is. A completed item redirects to the
/// next uncompleted one after it. An item that is no longer in the playlist
/// falls back to the first uncompleted item.
pub fn resolve(playlist: &Playlist, requested: &ItemId) -> Selection {
    match playlist.position_of(requested) {
        Some(position) => {
            let item = &playlist.items[position];
            if item.is_complete() {
                // Redirect: scan past the completed item
                select_next(playlist, position + 1)
            } else {
                Selection::Item(requested.clone())
            }
        }
        None => select_next(playlist, 0),
    }
}
