//! Canonical store keys
//!
//! The namespace layout is kept byte-compatible with the original store:
//! one key per watch-time record, one array of completion entries, one
//! array of playlists.

use recap_core::ItemId;

/// Prefix for per-item watch-time records
pub const WATCH_TIME_PREFIX: &str = "watchTime_";

/// Completion ledger: array of `CompletionEntry`
pub const COMPLETED_ITEMS: &str = "completedItems";

/// All playlists: array of `Playlist`
pub const PLAYLISTS: &str = "playlists";

/// Key for an item's watch-time record
pub fn watch_time(item_id: &ItemId) -> String {
    format!("{WATCH_TIME_PREFIX}{item_id}")
}

/// Whether a key addresses a watch-time record
pub fn is_watch_time(key: &str) -> bool {
    key.starts_with(WATCH_TIME_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_time_key_uses_item_id() {
        let key = watch_time(&ItemId::new("abc"));
        assert_eq!(key, "watchTime_abc");
        assert!(is_watch_time(&key));
        assert!(!is_watch_time(COMPLETED_ITEMS));
    }
}
