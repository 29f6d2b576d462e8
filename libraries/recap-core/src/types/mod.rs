//! Domain types for Recap

mod ids;
mod item;
mod playlist;
mod watch;

pub use ids::{ItemId, PlaylistId};
pub use item::VideoItem;
pub use playlist::{Playlist, PlaylistKind};
pub use watch::{CompletionEntry, WatchTimeRecord};
