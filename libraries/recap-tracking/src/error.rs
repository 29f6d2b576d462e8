//! Error types for the tracking engine

use thiserror::Error;

use recap_core::{PlaylistId, RecapError};

/// Tracking engine errors
#[derive(Debug, Error)]
pub enum TrackingError {
    /// A host call needed a current item and none is selected
    #[error("No item selected")]
    NoItemSelected,

    /// The session's playlist no longer exists in the store
    #[error("Playlist gone: {0}")]
    PlaylistGone(PlaylistId),

    /// Error from the core/storage layers
    #[error(transparent)]
    Core(#[from] RecapError),
}

/// Result type for tracking operations
pub type Result<T> = std::result::Result<T, TrackingError>;
