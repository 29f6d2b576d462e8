//! Core error types for Recap

use thiserror::Error;

use crate::types::{ItemId, PlaylistId};

/// Result type alias using `RecapError`
pub type Result<T> = std::result::Result<T, RecapError>;

/// Core error type for Recap
#[derive(Error, Debug)]
pub enum RecapError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Playback-related errors (surfaced, then resolved by skipping)
    #[error("Playback error: {0}")]
    Playback(String),

    /// Item not found
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Playlist not found
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl RecapError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a playback error
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
