//! Storage-specific errors

use thiserror::Error;

/// Storage error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing store error (redb transaction/table/commit failures)
    #[error("Store backend error: {0}")]
    Backend(String),

    /// A namespace lock was poisoned by a panicking holder
    #[error("Store namespace lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// Create a backend error from any displayable source
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<StoreError> for recap_core::RecapError {
    fn from(err: StoreError) -> Self {
        recap_core::RecapError::storage(err.to_string())
    }
}
