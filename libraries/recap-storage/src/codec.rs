//! Defensive decode helpers
//!
//! Persisted data may have been written by an older context or corrupted by
//! a crashed one. A malformed value is never an error for the caller: it
//! decodes to the provided fallback and leaves a warning in the log.

use serde::de::DeserializeOwned;
use tracing::warn;

/// Decode a stored value, falling back on absence or corruption.
pub fn decode_or<T, F>(key: &str, value: Option<serde_json::Value>, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match value {
        Some(value) => match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(key, %err, "malformed stored value, substituting default");
                fallback()
            }
        },
        None => fallback(),
    }
}

/// Decode a stored array, substituting empty on absence or corruption.
pub fn decode_vec<T: DeserializeOwned>(key: &str, value: Option<serde_json::Value>) -> Vec<T> {
    decode_or(key, value, Vec::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_value_yields_fallback() {
        let decoded: Vec<u32> = decode_vec("k", None);
        assert!(decoded.is_empty());
    }

    #[test]
    fn malformed_value_yields_fallback() {
        let decoded: Vec<u32> = decode_vec("k", Some(serde_json::json!("not an array")));
        assert!(decoded.is_empty());
    }

    #[test]
    fn well_formed_value_decodes() {
        let decoded: Vec<u32> = decode_vec("k", Some(serde_json::json!([1, 2, 3])));
        assert_eq!(decoded, vec![1, 2, 3]);
    }
}
