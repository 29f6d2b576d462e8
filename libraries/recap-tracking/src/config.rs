//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a tracking session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Watch-time tick interval (default: 1 second)
    pub tick_interval: Duration,

    /// Reconciliation poll interval; also the documented staleness bound
    /// for stores without a push channel (default: 1 second)
    pub reconcile_interval: Duration,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            reconcile_interval: Duration::from_secs(1),
        }
    }
}
