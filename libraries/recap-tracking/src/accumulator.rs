//! Watch-time accumulator
//!
//! Idle/Tracking state machine that accumulates wall-clock watch time for
//! at most one item at a time. The state machine is driven by injected
//! timestamps (`start`/`tick`/`stop` all take `now`), so the async driver
//! supplies real time and tests supply synthetic schedules.
//!
//! Wall-clock deltas, not fixed per-tick increments: a delayed tick still
//! accounts the full elapsed span. A backward clock adjustment would make a
//! delta negative; those are clamped to zero and logged, so cumulative time
//! stays monotonic at the cost of not counting the adjustment window.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use recap_core::ItemId;
use recap_storage::WatchTimes;

use crate::error::Result;

#[derive(Debug, Clone)]
enum TrackState {
    Idle,
    Tracking { item_id: ItemId, last_tick_ms: i64 },
}

/// Per-item watch-time accumulator (at most one item tracked at a time)
pub struct WatchTimeAccumulator {
    watch_times: WatchTimes,
    state: TrackState,
}

impl WatchTimeAccumulator {
    /// Create an idle accumulator over the injected watch-time repository
    pub fn new(watch_times: WatchTimes) -> Self {
        Self {
            watch_times,
            state: TrackState::Idle,
        }
    }

    /// The item currently being tracked, if any
    pub fn tracking(&self) -> Option<&ItemId> {
        match &self.state {
            TrackState::Tracking { item_id, .. } => Some(item_id),
            TrackState::Idle => None,
        }
    }

    /// Begin tracking an item.
    ///
    /// Idempotent against duplicate PLAYING events: starting the item that
    /// is already tracked is a no-op. Starting a different item stops the
    /// previous one first (single-instance invariant).
    pub fn start(&mut self, item_id: &ItemId, now: DateTime<Utc>) -> Result<()> {
        if let TrackState::Tracking { item_id: current, .. } = &self.state {
            if current == item_id {
                return Ok(());
            }
            self.stop(now)?;
        }

        let mut record = self.watch_times.get(item_id)?;
        record.play_count += 1;
        record.last_update_ms = now.timestamp_millis();
        self.watch_times.save(&record)?;

        debug!(%item_id, play_count = record.play_count, "tracking started");
        self.state = TrackState::Tracking {
            item_id: item_id.clone(),
            last_tick_ms: now.timestamp_millis(),
        };
        Ok(())
    }

    /// Account the time elapsed since the previous tick and persist.
    ///
    /// A no-op while idle, which is what makes `stop` deterministic: once
    /// stopped, a straggling tick does nothing.
    pub fn tick(&mut self, now: DateTime<Utc>, position_secs: Option<f64>) -> Result<()> {
        let TrackState::Tracking { item_id, last_tick_ms } = &mut self.state else {
            return Ok(());
        };

        let now_ms = now.timestamp_millis();
        let elapsed_secs = elapsed_secs(*last_tick_ms, now_ms);
        *last_tick_ms = now_ms;

        let mut record = self.watch_times.get(item_id)?;
        record.total_watch_secs += elapsed_secs;
        record.cumulative_secs += elapsed_secs;
        record.last_update_ms = now_ms;
        if let Some(position) = position_secs {
            record.last_position_secs = position;
        }
        self.watch_times.save(&record)?;
        Ok(())
    }

    /// Stop tracking: fold in the outstanding partial delta, bump
    /// `stop_count`, persist the final snapshot, and go idle.
    ///
    /// Returns the item that was being tracked, or `None` if already idle.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Option<ItemId>> {
        let TrackState::Tracking { item_id, last_tick_ms } =
            std::mem::replace(&mut self.state, TrackState::Idle)
        else {
            return Ok(None);
        };

        let now_ms = now.timestamp_millis();
        let elapsed_secs = elapsed_secs(last_tick_ms, now_ms);

        let mut record = self.watch_times.get(&item_id)?;
        record.total_watch_secs += elapsed_secs;
        record.cumulative_secs += elapsed_secs;
        record.last_update_ms = now_ms;
        record.stop_count += 1;
        self.watch_times.save(&record)?;

        debug!(%item_id, cumulative_secs = record.cumulative_secs, "tracking stopped");
        Ok(Some(item_id))
    }
}

fn elapsed_secs(last_tick_ms: i64, now_ms: i64) -> f64 {
    let delta_ms = now_ms - last_tick_ms;
    if delta_ms < 0 {
        warn!(delta_ms, "clock went backwards during tracking, not counting");
        return 0.0;
    }
    delta_ms as f64 / 1000.0
}
