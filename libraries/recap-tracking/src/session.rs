//! Study session - core orchestration
//!
//! Coordinates the event adapter, watch-time accumulator, reconciliation,
//! and sequencing over one playlist. All state transitions are synchronous;
//! the session collects `SessionEvent`s which the host drains after each
//! call, the same way a UI drains playback events from a player manager.
//!
//! The async edge is `SessionDriver`: a `tokio::select!` loop over the
//! watch-time tick, the reconciliation poll, and the store's external-change
//! subscription. Push is the primary sync channel; the poll is the
//! documented staleness bound for stores without one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use recap_core::{ItemId, PersistentStore, Playlist, PlaylistId, StoreChange};
use recap_storage::{keys, CompletionLedger, Playlists, WatchTimes};

use crate::{
    accumulator::WatchTimeAccumulator,
    adapter::{error_message, PlaybackEventAdapter, PlayerEvent},
    config::TrackingConfig,
    error::{Result, TrackingError},
    events::SessionEvent,
    reconcile::Reconciler,
    sequencer::{self, Selection},
};

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// An item is selected, playback not yet confirmed
    Selecting,
    /// The player reported PLAYING for the current item
    Playing,
    /// Terminal: no uncompleted items remain
    Exhausted,
}

/// A tracking session over one playlist
pub struct StudySession {
    store: Arc<dyn PersistentStore>,
    playlists: Playlists,
    ledger: CompletionLedger,
    watch_times: WatchTimes,
    adapter: PlaybackEventAdapter,
    accumulator: WatchTimeAccumulator,
    reconciler: Reconciler,
    config: TrackingConfig,
    playlist_id: PlaylistId,
    current: Option<ItemId>,
    state: SessionState,
    reported_position_secs: Option<f64>,
    pending_events: Vec<SessionEvent>,
}

impl StudySession {
    /// Open a session on a playlist: reconcile once against the ledger,
    /// then select the first uncompleted item (or report exhaustion).
    pub fn new(
        store: Arc<dyn PersistentStore>,
        playlist_id: PlaylistId,
        config: TrackingConfig,
    ) -> Result<Self> {
        let watch_times = WatchTimes::new(Arc::clone(&store));
        let mut session = Self {
            playlists: Playlists::new(Arc::clone(&store)),
            ledger: CompletionLedger::new(Arc::clone(&store)),
            accumulator: WatchTimeAccumulator::new(watch_times.clone()),
            watch_times,
            adapter: PlaybackEventAdapter::new(),
            reconciler: Reconciler::new(Arc::clone(&store)),
            config,
            playlist_id,
            current: None,
            state: SessionState::Selecting,
            reported_position_secs: None,
            pending_events: Vec::new(),
            store,
        };

        session.reconcile_now()?;
        let playlist = session.load_playlist()?;
        session.apply_selection(sequencer::select_next(&playlist, 0));
        info!(playlist_id = %session.playlist_id, "session opened");
        Ok(session)
    }

    // ===== Accessors =====

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Currently selected item, if any
    pub fn current_item(&self) -> Option<&ItemId> {
        self.current.as_ref()
    }

    /// Session configuration
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// The session's playlist, read fresh from the store
    pub fn playlist(&self) -> Result<Playlist> {
        self.load_playlist()
    }

    /// Subscribe to writes from other execution contexts
    pub fn subscribe_external(&self) -> broadcast::Receiver<StoreChange> {
        self.store.subscribe_external()
    }

    /// Drain all pending events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Host-facing player callbacks =====

    /// The player finished initializing.
    ///
    /// If the current item has a prior watch record, emits `ResumeAt` so
    /// the host can seek back to where the learner left off.
    pub fn on_player_ready(&mut self) -> Result<()> {
        if self.adapter.on_ready().is_none() {
            return Ok(());
        }
        if let Some(current) = self.current.clone() {
            if let Some(record) = self.watch_times.get_existing(&current)? {
                if record.last_position_secs > 0.0 {
                    self.pending_events.push(SessionEvent::ResumeAt {
                        item_id: current,
                        position_secs: record.last_position_secs,
                    });
                }
            }
        }
        Ok(())
    }

    /// A raw state-change signal from the player
    pub fn on_player_state_change(&mut self, raw_state: i32) -> Result<()> {
        let Some(event) = self.adapter.on_state_change(raw_state) else {
            return Ok(());
        };
        let now = Utc::now();

        match event {
            PlayerEvent::Playing => {
                let current = self.current.clone().ok_or(TrackingError::NoItemSelected)?;
                self.accumulator.start(&current, now)?;
                self.state = SessionState::Playing;
            }
            PlayerEvent::Paused | PlayerEvent::Buffering => {
                self.accumulator.stop(now)?;
            }
            PlayerEvent::Ended => {
                self.accumulator.stop(now)?;
                if let Some(current) = self.current.clone() {
                    self.pending_events
                        .push(SessionEvent::ItemEnded { item_id: current });
                }
            }
            PlayerEvent::Ready | PlayerEvent::Error { .. } => {}
        }
        Ok(())
    }

    /// A playback error from the player.
    ///
    /// Always resolved by skipping forward; the erroring item keeps its
    /// prior progress and can be retried later.
    pub fn on_player_error(&mut self, code: u16) -> Result<()> {
        if self.adapter.on_error(code).is_none() {
            return Ok(());
        }
        self.accumulator.stop(Utc::now())?;

        let Some(current) = self.current.clone() else {
            return Ok(());
        };
        warn!(item_id = %current, code, "playback error, skipping");
        self.pending_events.push(SessionEvent::PlaybackSkipped {
            item_id: current.clone(),
            message: error_message(code),
        });

        let playlist = self.load_playlist()?;
        // Skip past the erroring item without marking it complete
        let from = playlist.position_of(&current).map_or(0, |pos| pos + 1);
        self.apply_selection(sequencer::select_next(&playlist, from));
        Ok(())
    }

    /// Latest playback position reported by the host (player.getCurrentTime)
    pub fn report_position(&mut self, position_secs: f64) {
        self.reported_position_secs = Some(position_secs);
    }

    /// One watch-time tick; a no-op unless an item is being tracked
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.accumulator.tick(now, self.reported_position_secs)
    }

    // ===== Host-facing commands =====

    /// Mark the current item complete and advance
    pub fn mark_complete(&mut self) -> Result<()> {
        let current = self.current.clone().ok_or(TrackingError::NoItemSelected)?;
        self.mark_complete_item(&current)
    }

    /// Mark a specific item complete.
    ///
    /// Idempotent: the ledger insert is keyed by item ID, and a repeated
    /// call leaves exactly one entry and `progress` at 100.
    pub fn mark_complete_item(&mut self, item_id: &ItemId) -> Result<()> {
        let now = Utc::now();
        if self.accumulator.tracking() == Some(item_id) {
            self.accumulator.stop(now)?;
        }

        let mut playlist = self.load_playlist()?;
        let position = playlist
            .position_of(item_id)
            .ok_or_else(|| recap_core::RecapError::ItemNotFound(item_id.clone()))?;

        let snapshot = self.watch_times.get_existing(item_id)?;
        let item = playlist.items[position].clone();
        let newly = self.ledger.record_completion(&item, &playlist, snapshot)?;

        if playlist.items[position].progress != 100 {
            playlist.items[position].progress = 100;
            self.playlists.save(&playlist)?;
            self.pending_events.push(SessionEvent::PlaylistChanged);
        }
        self.watch_times.clear(item_id)?;

        if newly {
            debug!(%item_id, "item completed");
            self.pending_events.push(SessionEvent::ItemCompleted {
                item_id: item_id.clone(),
            });
        }

        if self.current.as_ref() == Some(item_id) || self.current.is_none() {
            self.apply_selection(sequencer::select_next(&playlist, position));
        }
        Ok(())
    }

    /// Select an item explicitly (e.g. a click on a list entry).
    ///
    /// Completed items are refused and redirected to the next uncompleted
    /// one, uniformly for resume logic and direct clicks.
    pub fn select_item(&mut self, item_id: &ItemId) -> Result<()> {
        let playlist = self.load_playlist()?;
        let selection = sequencer::resolve(&playlist, item_id);
        // Re-selecting the item that is already current must leave tracking
        // and the adapter untouched
        if selection.item_id() == self.current.as_ref() {
            return Ok(());
        }
        self.accumulator.stop(Utc::now())?;
        self.apply_selection(selection);
        Ok(())
    }

    /// Step backward to the nearest earlier uncompleted item.
    ///
    /// Finding none is not exhaustion; the selection simply stays put.
    pub fn select_previous(&mut self) -> Result<()> {
        let playlist = self.load_playlist()?;
        let selection = match self
            .current
            .as_ref()
            .and_then(|c| playlist.position_of(c))
        {
            Some(0) => return Ok(()),
            Some(position) => sequencer::select_previous(&playlist, position - 1),
            None => sequencer::select_previous(&playlist, playlist.items.len().saturating_sub(1)),
        };
        if selection.item_id().is_some() {
            self.accumulator.stop(Utc::now())?;
            self.apply_selection(selection);
        }
        Ok(())
    }

    /// Delete an item from the playlist (cascades its watch record and
    /// ledger entry). Deleting the current item recomputes the selection
    /// from its former position.
    pub fn delete_item(&mut self, item_id: &ItemId) -> Result<()> {
        let was_current = self.current.as_ref() == Some(item_id);
        if was_current {
            // Stop before the cascade so a final snapshot can't resurrect
            // the record the cascade just removed
            self.accumulator.stop(Utc::now())?;
        }

        let Some(former_position) = self.playlists.delete_item(&self.playlist_id, item_id)? else {
            return Ok(());
        };
        self.pending_events.push(SessionEvent::PlaylistChanged);

        if was_current {
            self.current = None;
            let playlist = self.load_playlist()?;
            self.apply_selection(sequencer::select_next(&playlist, former_position));
        }
        Ok(())
    }

    /// Undo an item's completion: ledger entry removed, progress back to 0.
    ///
    /// A subsequent reconciliation pass will not re-mark it.
    pub fn reset_item(&mut self, item_id: &ItemId) -> Result<()> {
        self.playlists.set_progress(item_id, 0)?;
        self.pending_events.push(SessionEvent::PlaylistChanged);

        // A terminal session becomes playable again
        if self.state == SessionState::Exhausted {
            let playlist = self.load_playlist()?;
            self.apply_selection(sequencer::select_next(&playlist, 0));
        }
        Ok(())
    }

    // ===== Reconciliation triggers =====

    /// One reconciliation pass: project the ledger onto the playlist,
    /// persist only if something drifted, and revalidate the selection.
    ///
    /// Returns whether anything changed. Idempotent: a second pass over a
    /// consistent playlist is a true no-op.
    pub fn reconcile_now(&mut self) -> Result<bool> {
        let playlist = self.load_playlist()?;

        let changed = match self.reconciler.reconcile(&playlist)? {
            Some(updated) => {
                self.playlists.save(&updated)?;
                self.pending_events.push(SessionEvent::PlaylistChanged);
                self.revalidate_selection(&updated)?;
                true
            }
            None => {
                self.revalidate_selection(&playlist)?;
                false
            }
        };
        Ok(changed)
    }

    /// The application window regained visibility/focus
    pub fn on_focus_regained(&mut self) -> Result<bool> {
        self.reconcile_now()
    }

    /// A write from another execution context landed on the shared store
    pub fn handle_store_change(&mut self, key: &str) -> Result<()> {
        // Watch-time records are context-local scratch; only the ledger and
        // the playlists array warrant a pass
        if keys::is_watch_time(key) {
            return Ok(());
        }
        if key == keys::COMPLETED_ITEMS || key == keys::PLAYLISTS {
            debug!(key, "external change, reconciling");
            self.reconcile_now()?;
        }
        Ok(())
    }

    // ===== Internals =====

    fn load_playlist(&self) -> Result<Playlist> {
        self.playlists
            .get(&self.playlist_id)?
            .ok_or_else(|| TrackingError::PlaylistGone(self.playlist_id.clone()))
    }

    /// Keep the selection legal against the given playlist value: the
    /// current item must still exist and be uncompleted, and a terminal
    /// state must still be terminal.
    fn revalidate_selection(&mut self, playlist: &Playlist) -> Result<()> {
        match self.current.clone() {
            Some(current) => match playlist.item(&current) {
                Some(item) if !item.is_complete() => Ok(()),
                _ => {
                    self.accumulator.stop(Utc::now())?;
                    self.apply_selection(sequencer::resolve(playlist, &current));
                    Ok(())
                }
            },
            // Exhausted stays terminal here; only an explicit reset_item
            // revives the session
            None => Ok(()),
        }
    }

    fn apply_selection(&mut self, selection: Selection) {
        match selection {
            Selection::Item(item_id) => {
                if self.current.as_ref() == Some(&item_id) {
                    return;
                }
                self.adapter.reset();
                self.reported_position_secs = None;
                self.current = Some(item_id.clone());
                self.state = SessionState::Selecting;
                self.pending_events.push(SessionEvent::Selected { item_id });
            }
            Selection::Exhausted => {
                let was_exhausted = self.state == SessionState::Exhausted;
                self.current = None;
                self.state = SessionState::Exhausted;
                if !was_exhausted {
                    info!(playlist_id = %self.playlist_id, "playlist fully complete");
                    self.pending_events.push(SessionEvent::PlaylistComplete);
                }
            }
        }
    }
}

/// Async driver for a session's periodic work.
///
/// Runs the watch-time tick, the reconciliation poll, and the
/// external-change subscription on one task. Abort the returned handle to
/// stop it; the accumulator guarantees a straggling tick after `stop` does
/// nothing.
pub struct SessionDriver;

impl SessionDriver {
    /// Spawn the driver for a shared session
    pub fn spawn(session: Arc<Mutex<StudySession>>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(Self::run(session))
    }

    /// Drive a shared session until the task is aborted or the session's
    /// playlist is deleted out from under it
    pub async fn run(session: Arc<Mutex<StudySession>>) {
        let (tick_every, poll_every, mut changes) = {
            let session = lock(&session);
            (
                session.config().tick_interval,
                session.config().reconcile_interval,
                session.subscribe_external(),
            )
        };

        let mut tick = tokio::time::interval(tick_every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut poll = tokio::time::interval(poll_every);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut changes_open = true;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Err(err) = lock(&session).tick(Utc::now()) {
                        warn!(%err, "watch-time tick failed");
                    }
                }
                _ = poll.tick() => {
                    if !reconcile_pass(&session) {
                        return;
                    }
                }
                change = changes.recv(), if changes_open => {
                    match change {
                        Ok(change) => {
                            match lock(&session).handle_store_change(&change.key) {
                                Ok(()) => {}
                                Err(TrackingError::PlaylistGone(id)) => {
                                    warn!(playlist_id = %id, "playlist deleted, driver stopping");
                                    return;
                                }
                                Err(err) => warn!(%err, "external change handling failed"),
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            // Notifications were dropped; one pass covers them
                            debug!(missed, "change subscription lagged");
                            if !reconcile_pass(&session) {
                                return;
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            // Poll remains the only sync channel
                            changes_open = false;
                        }
                    }
                }
            }
        }
    }
}

fn lock(session: &Arc<Mutex<StudySession>>) -> MutexGuard<'_, StudySession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One driver-initiated reconciliation. Returns `false` when the playlist
/// is gone and the driver should stop.
fn reconcile_pass(session: &Arc<Mutex<StudySession>>) -> bool {
    match lock(session).reconcile_now() {
        Ok(_) => true,
        Err(TrackingError::PlaylistGone(id)) => {
            warn!(playlist_id = %id, "playlist deleted, driver stopping");
            false
        }
        Err(err) => {
            warn!(%err, "reconciliation failed");
            true
        }
    }
}
