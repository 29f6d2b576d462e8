//! Playback event adapter
//!
//! Normalizes raw player signals into semantic events. The underlying
//! player may emit the same state repeatedly or out of order; the adapter
//! remembers the last forwarded event and suppresses consecutive
//! duplicates, forwarding only genuine transitions.

use serde::{Deserialize, Serialize};

/// Raw state codes of the embedded player
pub mod raw {
    /// Player created but nothing started
    pub const UNSTARTED: i32 = -1;
    /// Playback reached the end of the item
    pub const ENDED: i32 = 0;
    /// Actively playing
    pub const PLAYING: i32 = 1;
    /// Paused mid-item
    pub const PAUSED: i32 = 2;
    /// Buffering
    pub const BUFFERING: i32 = 3;
    /// Item cued but not started
    pub const CUED: i32 = 5;
}

/// Normalized player event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Player is ready to accept commands
    Ready,
    /// Playback started or resumed
    Playing,
    /// Playback paused
    Paused,
    /// Playback reached the end of the item
    Ended,
    /// Player is buffering
    Buffering,
    /// Playback failed with the given code
    Error {
        /// Raw player error code
        code: u16,
    },
}

/// Classification of player error codes.
///
/// Every class resolves the same way (skip to the next uncompleted item);
/// the class only changes the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Item removed, private, or embedding blocked; skip quietly
    Unavailable,
    /// Malformed request or player failure; skip with a surfaced message
    Playback,
}

/// Classify a raw player error code
pub fn classify_error(code: u16) -> ErrorClass {
    match code {
        100 | 101 | 150 => ErrorClass::Unavailable,
        _ => ErrorClass::Playback,
    }
}

/// User-facing message for a playback error
pub fn error_message(code: u16) -> String {
    match classify_error(code) {
        ErrorClass::Unavailable => {
            "This video is unavailable or can't be embedded; skipping ahead.".to_string()
        }
        ErrorClass::Playback => {
            format!("Playback failed (code {code}); skipping ahead.")
        }
    }
}

/// Wraps the external player's callbacks and de-duplicates its signals
#[derive(Debug, Clone, Default)]
pub struct PlaybackEventAdapter {
    last: Option<PlayerEvent>,
}

impl PlaybackEventAdapter {
    /// Create a fresh adapter
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last state (call when the current item changes)
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Normalize the player's ready callback
    pub fn on_ready(&mut self) -> Option<PlayerEvent> {
        self.forward(PlayerEvent::Ready)
    }

    /// Normalize a raw state-change code.
    ///
    /// Unstarted/cued and unknown codes carry no semantic transition and
    /// are dropped.
    pub fn on_state_change(&mut self, state: i32) -> Option<PlayerEvent> {
        let event = match state {
            raw::ENDED => PlayerEvent::Ended,
            raw::PLAYING => PlayerEvent::Playing,
            raw::PAUSED => PlayerEvent::Paused,
            raw::BUFFERING => PlayerEvent::Buffering,
            raw::UNSTARTED | raw::CUED => return None,
            _ => return None,
        };
        self.forward(event)
    }

    /// Normalize an error callback
    pub fn on_error(&mut self, code: u16) -> Option<PlayerEvent> {
        self.forward(PlayerEvent::Error { code })
    }

    fn forward(&mut self, event: PlayerEvent) -> Option<PlayerEvent> {
        if self.last == Some(event) {
            return None;
        }
        self.last = Some(event);
        Some(event)
    }
}
