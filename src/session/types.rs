//! Session types: commands, events, and the shared playback state.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::catalog::Track;

/// Transport status of the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// No track has been loaded yet.
    #[default]
    Idle,
    Playing,
    Paused,
    /// Terminal: the session worker has shut down.
    Stopped,
}

/// Snapshot of what the session is doing.
///
/// Written only by the session worker; everyone else reads. While a track is
/// loaded, `duration >= position`; both are zero otherwise.
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    pub current: Option<Track>,
    pub status: PlaybackStatus,
    pub position: Duration,
    pub duration: Duration,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

pub type StateHandle = Arc<Mutex<PlaybackState>>;

/// Commands handled by the session worker.
#[derive(Debug)]
pub enum SessionCmd {
    /// Load and start the given track.
    Play(Track),
    Pause,
    TogglePlayPause,
    /// Terminal: stop playback, clear the surface, shut the worker down.
    Stop,
    Subscribe(Sender<SessionEvent>),
}

/// Events published to session subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Emitted at most once per tick while a track is loaded.
    Progress {
        position: Duration,
        duration: Duration,
    },
    State(PlaybackStatus),
    /// The engine could not load or start a track; prior state is intact.
    Error(String),
}
