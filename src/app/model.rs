//! Application model: what the UI currently shows.
//!
//! The `App` struct holds the catalog snapshot, the selection, loading state
//! and the latest playback facts relayed from the session.

use std::time::Duration;

use crate::catalog::Track;
use crate::session::PlaybackStatus;

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,
    /// True while the catalog worker is querying or rescanning.
    pub loading: bool,
    /// One-line message shown in the status box (errors, hints).
    pub status_message: Option<String>,
    pub playback: PlaybackStatus,
    /// Track currently owned by the session, if any.
    pub now_playing: Option<Track>,
    /// Latest progress tick as (position, duration).
    pub progress: Option<(Duration, Duration)>,
    pub library_dirs: Vec<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            selected: 0,
            loading: false,
            status_message: None,
            playback: PlaybackStatus::Idle,
            now_playing: None,
            progress: None,
            library_dirs: Vec::new(),
        }
    }

    /// Replace the catalog snapshot, keeping the selection on the same track
    /// when it survived the refresh.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        let keep = self.tracks.get(self.selected).map(|t| t.id);
        self.tracks = tracks;
        self.selected = keep
            .and_then(|id| self.tracks.iter().position(|t| t.id == id))
            .unwrap_or(0);
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    /// Index of the session's current track in the visible list.
    pub fn now_playing_index(&self) -> Option<usize> {
        let id = self.now_playing.as_ref()?.id;
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Move selection to the next track, wrapping at the end.
    pub fn next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.tracks.len();
    }

    /// Move selection to the previous track, wrapping at the start.
    pub fn prev(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.selected = if self.selected == 0 {
            self.tracks.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.tracks.len().saturating_sub(1);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Record a progress tick from the session.
    pub fn apply_progress(&mut self, position: Duration, duration: Duration) {
        self.progress = Some((position, duration));
    }

    /// Record a transport state change from the session.
    pub fn apply_playback(&mut self, status: PlaybackStatus, current: Option<Track>) {
        self.playback = status;
        self.now_playing = current;
        if self.now_playing.is_none() {
            self.progress = None;
        }
    }
}
