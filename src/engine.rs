//! Playback engine seam.
//!
//! The session talks to a `PlaybackEngine` trait object; the production
//! implementation wraps `rodio`. Decoding, buffering and output device
//! handling all live behind this boundary.

use std::time::Duration;

use crate::catalog::Track;

mod rodio;

pub use self::rodio::RodioEngine;

/// Errors raised by a playback engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[error("failed to open {locator}: {source}")]
    Open {
        locator: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {locator}: {source}")]
    Decode {
        locator: String,
        #[source]
        source: ::rodio::decoder::DecoderError,
    },
    #[error("no track loaded")]
    NoTrackLoaded,
}

/// Metadata attached to a loaded track.
#[derive(Debug, Clone, Default)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: Option<String>,
    pub duration: Duration,
}

impl From<&Track> for TrackMetadata {
    fn from(track: &Track) -> Self {
        Self {
            title: track.display_name.clone(),
            artist: track.artist.clone(),
            duration: track.duration,
        }
    }
}

/// A black-box audio player: load a locator, then drive transport and read
/// position/duration back.
pub trait PlaybackEngine {
    /// Load `locator` and leave the engine paused at position zero.
    fn load(&mut self, locator: &str, meta: TrackMetadata) -> Result<(), EngineError>;
    /// Start or resume playback of the loaded track.
    fn play(&mut self) -> Result<(), EngineError>;
    /// Pause playback; a no-op when already paused or nothing is loaded.
    fn pause(&mut self);
    /// Stop playback and release the loaded track.
    fn stop(&mut self);
    /// Current playback position. May fail transiently; callers retry.
    fn position(&self) -> Result<Duration, EngineError>;
    /// Duration of the loaded track, zero when unknown or nothing is loaded.
    fn duration(&self) -> Duration;
    fn is_playing(&self) -> bool;
}

/// Stand-in engine used when no audio output could be opened. Every load
/// fails with the original output error so the UI can explain the problem,
/// and the rest of the app keeps working.
pub(crate) struct UnavailableEngine {
    reason: String,
}

impl UnavailableEngine {
    pub(crate) fn new(reason: String) -> Self {
        Self { reason }
    }
}

impl PlaybackEngine for UnavailableEngine {
    fn load(&mut self, _locator: &str, _meta: TrackMetadata) -> Result<(), EngineError> {
        Err(EngineError::Output(self.reason.clone()))
    }

    fn play(&mut self) -> Result<(), EngineError> {
        Err(EngineError::Output(self.reason.clone()))
    }

    fn pause(&mut self) {}

    fn stop(&mut self) {}

    fn position(&self) -> Result<Duration, EngineError> {
        Ok(Duration::ZERO)
    }

    fn duration(&self) -> Duration {
        Duration::ZERO
    }

    fn is_playing(&self) -> bool {
        false
    }
}
