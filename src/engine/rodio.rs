//! `rodio`-backed playback engine.
//!
//! One output stream lives for the engine's lifetime; each loaded track gets
//! a fresh paused `Sink`. Position is a start instant plus time accumulated
//! across pauses, clamped to the track duration.

use std::fs::File;
use std::io::BufReader;
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::debug;

use crate::catalog::locator_to_path;

use super::{EngineError, PlaybackEngine, TrackMetadata};

pub struct RodioEngine {
    stream: OutputStream,
    sink: Option<Sink>,
    meta: TrackMetadata,
    paused: bool,
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn new() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped; noisy for a TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            meta: TrackMetadata::default(),
            paused: true,
            started_at: None,
            accumulated: Duration::ZERO,
        })
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, locator: &str, mut meta: TrackMetadata) -> Result<(), EngineError> {
        let path = locator_to_path(locator);
        let file = File::open(&path).map_err(|source| EngineError::Open {
            locator: locator.to_string(),
            source,
        })?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|source| EngineError::Decode {
                locator: locator.to_string(),
                source,
            })?;

        if meta.duration.is_zero() {
            if let Some(total) = source.total_duration() {
                meta.duration = total;
            }
        }

        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();

        debug!(
            "loaded {} ({})",
            meta.title,
            meta.artist.as_deref().unwrap_or("unknown artist")
        );
        self.sink = Some(sink);
        self.meta = meta;
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        let Some(sink) = self.sink.as_ref() else {
            return Err(EngineError::NoTrackLoaded);
        };
        sink.play();
        if self.paused {
            self.started_at = Some(Instant::now());
            self.paused = false;
        }
        Ok(())
    }

    fn pause(&mut self) {
        if self.paused {
            return;
        }
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        if let Some(started) = self.started_at.take() {
            self.accumulated += started.elapsed();
        }
        self.paused = true;
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.meta = TrackMetadata::default();
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    fn position(&self) -> Result<Duration, EngineError> {
        if self.sink.is_none() {
            return Ok(Duration::ZERO);
        }
        let raw = self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |started| started.elapsed());
        if self.meta.duration.is_zero() {
            Ok(raw)
        } else {
            Ok(raw.min(self.meta.duration))
        }
    }

    fn duration(&self) -> Duration {
        self.meta.duration
    }

    fn is_playing(&self) -> bool {
        !self.paused && self.sink.as_ref().map(|s| !s.empty()).unwrap_or(false)
    }
}
