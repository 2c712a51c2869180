use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::{PlaybackEngine, TrackMetadata};
use crate::mpris::{MprisHandle, NowPlaying};

use super::types::{PlaybackStatus, SessionCmd, SessionEvent, StateHandle};

/// The session worker: sole owner of the engine and sole writer of the
/// shared playback state. Commands and ticks run on one thread, so they are
/// mutually exclusive.
pub(super) struct Worker {
    engine: Box<dyn PlaybackEngine>,
    state: StateHandle,
    mpris: MprisHandle,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl Worker {
    pub(super) fn new(engine: Box<dyn PlaybackEngine>, state: StateHandle, mpris: MprisHandle) -> Self {
        Self {
            engine,
            state,
            mpris,
            subscribers: Vec::new(),
        }
    }

    /// Handle one command; returns true when the session must shut down.
    pub(super) fn handle_cmd(&mut self, cmd: SessionCmd) -> bool {
        match cmd {
            SessionCmd::Play(track) => {
                let result = self
                    .engine
                    .load(&track.locator, TrackMetadata::from(&track))
                    .and_then(|()| self.engine.play());

                match result {
                    Ok(()) => {
                        info!("playing {}", track.display_name);
                        let duration = self.engine.duration();
                        if let Ok(mut st) = self.state.lock() {
                            st.current = Some(track);
                            st.status = PlaybackStatus::Playing;
                            st.position = Duration::ZERO;
                            st.duration = duration;
                        }
                        self.publish(SessionEvent::State(PlaybackStatus::Playing));
                        self.sync_surface();
                    }
                    Err(err) => {
                        // Prior state stays untouched; the failure is the
                        // UI's to explain.
                        warn!("failed to start {}: {err}", track.display_name);
                        self.publish(SessionEvent::Error(err.to_string()));
                    }
                }
            }
            SessionCmd::Pause => self.pause(),
            SessionCmd::TogglePlayPause => match self.status() {
                PlaybackStatus::Playing => self.pause(),
                PlaybackStatus::Paused => self.resume(),
                PlaybackStatus::Idle | PlaybackStatus::Stopped => {}
            },
            SessionCmd::Stop => return true,
            SessionCmd::Subscribe(tx) => self.subscribers.push(tx),
        }
        false
    }

    /// One polling step: read position/duration from the engine, refresh the
    /// now-playing surface, and fan a progress event out to subscribers.
    /// Transient engine read failures skip the step; the next tick retries.
    pub(super) fn tick(&mut self) {
        let loaded = self
            .state
            .lock()
            .map(|st| st.current.is_some())
            .unwrap_or(false);
        if !loaded {
            return;
        }

        let position = match self.engine.position() {
            Ok(p) => p,
            Err(err) => {
                debug!("position read failed, retrying next tick: {err}");
                return;
            }
        };
        let duration = self.engine.duration();
        let engine_playing = self.engine.is_playing();

        let mut finished = false;
        let (position, duration) = match self.state.lock() {
            Ok(mut st) => {
                if st.status == PlaybackStatus::Playing && !engine_playing {
                    // The sink drained: the track ran out.
                    st.status = PlaybackStatus::Paused;
                    finished = true;
                }
                st.duration = duration;
                st.position = if duration.is_zero() {
                    position
                } else {
                    position.min(duration)
                };
                (st.position, st.duration)
            }
            Err(_) => return,
        };

        if finished {
            info!("track finished");
            self.publish(SessionEvent::State(PlaybackStatus::Paused));
        }

        self.sync_surface();
        self.publish(SessionEvent::Progress { position, duration });
    }

    /// Terminal teardown: tick loop is already cancelled (the caller left the
    /// loop), so release the engine, clear the surface, and mark the state.
    pub(super) fn shutdown(&mut self) {
        self.engine.stop();
        self.mpris.cancel();
        if let Ok(mut st) = self.state.lock() {
            st.current = None;
            st.status = PlaybackStatus::Stopped;
            st.position = Duration::ZERO;
            st.duration = Duration::ZERO;
        }
        self.publish(SessionEvent::State(PlaybackStatus::Stopped));
        self.subscribers.clear();
    }

    fn pause(&mut self) {
        if self.status() != PlaybackStatus::Playing {
            return;
        }
        self.engine.pause();
        if let Ok(mut st) = self.state.lock() {
            st.status = PlaybackStatus::Paused;
        }
        self.publish(SessionEvent::State(PlaybackStatus::Paused));
        self.sync_surface();
    }

    fn resume(&mut self) {
        match self.engine.play() {
            Ok(()) => {
                if let Ok(mut st) = self.state.lock() {
                    st.status = PlaybackStatus::Playing;
                }
                self.publish(SessionEvent::State(PlaybackStatus::Playing));
                self.sync_surface();
            }
            Err(err) => {
                warn!("failed to resume: {err}");
                self.publish(SessionEvent::Error(err.to_string()));
            }
        }
    }

    fn status(&self) -> PlaybackStatus {
        self.state.lock().map(|st| st.status).unwrap_or_default()
    }

    fn sync_surface(&self) {
        let Ok(st) = self.state.lock() else {
            return;
        };
        match (&st.current, st.status) {
            (Some(track), PlaybackStatus::Playing | PlaybackStatus::Paused) => {
                self.mpris.show(NowPlaying::render(
                    track,
                    st.status == PlaybackStatus::Playing,
                    st.position,
                    st.duration,
                ));
            }
            _ => self.mpris.cancel(),
        }
    }

    fn publish(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Worker loop: interleave commands with ticks until `Stop` arrives or the
/// handle goes away, then tear down. `recv_timeout` doubles as the tick
/// timer, which restarts whenever a command lands.
pub(super) fn run(
    engine: Box<dyn PlaybackEngine>,
    state: StateHandle,
    mpris: MprisHandle,
    rx: Receiver<SessionCmd>,
    tick: Duration,
) {
    let mut worker = Worker::new(engine, state, mpris);
    loop {
        match rx.recv_timeout(tick) {
            Ok(cmd) => {
                if worker.handle_cmd(cmd) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => worker.tick(),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    worker.shutdown();
}
