use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::error;

use crate::catalog::Track;
use crate::engine::{EngineError, PlaybackEngine, UnavailableEngine};
use crate::mpris::MprisHandle;

use super::thread::run;
use super::types::{PlaybackState, SessionCmd, SessionEvent, StateHandle};

/// Handle to the playback session worker.
///
/// The worker outlives UI attach/detach; observers come and go freely. Every
/// command degrades to a no-op once the worker is gone, so a detached or
/// already-stopped handle is always safe to call.
pub struct PlaybackSession {
    tx: Sender<SessionCmd>,
    state: StateHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackSession {
    /// Spawn the worker. The engine is built on the worker thread via
    /// `factory`; if that fails the session stays alive and reports the
    /// failure on every play attempt instead of taking the app down.
    pub fn spawn<F>(factory: F, mpris: MprisHandle, tick: Duration) -> Self
    where
        F: FnOnce() -> Result<Box<dyn PlaybackEngine>, EngineError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<SessionCmd>();
        let state: StateHandle = Arc::new(Mutex::new(PlaybackState::default()));

        let state_for_thread = state.clone();
        let join = std::thread::spawn(move || {
            let engine = factory().unwrap_or_else(|err| {
                error!("audio engine unavailable: {err}");
                Box::new(UnavailableEngine::new(err.to_string()))
            });
            run(engine, state_for_thread, mpris, rx, tick);
        });

        Self {
            tx,
            state,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn play(&self, track: Track) {
        let _ = self.tx.send(SessionCmd::Play(track));
    }

    pub fn pause(&self) {
        let _ = self.tx.send(SessionCmd::Pause);
    }

    pub fn toggle_play_pause(&self) {
        let _ = self.tx.send(SessionCmd::TogglePlayPause);
    }

    /// Terminal stop: cancels the tick loop, releases the engine and the
    /// now-playing surface, and joins the worker. No event is emitted after
    /// this returns. Idempotent.
    pub fn stop(&self) {
        let _ = self.tx.send(SessionCmd::Stop);
        if let Ok(mut j) = self.join.lock() {
            if let Some(handle) = j.take() {
                let _ = handle.join();
            }
        }
    }

    /// Attach an observer. Events start with the next state change or tick.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        let _ = self.tx.send(SessionCmd::Subscribe(tx));
        rx
    }

    /// Shared read-only view of the playback state.
    pub fn state_handle(&self) -> StateHandle {
        self.state.clone()
    }

    /// Clone of the current playback state.
    pub fn snapshot(&self) -> PlaybackState {
        self.state
            .lock()
            .map(|st| st.clone())
            .unwrap_or_default()
    }
}
