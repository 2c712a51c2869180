//! MPRIS now-playing surface.
//!
//! Claims the `org.mpris.MediaPlayer2.bamboo` bus name once and serves the
//! root and player interfaces from a shared [`NowPlaying`] snapshot. `show`
//! replaces the snapshot wholesale (one surface per player, re-posting never
//! duplicates), `cancel` clears it. Transport controls invoked by desktop
//! shells re-enter the app as [`ControlCmd`] values.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::warn;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::catalog::Track;

#[derive(Clone, Debug)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

/// What the now-playing surface currently shows. Pure data; built by
/// [`NowPlaying::render`] from the playback state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NowPlaying {
    pub track_id: u64,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub url: Option<String>,
    pub art_url: Option<String>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Duration,
}

impl NowPlaying {
    /// Build the surface snapshot for `track` at the given transport state.
    pub fn render(track: &Track, playing: bool, position: Duration, duration: Duration) -> Self {
        Self {
            track_id: track.id.0,
            title: track.display_name.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            url: Some(track.locator.clone()),
            art_url: track.art.as_ref().map(|p| format!("file://{}", p.display())),
            playing,
            position,
            duration,
        }
    }
}

type SharedState = Arc<Mutex<Option<NowPlaying>>>;

/// Handle used to update the surface from the session worker.
#[derive(Clone)]
pub struct MprisHandle {
    state: SharedState,
}

impl MprisHandle {
    /// A handle with no bus attached, for exercising the surface directly.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self {
            state: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the surface contents.
    pub fn show(&self, now: NowPlaying) {
        if let Ok(mut s) = self.state.lock() {
            *s = Some(now);
        }
    }

    /// Remove the surface contents.
    pub fn cancel(&self) {
        if let Ok(mut s) = self.state.lock() {
            *s = None;
        }
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Option<NowPlaying> {
        self.state.lock().ok().and_then(|s| s.clone())
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for a TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "bamboo"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: SharedState,
}

/// Build the MPRIS metadata map for a snapshot. Pure: identical snapshots
/// produce identical maps.
fn metadata_map(now: &NowPlaying) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();

    let mut put = |key: &str, value: Value<'_>| {
        if let Ok(v) = OwnedValue::try_from(value) {
            map.insert(key.to_string(), v);
        }
    };

    let track_path = format!("/org/mpris/MediaPlayer2/track/{}", now.track_id);
    if let Ok(path) = ObjectPath::try_from(track_path.as_str()) {
        put("mpris:trackid", Value::from(path.to_owned()));
    }
    put("xesam:title", Value::from(now.title.clone()));
    if let Some(artist) = &now.artist {
        put("xesam:artist", Value::from(vec![artist.clone()]));
    }
    if let Some(album) = &now.album {
        put("xesam:album", Value::from(album.clone()));
    }
    if let Some(url) = &now.url {
        put("xesam:url", Value::from(url.clone()));
    }
    if let Some(art) = &now.art_url {
        put("mpris:artUrl", Value::from(art.clone()));
    }
    put("mpris:length", Value::from(now.duration.as_micros() as i64));

    map
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.as_ref() {
            None => "Stopped",
            Some(now) if now.playing => "Playing",
            Some(_) => "Paused",
        }
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(|now| now.position.as_micros() as i64))
            .unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(metadata_map))
            .unwrap_or_default()
    }
}

/// Claim the bus name and serve the interfaces on a background thread.
///
/// Bus failures are logged and leave a detached handle behind; playback
/// carries on without the surface.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state: SharedState = Arc::new(Mutex::new(None));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let path = "/org/mpris/MediaPlayer2";

            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!("mpris: failed to connect to session bus: {e}");
                    return;
                }
            };

            if let Err(e) = connection
                .request_name("org.mpris.MediaPlayer2.bamboo")
                .await
            {
                warn!("mpris: failed to acquire name: {e}");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server.at(path, RootIface { tx: tx.clone() }).await {
                warn!("mpris: failed to register root iface: {e}");
                return;
            }

            if let Err(e) = object_server
                .at(
                    path,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!("mpris: failed to register player iface: {e}");
                return;
            }

            // Keep the service alive.
            loop {
                Timer::after(Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
