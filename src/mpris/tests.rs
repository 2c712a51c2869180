use super::*;
use crate::catalog::{Track, TrackId};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

fn make_track() -> Track {
    Track {
        id: TrackId(7),
        display_name: "Test Title".to_string(),
        artist: Some("Test Artist".to_string()),
        album: Some("Test Album".to_string()),
        duration: Duration::from_secs(200),
        size: 2048,
        locator: "file:///tmp/music/test.mp3".to_string(),
        art: Some(PathBuf::from("/tmp/music/cover.jpg")),
    }
}

#[test]
fn render_is_a_pure_function_of_its_inputs() {
    let track = make_track();
    let a = NowPlaying::render(&track, true, Duration::from_secs(3), Duration::from_secs(200));
    let b = NowPlaying::render(&track, true, Duration::from_secs(3), Duration::from_secs(200));
    assert_eq!(a, b);

    assert_eq!(a.title, "Test Title");
    assert_eq!(a.artist.as_deref(), Some("Test Artist"));
    assert_eq!(a.url.as_deref(), Some("file:///tmp/music/test.mp3"));
    assert_eq!(a.art_url.as_deref(), Some("file:///tmp/music/cover.jpg"));
    assert_eq!(a.track_id, 7);
}

#[test]
fn metadata_map_is_idempotent() {
    let track = make_track();
    let now = NowPlaying::render(&track, false, Duration::ZERO, Duration::from_secs(200));
    assert_eq!(metadata_map(&now), metadata_map(&now));
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let track = make_track();
    let now = NowPlaying::render(&track, true, Duration::from_secs(1), Duration::from_secs(200));

    let map = metadata_map(&now);
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "xesam:url",
        "mpris:artUrl",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn metadata_omits_absent_fields() {
    let now = NowPlaying {
        title: "Untitled".to_string(),
        ..NowPlaying::default()
    };
    let map = metadata_map(&now);
    assert!(map.contains_key("xesam:title"));
    assert!(!map.contains_key("xesam:artist"));
    assert!(!map.contains_key("xesam:album"));
    assert!(!map.contains_key("mpris:artUrl"));
}

#[test]
fn playback_status_maps_state_to_spec_strings() {
    let state: SharedState = Arc::new(Mutex::new(None));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert_eq!(iface.playback_status(), "Stopped");

    let track = make_track();
    *state.lock().unwrap() = Some(NowPlaying::render(
        &track,
        true,
        Duration::ZERO,
        Duration::from_secs(200),
    ));
    assert_eq!(iface.playback_status(), "Playing");

    state.lock().unwrap().as_mut().unwrap().playing = false;
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn position_property_reports_micros() {
    let state: SharedState = Arc::new(Mutex::new(None));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };
    assert_eq!(iface.position(), 0);

    let track = make_track();
    *state.lock().unwrap() = Some(NowPlaying::render(
        &track,
        true,
        Duration::from_millis(1500),
        Duration::from_secs(200),
    ));
    assert_eq!(iface.position(), 1_500_000);
}

#[test]
fn show_replaces_and_cancel_clears() {
    let handle = MprisHandle::detached();
    let track = make_track();

    handle.show(NowPlaying::render(
        &track,
        true,
        Duration::ZERO,
        Duration::from_secs(200),
    ));
    handle.show(NowPlaying::render(
        &track,
        false,
        Duration::from_secs(4),
        Duration::from_secs(200),
    ));

    // One surface per player: the second show replaced the first.
    let shown = handle.snapshot().unwrap();
    assert!(!shown.playing);
    assert_eq!(shown.position, Duration::from_secs(4));

    handle.cancel();
    assert!(handle.snapshot().is_none());
}

#[test]
fn transport_methods_send_control_commands() {
    let state: SharedState = Arc::new(Mutex::new(None));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    iface.play();
    iface.pause();
    iface.play_pause();
    iface.stop();
    iface.next();
    iface.previous();

    let received: Vec<ControlCmd> = rx.try_iter().collect();
    assert!(matches!(
        received.as_slice(),
        [
            ControlCmd::Play,
            ControlCmd::Pause,
            ControlCmd::PlayPause,
            ControlCmd::Stop,
            ControlCmd::Next,
            ControlCmd::Prev,
        ]
    ));
}
