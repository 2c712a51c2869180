use super::*;
use crate::config::LibrarySettings;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn track(name: &str, duration_ms: u64) -> Track {
    Track {
        id: TrackId::from_path(Path::new(name)),
        display_name: name.to_string(),
        artist: None,
        album: None,
        duration: Duration::from_millis(duration_ms),
        size: 0,
        locator: format!("file:///music/{name}.mp3"),
        art: None,
    }
}

#[test]
fn query_applies_duration_floor_and_sorts_by_name() {
    let index = vec![track("B", 70_000), track("A", 30_000), track("C", 90_000)];

    let result = query(&index, Duration::from_millis(60_000));

    let names: Vec<&str> = result.iter().map(|t| t.display_name.as_str()).collect();
    assert_eq!(names, vec!["B", "C"]);
    assert_eq!(result[0].duration, Duration::from_millis(70_000));
    assert_eq!(result[1].duration, Duration::from_millis(90_000));
}

#[test]
fn query_sorts_case_insensitively() {
    let index = vec![track("beta", 61_000), track("Alpha", 61_000)];
    let result = query(&index, Duration::from_secs(60));
    let names: Vec<&str> = result.iter().map(|t| t.display_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "beta"]);
}

#[test]
fn query_with_zero_floor_keeps_everything() {
    let index = vec![track("A", 0), track("B", 1)];
    assert_eq!(query(&index, Duration::ZERO).len(), 2);
}

#[test]
fn locator_round_trips_through_path() {
    let p = Path::new("/tmp/music/test.mp3");
    let locator = path_to_locator(p);
    assert_eq!(locator, "file:///tmp/music/test.mp3");
    assert_eq!(locator_to_path(&locator), p);
    // Plain paths are accepted too.
    assert_eq!(locator_to_path("/tmp/music/test.mp3"), p);
}

#[test]
fn scan_filters_non_audio_and_uses_file_stem_for_untagged_files() {
    let dir = tempdir().unwrap();

    fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("a.ogg"), b"not a real ogg").unwrap();
    fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

    let settings = LibrarySettings::default();
    let mut tracks = scan(dir.path(), &settings).unwrap();
    tracks.sort_by(|x, y| x.display_name.cmp(&y.display_name));

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].display_name, "a");
    assert_eq!(tracks[1].display_name, "b");
    assert!(tracks[0].locator.starts_with("file://"));
    assert_eq!(tracks[0].size, "not a real ogg".len() as u64);
}

#[test]
fn scan_respects_include_hidden_false() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
    fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

    let settings = LibrarySettings {
        include_hidden: false,
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings).unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].display_name, "visible");
}

#[test]
fn scan_respects_recursive_false() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("child.mp3"), b"not real").unwrap();

    let settings = LibrarySettings {
        recursive: false,
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].display_name, "root");
}

#[test]
fn scan_respects_max_depth() {
    let dir = tempdir().unwrap();
    let d1 = dir.path().join("d1");
    let d2 = d1.join("d2");
    fs::create_dir_all(&d2).unwrap();
    fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
    fs::write(d1.join("one.mp3"), b"not real").unwrap();
    fs::write(d2.join("two.mp3"), b"not real").unwrap();

    // WalkDir depth counts root as 0, children as 1, grandchildren as 2...
    // With max_depth=2 we should see root + d1/*, but not d1/d2/*.
    let settings = LibrarySettings {
        max_depth: Some(2),
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings).unwrap();

    let names: Vec<String> = tracks.iter().map(|t| t.display_name.clone()).collect();
    assert!(names.contains(&"root".to_string()));
    assert!(names.contains(&"one".to_string()));
    assert!(!names.contains(&"two".to_string()));
}

#[test]
fn scan_attaches_folder_art_when_present() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("song.mp3"), b"not real").unwrap();
    fs::write(dir.path().join("cover.jpg"), b"not a real jpeg").unwrap();

    let bare = dir.path().join("bare");
    fs::create_dir_all(&bare).unwrap();
    fs::write(bare.join("plain.mp3"), b"not real").unwrap();

    let settings = LibrarySettings::default();
    let tracks = scan(dir.path(), &settings).unwrap();

    let song = tracks.iter().find(|t| t.display_name == "song").unwrap();
    assert_eq!(song.art.as_deref(), Some(dir.path().join("cover.jpg").as_path()));

    let plain = tracks.iter().find(|t| t.display_name == "plain").unwrap();
    assert!(plain.art.is_none());
}

#[test]
fn scan_of_missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = scan(&missing, &LibrarySettings::default()).unwrap_err();
    assert!(matches!(err, CatalogError::Scan { .. }));
}

#[test]
fn track_ids_are_stable_per_path() {
    let a = TrackId::from_path(Path::new("/music/a.mp3"));
    let a2 = TrackId::from_path(Path::new("/music/a.mp3"));
    let b = TrackId::from_path(Path::new("/music/b.mp3"));
    assert_eq!(a, a2);
    assert_ne!(a, b);
}

#[test]
fn worker_rescans_once_then_reports_tracks_on_refresh() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("song.mp3"), b"not real").unwrap();

    let settings = LibrarySettings {
        paths: vec![dir.path().to_path_buf()],
        // Fixture files have no readable duration; disable the floor.
        min_track_duration_secs: 0,
        ..LibrarySettings::default()
    };

    let (catalog, events) = Catalog::spawn(settings);
    let timeout = Duration::from_secs(5);

    // First refresh: empty index triggers a rescan.
    catalog.refresh();
    assert!(matches!(
        events.recv_timeout(timeout).unwrap(),
        CatalogEvent::Loading(true)
    ));
    match events.recv_timeout(timeout).unwrap() {
        CatalogEvent::ScanComplete { indexed } => assert_eq!(indexed, 1),
        other => panic!("expected ScanComplete, got {other:?}"),
    }

    // Caller re-queries after the scan completed.
    catalog.refresh();
    assert!(matches!(
        events.recv_timeout(timeout).unwrap(),
        CatalogEvent::Loading(true)
    ));
    match events.recv_timeout(timeout).unwrap() {
        CatalogEvent::Tracks(tracks) => {
            assert_eq!(tracks.len(), 1);
            assert_eq!(tracks[0].display_name, "song");
        }
        other => panic!("expected Tracks, got {other:?}"),
    }
    assert!(matches!(
        events.recv_timeout(timeout).unwrap(),
        CatalogEvent::Loading(false)
    ));
}
