use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::LibrarySettings;

use super::model::Track;
use super::scan::{CatalogError, query, scan};

/// Commands handled by the catalog worker.
#[derive(Debug)]
pub enum CatalogCmd {
    /// Query the current index. An empty result triggers one rescan of the
    /// configured roots; completion is reported as `ScanComplete` and the
    /// caller is expected to refresh again.
    Refresh,
    /// Rebuild the index from the given roots (configured roots when empty).
    Rescan(Vec<PathBuf>),
}

/// Events published by the catalog worker.
#[derive(Debug)]
pub enum CatalogEvent {
    Loading(bool),
    /// Snapshot of tracks passing the duration floor, sorted by display name.
    Tracks(Vec<Track>),
    /// A rescan finished; refresh to observe the rebuilt index.
    ScanComplete { indexed: usize },
    Failed(CatalogError),
}

/// Handle to the catalog worker thread.
///
/// All methods degrade to no-ops once the worker is gone.
pub struct Catalog {
    tx: Sender<CatalogCmd>,
}

impl Catalog {
    /// Spawn the worker and return the handle plus its event stream.
    pub fn spawn(settings: LibrarySettings) -> (Self, Receiver<CatalogEvent>) {
        let (tx, rx) = mpsc::channel::<CatalogCmd>();
        let (events, events_rx) = mpsc::channel::<CatalogEvent>();

        thread::spawn(move || run_worker(settings, rx, events));

        (Self { tx }, events_rx)
    }

    pub fn refresh(&self) {
        let _ = self.tx.send(CatalogCmd::Refresh);
    }

    pub fn rescan(&self, paths: Vec<PathBuf>) {
        let _ = self.tx.send(CatalogCmd::Rescan(paths));
    }
}

fn run_worker(settings: LibrarySettings, rx: Receiver<CatalogCmd>, events: Sender<CatalogEvent>) {
    let min_duration = Duration::from_secs(settings.min_track_duration_secs);
    let mut index: Vec<Track> = Vec::new();
    let mut rescan_attempted = false;

    while let Ok(cmd) = rx.recv() {
        match cmd {
            CatalogCmd::Refresh => {
                let _ = events.send(CatalogEvent::Loading(true));
                let snapshot = query(&index, min_duration);

                if snapshot.is_empty() && !rescan_attempted {
                    // The index may simply be stale or unbuilt. Rebuild once
                    // before reporting an empty library.
                    debug!("query returned no tracks, rescanning");
                    rescan_attempted = true;
                    rebuild(&settings, &settings.paths, &mut index, &events);
                } else {
                    if !snapshot.is_empty() {
                        rescan_attempted = false;
                    }
                    info!("catalog query returned {} track(s)", snapshot.len());
                    let _ = events.send(CatalogEvent::Tracks(snapshot));
                    let _ = events.send(CatalogEvent::Loading(false));
                }
            }
            CatalogCmd::Rescan(paths) => {
                let _ = events.send(CatalogEvent::Loading(true));
                rescan_attempted = true;
                let roots = if paths.is_empty() {
                    &settings.paths
                } else {
                    &paths
                };
                rebuild(&settings, roots, &mut index, &events);
            }
        }
    }
}

fn rebuild(
    settings: &LibrarySettings,
    roots: &[PathBuf],
    index: &mut Vec<Track>,
    events: &Sender<CatalogEvent>,
) {
    index.clear();
    for root in roots {
        match scan(root, settings) {
            Ok(tracks) => {
                debug!("indexed {} file(s) under {}", tracks.len(), root.display());
                index.extend(tracks);
            }
            Err(err) => {
                warn!("scan of {} failed: {err}", root.display());
                let _ = events.send(CatalogEvent::Failed(err));
            }
        }
    }
    let _ = events.send(CatalogEvent::ScanComplete {
        indexed: index.len(),
    });
}
