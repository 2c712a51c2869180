use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use lofty::tag::ItemKey;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{Track, TrackId, path_to_locator};

/// Errors raised while building or refreshing the index.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The configured root itself is unreadable. Surfaced to the user with
    /// the offending path so they can fix directory permissions.
    #[error("no permission to read {path}")]
    PermissionDenied { path: PathBuf },
    /// Any other walk failure on a configured root.
    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

const ART_NAMES: [&str; 5] = [
    "cover.jpg",
    "cover.jpeg",
    "cover.png",
    "folder.jpg",
    "folder.png",
];

fn folder_art(dir: &Path) -> Option<PathBuf> {
    ART_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Walk `dir` and index every audio file found under it.
///
/// Tag title/artist/album and duration come from `lofty`; files whose tags
/// cannot be read still get an entry with a file-stem display name. An
/// unreadable root is an error; unreadable subdirectories are skipped.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Result<Vec<Track>, CatalogError> {
    let mut tracks: Vec<Track> = Vec::new();
    let mut art_cache: HashMap<PathBuf, Option<PathBuf>> = HashMap::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                let permission = err
                    .io_error()
                    .map(|io| io.kind() == ErrorKind::PermissionDenied)
                    .unwrap_or(false);
                if permission && err.depth() == 0 {
                    return Err(CatalogError::PermissionDenied {
                        path: dir.to_path_buf(),
                    });
                }
                if err.depth() == 0 {
                    return Err(CatalogError::Scan {
                        path: dir.to_path_buf(),
                        source: err
                            .into_io_error()
                            .unwrap_or_else(|| ErrorKind::Other.into()),
                    });
                }
                debug!("skipping unreadable entry: {err}");
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file()
            || (!settings.include_hidden && is_hidden(path))
            || !is_audio_file(path, settings)
        {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

        let default_title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        let mut display_name = default_title;
        let mut artist: Option<String> = None;
        let mut album: Option<String> = None;
        let mut duration = Duration::ZERO;

        match lofty::read_from_path(path) {
            Ok(tagged) => {
                duration = tagged.properties().duration();

                if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                    if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                        if !v.trim().is_empty() {
                            display_name = v.trim().to_string();
                        }
                    }
                    if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                        let v = v.trim();
                        if !v.is_empty() {
                            artist = Some(v.to_string());
                        }
                    }
                    if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                        let v = v.trim();
                        if !v.is_empty() {
                            album = Some(v.to_string());
                        }
                    }
                }
            }
            Err(err) => {
                warn!("unreadable tags in {}: {err}", path.display());
            }
        }

        let art = path
            .parent()
            .and_then(|p| art_cache.entry(p.to_path_buf()).or_insert_with(|| folder_art(p)).clone());

        tracks.push(Track {
            id: TrackId::from_path(path),
            display_name,
            artist,
            album,
            duration,
            size,
            locator: path_to_locator(path),
            art,
        });
    }

    Ok(tracks)
}

/// Snapshot query over an index: duration floor, then ascending
/// case-insensitive sort by display name.
pub fn query(index: &[Track], min_duration: Duration) -> Vec<Track> {
    let mut tracks: Vec<Track> = index
        .iter()
        .filter(|t| t.duration >= min_duration)
        .cloned()
        .collect();
    tracks.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
    });
    tracks
}
