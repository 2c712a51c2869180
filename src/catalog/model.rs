//! Catalog data types: `Track` and its identity.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Opaque track identity, stable for the lifetime of an index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(pub u64);

impl TrackId {
    /// Derive an id from the track's on-disk path.
    pub fn from_path(path: &Path) -> Self {
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// A single audio file as seen by the catalog. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    /// Tag title when present, file stem otherwise.
    pub display_name: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Duration,
    /// File size in bytes.
    pub size: u64,
    /// `file://` locator handed to the playback engine.
    pub locator: String,
    /// Folder artwork next to the file, if any.
    pub art: Option<PathBuf>,
}

/// Build a `file://` locator from a path.
pub fn path_to_locator(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Resolve a locator back to a filesystem path.
///
/// Locators without a `file://` scheme are treated as plain paths.
pub fn locator_to_path(locator: &str) -> PathBuf {
    PathBuf::from(locator.strip_prefix("file://").unwrap_or(locator))
}
