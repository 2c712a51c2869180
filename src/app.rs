//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the current track list,
//! selection, loading and playback display state.

mod model;

pub use model::*;
