use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::catalog::Catalog;
use crate::engine::{PlaybackEngine, RodioEngine};
use crate::mpris::{self, ControlCmd};
use crate::session::PlaybackSession;

mod event_loop;
mod logging;
mod settings;

pub fn run() -> anyhow::Result<()> {
    logging::init();
    let settings = settings::load_settings();

    let mut library = settings.library.clone();
    if library.paths.is_empty() {
        let dir = env::args()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("Music"));
        library.paths = vec![dir];
    }
    info!(
        "starting with library roots: {:?}",
        library.paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>()
    );

    let mut app = App::new();
    app.library_dirs = library
        .paths
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    let (catalog, catalog_events) = Catalog::spawn(library);
    catalog.refresh();

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris_handle = mpris::spawn_mpris(control_tx.clone());

    let session = PlaybackSession::spawn(
        || RodioEngine::new().map(|e| Box::new(e) as Box<dyn PlaybackEngine>),
        mpris_handle,
        Duration::from_millis(settings.session.progress_tick_ms),
    );
    let session_events = session.subscribe();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &catalog,
        &session,
        &catalog_events,
        &session_events,
        &control_tx,
        &control_rx,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Stop is terminal and idempotent: the worker may already be gone.
    session.stop();

    run_result
}
