use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

use crate::app::App;
use crate::catalog::{Catalog, CatalogError, CatalogEvent};
use crate::config;
use crate::mpris::ControlCmd;
use crate::session::{PlaybackSession, PlaybackStatus, SessionEvent};
use crate::ui;

/// Main terminal event loop: drains catalog events, session events and
/// transport commands, draws the UI, and handles input. Returns `Ok(())`
/// when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    catalog: &Catalog,
    session: &PlaybackSession,
    catalog_events: &mpsc::Receiver<CatalogEvent>,
    session_events: &mpsc::Receiver<SessionEvent>,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> anyhow::Result<()> {
    let mut pending_gg = false;

    loop {
        while let Ok(ev) = catalog_events.try_recv() {
            handle_catalog_event(ev, app, catalog);
        }

        while let Ok(ev) = session_events.try_recv() {
            handle_session_event(ev, app, session);
        }

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, session) {
                return Ok(());
            }
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, catalog, session, control_tx, &mut pending_gg) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_catalog_event(ev: CatalogEvent, app: &mut App, catalog: &Catalog) {
    match ev {
        CatalogEvent::Loading(loading) => app.set_loading(loading),
        CatalogEvent::Tracks(tracks) => {
            if tracks.is_empty() {
                app.set_status_message("No tracks found. Press R to rescan.");
            } else {
                app.status_message = None;
            }
            app.set_tracks(tracks);
        }
        CatalogEvent::ScanComplete { indexed } => {
            debug!("rescan complete, {indexed} file(s) indexed; refreshing");
            catalog.refresh();
        }
        CatalogEvent::Failed(err) => {
            let msg = match &err {
                CatalogError::PermissionDenied { path } => format!(
                    "Cannot read {}: permission denied. Grant read access, then press R.",
                    path.display()
                ),
                other => format!("Library scan failed: {other}"),
            };
            warn!("{msg}");
            app.set_status_message(msg);
        }
    }
}

fn handle_session_event(ev: SessionEvent, app: &mut App, session: &PlaybackSession) {
    match ev {
        SessionEvent::Progress { position, duration } => app.apply_progress(position, duration),
        SessionEvent::State(status) => {
            let current = session.snapshot().current;
            app.apply_playback(status, current);
        }
        SessionEvent::Error(msg) => {
            app.set_status_message(format!("Playback failed: {msg}"));
        }
    }
}

/// Transport commands arriving from the now-playing surface. Returns true
/// when the app should quit.
fn handle_control_cmd(cmd: ControlCmd, app: &mut App, session: &PlaybackSession) -> bool {
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => match app.playback {
            PlaybackStatus::Paused => session.toggle_play_pause(),
            PlaybackStatus::Idle | PlaybackStatus::Playing => play_selected(app, session),
            PlaybackStatus::Stopped => {}
        },
        ControlCmd::Pause => session.pause(),
        ControlCmd::PlayPause => match app.playback {
            PlaybackStatus::Playing | PlaybackStatus::Paused => session.toggle_play_pause(),
            PlaybackStatus::Idle => play_selected(app, session),
            PlaybackStatus::Stopped => {}
        },
        ControlCmd::Stop => session.stop(),
        ControlCmd::Next | ControlCmd::Prev => {
            // There is no queue; skip controls have nothing to act on.
            debug!("queue navigation not implemented, ignoring {cmd:?}");
        }
    }
    false
}

fn play_selected(app: &App, session: &PlaybackSession) {
    if let Some(track) = app.selected_track() {
        session.play(track.clone());
    }
}

fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    catalog: &Catalog,
    session: &PlaybackSession,
    control_tx: &mpsc::Sender<ControlCmd>,
    pending_gg: &mut bool,
) -> bool {
    match key.code {
        KeyCode::Char('q') => {
            *pending_gg = false;
            return true;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            *pending_gg = false;
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            *pending_gg = false;
            app.prev();
        }
        KeyCode::Char('g') => {
            if *pending_gg {
                *pending_gg = false;
                app.select_first();
            } else {
                *pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            *pending_gg = false;
            app.select_last();
        }
        KeyCode::Enter => {
            *pending_gg = false;
            play_selected(app, session);
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            *pending_gg = false;
            // Behave like the surface's PlayPause.
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('x') => {
            *pending_gg = false;
            session.stop();
        }
        KeyCode::Char('R') => {
            *pending_gg = false;
            catalog.rescan(Vec::new());
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            *pending_gg = false;
        }
        _ => {}
    }

    false
}
