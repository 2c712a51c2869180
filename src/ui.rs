//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::config::UiSettings;
use crate::session::PlaybackStatus;

const CONTROLS_TEXT: &str = "[j/k] up/down | [gg/G] top/bottom | [enter] play selected \
| [space/p] play/pause | [x] stop | [R] rescan | [q] quit";

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the one-line status text from the app model.
fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    if app.loading {
        parts.push("Scanning library...".to_string());
    }

    match app.playback {
        PlaybackStatus::Idle => parts.push("Idle".to_string()),
        PlaybackStatus::Stopped => parts.push("Stopped".to_string()),
        PlaybackStatus::Playing | PlaybackStatus::Paused => {
            let state = if app.playback == PlaybackStatus::Playing {
                "Playing"
            } else {
                "Paused"
            };
            if let Some(track) = &app.now_playing {
                let song = match &track.artist {
                    Some(artist) => format!("{} - {}", artist, track.display_name),
                    None => track.display_name.clone(),
                };
                match app.progress {
                    Some((pos, dur)) => parts.push(format!(
                        "Song: {} [{} / {}]",
                        song,
                        format_mmss(pos),
                        format_mmss(dur)
                    )),
                    None => parts.push(format!("Song: {}", song)),
                }
            }
            parts.push(state.to_string());
        }
    }

    if let Some(msg) = &app.status_message {
        parts.push(msg.clone());
    }

    if !app.library_dirs.is_empty() {
        parts.push(format!("Dir: {}", app.library_dirs.join(", ")));
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame` using `app` state.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" bamboo ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status_par = Paragraph::new(status_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list
    {
        // Center the selected item when possible by creating a visible window.
        // Only build ListItems for the visible window (avoid allocating the
        // entire list).
        let total = app.tracks.len();
        let list_height = chunks[2].height as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = if sel_pos > half { sel_pos - half } else { 0 };
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let playing_idx = app.now_playing_index();
        let visible_items: Vec<ListItem> = app.tracks[start..end]
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let line = match &track.artist {
                    Some(artist) => format!("{} - {}", artist, track.display_name),
                    None => track.display_name.clone(),
                };
                let item = ListItem::new(line);
                if playing_idx == Some(start + offset) {
                    item.style(Style::default().add_modifier(Modifier::BOLD))
                } else {
                    item
                }
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Progress gauge
    {
        let (ratio, label) = match app.progress {
            Some((pos, dur)) if !dur.is_zero() => (
                (pos.as_secs_f64() / dur.as_secs_f64()).clamp(0.0, 1.0),
                format!("{} / {}", format_mmss(pos), format_mmss(dur)),
            ),
            _ => (0.0, "--:-- / --:--".to_string()),
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" progress "))
            .ratio(ratio)
            .label(label);
        frame.render_widget(gauge, chunks[3]);
    }

    // Footer
    let footer = Paragraph::new(CONTROLS_TEXT)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
