//! Common UI components.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::monitor::{Phase, TickOutcome};

/// Render the header bar.
///
/// Displays: current reading, threshold, data source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let tray = app.tray();
    let indicator = tray.icon.as_ref().map(|icon| &icon.indicator);

    let (status_icon, status_style) = match indicator {
        Some(i) if i.alert => ("♥", app.theme.reading_style(true)),
        Some(i) if !i.is_placeholder() => ("♥", app.theme.reading_style(false)),
        _ => ("♡", Style::default().add_modifier(Modifier::DIM)),
    };

    let reading = match indicator.and_then(|i| i.bpm) {
        Some(bpm) => Span::styled(format!("{} bpm", bpm), status_style),
        None => Span::styled("--", Style::default().add_modifier(Modifier::DIM)),
    };

    let threshold = app
        .threshold()
        .map_or_else(|| "-".to_string(), |t| format!("> {}", t));

    let line = Line::from(vec![
        Span::styled(format!(" {} ", status_icon), status_style),
        Span::styled("PULSETRAY ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        reading,
        Span::raw(" │ alert "),
        Span::styled(threshold, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" │ "),
        Span::raw(app.source_description().to_string()),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows: last tick result, time since it ran, available controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    const CONTROLS: &str = "r:refresh ?:help q:quit";

    let (text, style) = match app.monitor_status() {
        Some(status) if status.phase == Phase::Fetching => (
            format!(" Fetching... | {}", CONTROLS),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Some(status) => match (status.last_outcome, status.last_tick_at) {
            (Some(outcome), Some(at)) => {
                let style = match outcome {
                    TickOutcome::Failed(_) => Style::default().fg(app.theme.warning),
                    _ => Style::default().add_modifier(Modifier::DIM),
                };
                (
                    format!(
                        " Last check {}: {} | {}",
                        at.format("%H:%M:%S"),
                        outcome.label(),
                        CONTROLS
                    ),
                    style,
                )
            }
            _ => (
                format!(" Waiting for first check... | {}", CONTROLS),
                Style::default().add_modifier(Modifier::DIM),
            ),
        },
        None => (
            " Monitor stopped | q:quit".to_string(),
            Style::default().fg(app.theme.warning),
        ),
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the tray panel.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let interval = app
        .refresh_interval()
        .map_or_else(|| "-".to_string(), |d| format!("{}s", d.as_secs()));

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from("  r         Check now"),
        Line::from("  ?         Toggle help"),
        Line::from("  q Esc     Quit"),
        Line::from("  Ctrl-C    Quit"),
        Line::from(""),
        Line::from(format!("  Checks every {}", interval)),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 36u16.min(area.width.saturating_sub(4));
    let help_height = 12u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
