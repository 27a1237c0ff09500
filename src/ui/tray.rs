//! The tray panel: the indicator glyph, its tooltip and the last alert.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

use crate::app::App;
use crate::host::TrayState;
use crate::render::GlyphBitmap;

/// Draws a glyph with one terminal cell per two vertical pixels.
///
/// Each cell is an upper half block: the foreground is the top pixel and the
/// background the bottom one.
pub struct GlyphView<'a> {
    glyph: &'a GlyphBitmap,
}

impl<'a> GlyphView<'a> {
    pub fn new(glyph: &'a GlyphBitmap) -> Self {
        Self { glyph }
    }

    /// Cells needed to draw the glyph: (width, height).
    pub fn cell_size(glyph: &GlyphBitmap) -> (u16, u16) {
        let size = glyph.size().min(u16::MAX as u32) as u16;
        (size, size.div_ceil(2))
    }
}

impl Widget for GlyphView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = Self::cell_size(self.glyph);

        for row in 0..height.min(area.height) {
            for col in 0..width.min(area.width) {
                let x = u32::from(col);
                let top = self.glyph.pixel(x, u32::from(row) * 2);
                let bottom = self.glyph.pixel(x, u32::from(row) * 2 + 1);

                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol("▀");
                    if let Some(top) = top {
                        cell.set_fg(to_color(top));
                    }
                    cell.set_bg(to_color(bottom.or(top).unwrap_or(Rgb888::BLACK)));
                }
            }
        }
    }
}

fn to_color(pixel: Rgb888) -> ratatui::style::Color {
    ratatui::style::Color::Rgb(pixel.r(), pixel.g(), pixel.b())
}

/// Render the tray panel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let tray = app.tray();

    let block = Block::default()
        .title(" Tray ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(icon) = tray.icon.as_ref() else {
        let paragraph = Paragraph::new("No icon installed")
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, inner);
        return;
    };

    let (glyph_width, glyph_height) = GlyphView::cell_size(&icon.indicator.glyph);
    let [glyph_area, _, text_area] = Layout::horizontal([
        Constraint::Length(glyph_width),
        Constraint::Length(2),
        Constraint::Min(10),
    ])
    .areas(inner);
    let glyph_area = Rect {
        height: glyph_area.height.min(glyph_height),
        ..glyph_area
    };

    frame.render_widget(GlyphView::new(&icon.indicator.glyph), glyph_area);
    frame.render_widget(tooltip(app, &tray), text_area);
}

fn tooltip<'a>(app: &App, tray: &'a TrayState) -> Paragraph<'a> {
    let mut lines = Vec::new();

    if let Some(icon) = tray.icon.as_ref() {
        let indicator = &icon.indicator;
        let style = if indicator.is_placeholder() {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            app.theme.reading_style(indicator.alert)
        };
        lines.push(Line::from(Span::styled(indicator.status_text.as_str(), style)));

        if let Some(bpm) = indicator.bpm {
            let verdict = match (indicator.alert, app.threshold()) {
                (true, Some(threshold)) => format!("{} bpm is above {}", bpm, threshold),
                (false, Some(threshold)) => format!("{} bpm is within {}", bpm, threshold),
                (_, None) => format!("{} bpm", bpm),
            };
            lines.push(Line::from(Span::styled(
                verdict,
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(alert_line(app, tray));

    Paragraph::new(lines).wrap(Wrap { trim: true })
}

fn alert_line<'a>(app: &App, tray: &'a TrayState) -> Line<'a> {
    match tray.last_alert.as_ref() {
        Some((alert, raised_at)) => Line::from(vec![
            Span::styled(
                "▲ ",
                Style::default().fg(app.theme.alert).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                alert.title.as_str(),
                Style::default().fg(app.theme.alert).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(": {} bpm", alert.body)),
            Span::styled(
                format!(
                    "  (raised {}, {} total)",
                    raised_at.format("%H:%M:%S"),
                    tray.alert_count
                ),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]),
        None => Line::from(Span::styled(
            "No alerts",
            Style::default().add_modifier(Modifier::DIM),
        )),
    }
}
