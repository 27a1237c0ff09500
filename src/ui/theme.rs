//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for readings at or below the threshold.
    pub normal: Color,
    /// Color for readings above the threshold and alert banners.
    pub alert: Color,
    /// Color for transient problems such as failed fetches.
    pub warning: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for section titles.
    pub header: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            normal: Color::Green,
            alert: Color::Red,
            warning: Color::Yellow,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            normal: Color::Green,
            alert: Color::Red,
            warning: Color::Yellow,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Pick a theme from a background luminance, dark when unknown.
    pub fn from_luma(luma: Option<f32>) -> Self {
        match luma {
            Some(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        Self::from_luma(terminal_light::luma().ok())
    }

    /// Style for a reading's text.
    pub fn reading_style(&self, alert: bool) -> Style {
        if alert {
            Style::default().fg(self.alert).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.normal)
        }
    }
}
