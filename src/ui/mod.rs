//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`tray`]: The indicator glyph drawn with half blocks, its tooltip and the last alert
//! - [`common`]: Shared components (header, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Tray panel (tray::render)            │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod common;
pub mod theme;
pub mod tray;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

pub use theme::Theme;
pub use tray::GlyphView;

use crate::app::App;

/// Draw one frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let [header, content, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(6),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    common::render_header(frame, app, header);
    tray::render(frame, app, content);
    common::render_status_bar(frame, app, status);

    if app.show_help {
        common::render_help(frame, app, frame.area());
    }
}
