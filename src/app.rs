//! Terminal application state.

use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::host::TrayState;
use crate::monitor::{MonitorHandle, MonitorStatus};
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
///
/// The monitor runs on its own task; the app only reads what it publishes and
/// forwards user actions to it.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    monitor: Option<MonitorHandle>,
    tray: watch::Receiver<TrayState>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app for a spawned monitor and the tray it draws into.
    pub fn new(monitor: MonitorHandle, tray: watch::Receiver<TrayState>, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            monitor: Some(monitor),
            tray,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.monitor
            .as_ref()
            .map_or("stopped", MonitorHandle::source_description)
    }

    pub fn threshold(&self) -> Option<u32> {
        self.monitor.as_ref().map(MonitorHandle::threshold)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.monitor.as_ref().map(MonitorHandle::interval)
    }

    /// Latest tray state published by the monitor.
    pub fn tray(&self) -> TrayState {
        self.tray.borrow().clone()
    }

    /// Latest monitor status, if the monitor is still attached.
    pub fn monitor_status(&self) -> Option<MonitorStatus> {
        self.monitor.as_ref().map(MonitorHandle::status)
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        self.status_message
            .as_ref()
            .filter(|(_, set_at)| set_at.elapsed() < STATUS_MESSAGE_TTL)
            .map(|(message, _)| message.as_str())
    }

    /// Ask the monitor for an immediate tick.
    pub fn request_refresh(&mut self) {
        let queued = self.monitor.as_ref().is_some_and(MonitorHandle::refresh_now);
        let message = if queued {
            "Refresh requested"
        } else {
            "Refresh already pending"
        };
        self.set_status_message(message.to_string());
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Detach the monitor so the caller can shut it down.
    pub fn take_monitor(&mut self) -> Option<MonitorHandle> {
        self.monitor.take()
    }
}
