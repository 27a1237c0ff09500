//! Presentation collaborators.
//!
//! The monitor never touches a tray or notification API directly. It talks to
//! a [`StatusIconHost`] that installs and releases icons, and a
//! [`NotificationSink`] that shows alerts. [`IconSlot`] owns the ordering
//! rules between the two halves of an icon swap.
//!
//! Implementations:
//!
//! - [`terminal`]: publishes state to the terminal UI through a watch channel
//! - [`log`]: writes updates and alerts to the log (headless mode)

pub mod log;
pub mod terminal;

pub use self::log::{LogHost, LogNotifier};
pub use terminal::{InstalledIcon, TerminalNotifier, TerminalTray, TrayState};

use crate::render::RenderedIndicator;

/// Handle of an icon installed in a host.
pub type IconId = u64;

/// How loudly an alert should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
}

/// A notification raised for a reading above the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

/// Surface that displays the indicator (a tray icon, a terminal panel...).
pub trait StatusIconHost: Send {
    /// Install a new icon and make it visible.
    fn install(&mut self, indicator: &RenderedIndicator) -> IconId;

    /// Release a previously installed icon.
    fn release(&mut self, icon: IconId);
}

/// Receives alerts. Fire-and-forget.
pub trait NotificationSink: Send {
    fn alert(&mut self, alert: &Alert);
}

/// The currently installed icon and the host it lives in.
///
/// A replacement icon is always installed before the previous one is
/// released, so the host never shows an empty slot. Whatever is installed
/// when the slot is cleared or dropped gets released.
pub struct IconSlot {
    host: Box<dyn StatusIconHost>,
    current: Option<(IconId, RenderedIndicator)>,
}

impl IconSlot {
    pub fn new(host: Box<dyn StatusIconHost>) -> Self {
        Self {
            host,
            current: None,
        }
    }

    /// Install `indicator`, then release the icon it replaces.
    pub fn show(&mut self, indicator: RenderedIndicator) {
        let id = self.host.install(&indicator);
        if let Some((previous, _)) = self.current.replace((id, indicator)) {
            self.host.release(previous);
        }
    }

    /// The indicator currently on display.
    pub fn current(&self) -> Option<&RenderedIndicator> {
        self.current.as_ref().map(|(_, indicator)| indicator)
    }

    pub fn current_id(&self) -> Option<IconId> {
        self.current.as_ref().map(|(id, _)| *id)
    }

    /// Release the installed icon, if any.
    pub fn clear(&mut self) {
        if let Some((id, _)) = self.current.take() {
            self.host.release(id);
        }
    }
}

impl Drop for IconSlot {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for IconSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconSlot")
            .field("current", &self.current_id())
            .finish()
    }
}
