//! Host backed by the terminal UI.
//!
//! The monitor runs on a tokio task while the terminal is drawn from the main
//! thread. Icon and alert updates are published into a [`watch`] channel; the
//! UI only ever reads the latest [`TrayState`].

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::watch;

use super::{Alert, IconId, NotificationSink, StatusIconHost};
use crate::render::RenderedIndicator;

/// An icon currently installed in the terminal tray.
#[derive(Debug, Clone)]
pub struct InstalledIcon {
    pub id: IconId,
    pub indicator: RenderedIndicator,
}

/// Everything the terminal UI needs to draw the tray.
#[derive(Debug, Clone, Default)]
pub struct TrayState {
    pub icon: Option<InstalledIcon>,
    /// Most recent alert and when it was raised.
    pub last_alert: Option<(Alert, DateTime<Local>)>,
    /// Number of alerts raised since start.
    pub alert_count: u64,
}

/// [`StatusIconHost`] half of the terminal tray.
#[derive(Debug)]
pub struct TerminalTray {
    state: Arc<watch::Sender<TrayState>>,
    next_id: IconId,
}

/// [`NotificationSink`] half of the terminal tray.
#[derive(Debug)]
pub struct TerminalNotifier {
    state: Arc<watch::Sender<TrayState>>,
}

impl TerminalTray {
    /// Create the host, its notifier and the receiver the UI draws from.
    pub fn channel() -> (TerminalTray, TerminalNotifier, watch::Receiver<TrayState>) {
        let (tx, rx) = watch::channel(TrayState::default());
        let state = Arc::new(tx);
        let tray = TerminalTray {
            state: state.clone(),
            next_id: 0,
        };
        (tray, TerminalNotifier { state }, rx)
    }
}

impl StatusIconHost for TerminalTray {
    fn install(&mut self, indicator: &RenderedIndicator) -> IconId {
        self.next_id += 1;
        let icon = InstalledIcon {
            id: self.next_id,
            indicator: indicator.clone(),
        };
        self.state.send_modify(|state| state.icon = Some(icon));
        self.next_id
    }

    fn release(&mut self, icon: IconId) {
        self.state.send_if_modified(|state| {
            if state.icon.as_ref().map(|i| i.id) == Some(icon) {
                state.icon = None;
                true
            } else {
                false
            }
        });
    }
}

impl NotificationSink for TerminalNotifier {
    fn alert(&mut self, alert: &Alert) {
        let alert = alert.clone();
        self.state.send_modify(|state| {
            state.last_alert = Some((alert, Local::now()));
            state.alert_count += 1;
        });
    }
}
