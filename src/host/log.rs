//! Host that reports through the log instead of a display.

use tracing::{info, warn};

use super::{Alert, IconId, NotificationSink, Severity, StatusIconHost};
use crate::render::RenderedIndicator;

/// Logs every installed indicator.
#[derive(Debug, Default)]
pub struct LogHost {
    next_id: IconId,
}

impl LogHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusIconHost for LogHost {
    fn install(&mut self, indicator: &RenderedIndicator) -> IconId {
        self.next_id += 1;
        info!(
            icon = self.next_id,
            alert = indicator.alert,
            "{}",
            indicator.status_text
        );
        self.next_id
    }

    fn release(&mut self, _icon: IconId) {}
}

/// Logs alerts at warn level.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn alert(&mut self, alert: &Alert) {
        match alert.severity {
            Severity::Warning => warn!(title = %alert.title, "{}", alert.body),
        }
    }
}
