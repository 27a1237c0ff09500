//! The refresh loop.
//!
//! A [`Monitor`] owns every piece of mutable monitoring state: the watermark,
//! the threshold, and the installed indicator. Each tick moves it through
//!
//! ```text
//! Idle ──▶ Fetching ──┬──▶ Updated ──┐
//!                     ├──▶ NoData  ──┼──▶ Idle
//!                     └──▶ Failed  ──┘
//! ```
//!
//! [`Monitor::spawn`] runs ticks on a tokio task: one immediately, then one per
//! interval. Ticks never overlap because the task awaits each one before
//! looking at the timer again.

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use pulsetray_types::{Measurement, Timestamp};

use crate::data::{ThresholdPolicy, Watermark};
use crate::host::{IconSlot, NotificationSink, StatusIconHost};
use crate::render::{IndicatorRenderer, RenderedIndicator};
use crate::source::MeasurementSource;

/// Default time between ticks.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest interval [`Monitor::spawn`] will run at.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Where the monitor is within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Fetching,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new reading was displayed.
    Updated { bpm: u32, alert: bool },
    /// The source had nothing new.
    NoData,
    /// The fetch failed; nothing changed.
    Failed(String),
}

impl TickOutcome {
    /// Short label for display.
    pub fn label(&self) -> String {
        match self {
            TickOutcome::Updated { bpm, alert: true } => format!("updated ({} bpm, alert)", bpm),
            TickOutcome::Updated { bpm, alert: false } => format!("updated ({} bpm)", bpm),
            TickOutcome::NoData => "no new data".to_string(),
            TickOutcome::Failed(err) => format!("failed: {}", err),
        }
    }
}

/// Snapshot of the monitor published after every state change.
#[derive(Debug, Clone, Default)]
pub struct MonitorStatus {
    pub phase: Phase,
    pub ticks: u64,
    pub last_outcome: Option<TickOutcome>,
    pub last_tick_at: Option<DateTime<Local>>,
    pub watermark: Option<Timestamp>,
}

/// Refresh loop state.
pub struct Monitor {
    source: Box<dyn MeasurementSource>,
    watermark: Watermark,
    policy: ThresholdPolicy,
    renderer: IndicatorRenderer,
    icon: IconSlot,
    notifier: Box<dyn NotificationSink>,
    status: watch::Sender<MonitorStatus>,
}

impl Monitor {
    /// Create a monitor and install the "no data yet" placeholder.
    pub fn new(
        source: Box<dyn MeasurementSource>,
        policy: ThresholdPolicy,
        renderer: IndicatorRenderer,
        host: Box<dyn StatusIconHost>,
        notifier: Box<dyn NotificationSink>,
    ) -> Self {
        let mut icon = IconSlot::new(host);
        icon.show(renderer.placeholder());
        let (status, _) = watch::channel(MonitorStatus::default());

        Self {
            source,
            watermark: Watermark::new(),
            policy,
            renderer,
            icon,
            notifier,
            status,
        }
    }

    /// Replace the initial (unset) watermark, e.g. to change the lookback.
    pub fn with_watermark(mut self, watermark: Watermark) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn watermark(&self) -> &Watermark {
        &self.watermark
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// The indicator currently installed in the host.
    pub fn current_indicator(&self) -> Option<&RenderedIndicator> {
        self.icon.current()
    }

    /// Receive a [`MonitorStatus`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status.subscribe()
    }

    /// Run one tick.
    ///
    /// Failures are logged and reported in the outcome; they never leave the
    /// monitor in a different state than before the tick.
    pub async fn tick(&mut self) -> TickOutcome {
        let start = self.watermark.query_start();
        self.status.send_modify(|s| s.phase = Phase::Fetching);
        debug!(start = %start, source = self.source.description(), "fetching");

        let result = self.source.fetch_latest(start).await;

        let outcome = match result {
            Ok(Some(measurement)) => self.apply(measurement),
            Ok(None) => {
                debug!(start = %start, "no new samples");
                TickOutcome::NoData
            }
            Err(err) => {
                warn!(error = %err, "fetch failed; keeping previous indicator");
                TickOutcome::Failed(err.to_string())
            }
        };

        let watermark = self.watermark.last();
        self.status.send_modify(|s| {
            s.phase = Phase::Idle;
            s.ticks += 1;
            s.last_outcome = Some(outcome.clone());
            s.last_tick_at = Some(Local::now());
            s.watermark = watermark;
        });

        outcome
    }

    fn apply(&mut self, measurement: Measurement) -> TickOutcome {
        if !self.watermark.advance(measurement.timestamp) {
            return TickOutcome::NoData;
        }

        let alert = self.policy.is_over_threshold(measurement.bpm);
        let indicator = self.renderer.render(Some(&measurement), alert);
        info!(bpm = measurement.bpm, alert, "{}", indicator.status_text);
        self.icon.show(indicator);

        if alert {
            self.notifier.alert(&self.renderer.alert_for(&measurement));
        }

        TickOutcome::Updated {
            bpm: measurement.bpm,
            alert,
        }
    }

    /// Release the installed icon.
    pub fn shutdown(&mut self) {
        self.icon.clear();
    }

    /// Run the loop on a tokio task: one tick now, then one per `interval`.
    ///
    /// Intervals shorter than [`MIN_REFRESH_INTERVAL`] are raised to it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(self, interval: Duration) -> MonitorHandle {
        if interval < MIN_REFRESH_INTERVAL {
            warn!(
                requested_ms = interval.as_millis() as u64,
                "refresh interval too short; using the minimum"
            );
        }
        let interval = interval.max(MIN_REFRESH_INTERVAL);
        let (stop_tx, stop_rx) = watch::channel(false);
        // One slot: a refresh requested while one is pending is dropped.
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let status = self.subscribe();
        let source = self.source.description().to_string();
        let threshold = self.policy.threshold();

        let task = tokio::spawn(self.run(interval, stop_rx, refresh_rx));

        MonitorHandle {
            stop_tx,
            refresh_tx,
            status,
            task,
            source,
            threshold,
            interval,
        }
    }

    async fn run(
        mut self,
        interval: Duration,
        mut stop_rx: watch::Receiver<bool>,
        mut refresh_rx: mpsc::Receiver<()>,
    ) {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            source = self.source.description(),
            interval_secs = interval.as_secs(),
            threshold = self.policy.threshold(),
            "monitor started"
        );

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                Some(()) = refresh_rx.recv() => {
                    debug!("manual refresh");
                }
                _ = stop_rx.changed() => break,
            }

            // An in-flight fetch is abandoned on stop; state only changes
            // after a fetch completes.
            tokio::select! {
                _ = self.tick() => {}
                _ = stop_rx.changed() => break,
            }
        }

        // A cancelled tick leaves the phase at Fetching
        self.status.send_modify(|s| s.phase = Phase::Idle);
        self.shutdown();
        info!("monitor stopped");
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("source", &self.source.description())
            .field("watermark", &self.watermark)
            .field("policy", &self.policy)
            .field("icon", &self.icon)
            .finish()
    }
}

/// Controls a spawned [`Monitor`].
///
/// Dropping the handle stops the monitor.
#[derive(Debug)]
pub struct MonitorHandle {
    stop_tx: watch::Sender<bool>,
    refresh_tx: mpsc::Sender<()>,
    status: watch::Receiver<MonitorStatus>,
    task: JoinHandle<()>,
    source: String,
    threshold: u32,
    interval: Duration,
}

impl MonitorHandle {
    /// Request an extra tick. Returns `false` if one is already queued.
    pub fn refresh_now(&self) -> bool {
        self.refresh_tx.try_send(()).is_ok()
    }

    /// Latest published status.
    pub fn status(&self) -> MonitorStatus {
        self.status.borrow().clone()
    }

    /// Receiver for status updates.
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status.clone()
    }

    pub fn source_description(&self) -> &str {
        &self.source
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for the icon to be released.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "monitor task ended abnormally");
        }
    }
}
