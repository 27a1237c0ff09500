//! Refresh loop behaviour against scripted sources and recording hosts.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

use pulsetray::monitor::MIN_REFRESH_INTERVAL;
use pulsetray::render::DisplayZone;
use pulsetray::{
    Alert, FetchError, IconId, IndicatorRenderer, Measurement, MeasurementSource, Monitor,
    NotificationSink, Palette, Phase, RenderOptions, Severity, StatusIconHost, ThresholdPolicy,
    TickOutcome, Timestamp, Watermark,
};

// -- fakes -------------------------------------------------------------------

type Scripted = Result<Option<Measurement>, FetchError>;

/// Returns scripted results in order, then `Ok(None)` forever.
#[derive(Debug, Clone, Default)]
struct ScriptedSource {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    queries: Arc<Mutex<Vec<Timestamp>>>,
}

impl ScriptedSource {
    fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            queries: Arc::default(),
        }
    }

    fn queries(&self) -> Vec<Timestamp> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MeasurementSource for ScriptedSource {
    async fn fetch_latest(&self, since: Timestamp) -> Result<Option<Measurement>, FetchError> {
        self.queries.lock().unwrap().push(since);
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    fn description(&self) -> &str {
        "scripted"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostCall {
    Install { id: IconId, text: String, alert: bool },
    Release(IconId),
}

#[derive(Debug, Clone, Default)]
struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
    next_id: IconId,
}

impl RecordingHost {
    fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    fn installed_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Install { text, .. } => Some(text),
                HostCall::Release(_) => None,
            })
            .collect()
    }
}

impl StatusIconHost for RecordingHost {
    fn install(&mut self, indicator: &pulsetray::RenderedIndicator) -> IconId {
        self.next_id += 1;
        self.calls.lock().unwrap().push(HostCall::Install {
            id: self.next_id,
            text: indicator.status_text.clone(),
            alert: indicator.alert,
        });
        self.next_id
    }

    fn release(&mut self, icon: IconId) {
        self.calls.lock().unwrap().push(HostCall::Release(icon));
    }
}

#[derive(Debug, Clone, Default)]
struct RecordingSink {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

impl RecordingSink {
    fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn alert(&mut self, alert: &Alert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}

// -- helpers -----------------------------------------------------------------

fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

fn sample(rfc3339: &str, bpm: u32) -> Scripted {
    Ok(Some(Measurement::new(at(rfc3339), bpm)))
}

fn utc_renderer() -> IndicatorRenderer {
    IndicatorRenderer::new(RenderOptions::default(), Palette::light())
        .with_zone(DisplayZone::Fixed(FixedOffset::east_opt(0).unwrap()))
}

struct Harness {
    monitor: Monitor,
    source: ScriptedSource,
    host: RecordingHost,
    sink: RecordingSink,
}

fn harness<S: MeasurementSource + Clone + 'static>(source: S, threshold: u32) -> (Monitor, S, RecordingHost, RecordingSink) {
    let host = RecordingHost::default();
    let sink = RecordingSink::default();
    let monitor = Monitor::new(
        Box::new(source.clone()),
        ThresholdPolicy::new(threshold),
        utc_renderer(),
        Box::new(host.clone()),
        Box::new(sink.clone()),
    );
    (monitor, source, host, sink)
}

fn scripted(script: Vec<Scripted>, threshold: u32) -> Harness {
    let (monitor, source, host, sink) = harness(ScriptedSource::new(script), threshold);
    Harness {
        monitor,
        source,
        host,
        sink,
    }
}

// -- single ticks --------------------------------------------------------------

#[tokio::test]
async fn test_placeholder_installed_before_first_tick() {
    let h = scripted(vec![], 100);
    let indicator = h.monitor.current_indicator().unwrap();
    assert!(indicator.is_placeholder());
    assert_eq!(indicator.status_text, "No heart rate data yet");
    assert!(!indicator.alert);
    assert_eq!(h.host.installed_texts(), vec!["No heart rate data yet"]);
}

#[tokio::test]
async fn test_normal_reading_has_no_alert() {
    let mut h = scripted(vec![sample("2024-05-01T10:00:00+00:00", 85)], 100);

    let outcome = h.monitor.tick().await;

    assert_eq!(outcome, TickOutcome::Updated { bpm: 85, alert: false });
    let indicator = h.monitor.current_indicator().unwrap();
    assert_eq!(indicator.status_text, "85 at 10:00:00");
    assert!(!indicator.alert);
    assert!(h.sink.alerts().is_empty());
}

#[tokio::test]
async fn test_reading_above_threshold_alerts_once() {
    let mut h = scripted(vec![sample("2024-05-01T10:00:00+00:00", 101)], 100);

    let outcome = h.monitor.tick().await;

    assert_eq!(outcome, TickOutcome::Updated { bpm: 101, alert: true });
    let indicator = h.monitor.current_indicator().unwrap();
    assert_eq!(indicator.status_text, "101 at 10:00:00");
    assert!(indicator.alert);

    let alerts = h.sink.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].title, "Heart rate at 10:00:00");
    assert_eq!(alerts[0].body, "101");
    assert_eq!(alerts[0].severity, Severity::Warning);
}

#[tokio::test]
async fn test_reading_equal_to_threshold_does_not_alert() {
    let mut h = scripted(vec![sample("2024-05-01T10:00:00+00:00", 100)], 100);

    let outcome = h.monitor.tick().await;

    assert_eq!(outcome, TickOutcome::Updated { bpm: 100, alert: false });
    assert!(h.sink.alerts().is_empty());
}

#[tokio::test]
async fn test_first_query_starts_at_lookback() {
    let mut h = scripted(vec![], 100);

    let before = Utc::now();
    h.monitor.tick().await;
    let after = Utc::now();

    let queries = h.source.queries();
    assert_eq!(queries.len(), 1);
    let start = queries[0].with_timezone(&Utc);
    assert!(start >= before - TimeDelta::minutes(120));
    assert!(start <= after - TimeDelta::minutes(120));
}

#[tokio::test]
async fn test_custom_lookback() {
    let mut h = scripted(vec![], 100);
    h.monitor = h
        .monitor
        .with_watermark(Watermark::with_lookback(TimeDelta::minutes(15)));

    let before = Utc::now();
    h.monitor.tick().await;

    let start = h.source.queries()[0].with_timezone(&Utc);
    assert!(start >= before - TimeDelta::minutes(15));
    assert!(start < before - TimeDelta::minutes(14));
}

#[tokio::test]
async fn test_query_resumes_one_second_after_last_sample() {
    let mut h = scripted(vec![sample("2024-05-01T10:00:00+00:00", 85), Ok(None)], 100);

    h.monitor.tick().await;
    assert_eq!(h.monitor.tick().await, TickOutcome::NoData);
    h.monitor.tick().await;

    let queries = h.source.queries();
    assert_eq!(queries[1], at("2024-05-01T10:00:01+00:00"));
    // NoData does not move the watermark
    assert_eq!(queries[2], at("2024-05-01T10:00:01+00:00"));
}

#[tokio::test]
async fn test_no_data_leaves_indicator_unchanged() {
    let mut h = scripted(vec![sample("2024-05-01T10:00:00+00:00", 85), Ok(None)], 100);

    h.monitor.tick().await;
    let before = h.monitor.current_indicator().cloned();
    let calls_before = h.host.calls().len();

    assert_eq!(h.monitor.tick().await, TickOutcome::NoData);

    assert_eq!(h.monitor.current_indicator().cloned(), before);
    assert_eq!(h.host.calls().len(), calls_before);
    assert!(h.sink.alerts().is_empty());
}

#[tokio::test]
async fn test_fetch_error_keeps_indicator_and_watermark() {
    let mut h = scripted(
        vec![
            sample("2024-05-01T10:00:00+00:00", 85),
            Err(FetchError::Connection("connection reset".to_string())),
        ],
        100,
    );

    h.monitor.tick().await;
    let before = h.monitor.current_indicator().cloned();
    let watermark = h.monitor.watermark().last();

    let outcome = h.monitor.tick().await;

    assert!(matches!(outcome, TickOutcome::Failed(ref msg) if msg.contains("connection reset")));
    assert_eq!(h.monitor.current_indicator().cloned(), before);
    assert_eq!(h.monitor.watermark().last(), watermark);
    assert!(h.sink.alerts().is_empty());

    // The next tick still runs normally
    assert_eq!(h.monitor.tick().await, TickOutcome::NoData);
}

#[tokio::test]
async fn test_fetch_error_before_any_data_keeps_placeholder() {
    let mut h = scripted(vec![Err(FetchError::Timeout)], 100);

    assert!(matches!(h.monitor.tick().await, TickOutcome::Failed(_)));
    assert!(h.monitor.current_indicator().unwrap().is_placeholder());
    assert!(!h.monitor.watermark().is_set());
}

#[tokio::test]
async fn test_watermark_never_moves_backwards() {
    let mut h = scripted(
        vec![
            sample("2024-05-01T10:00:00+00:00", 80),
            sample("2024-05-01T09:59:00+00:00", 120),
            Err(FetchError::Timeout),
            sample("2024-05-01T10:00:00+00:00", 81),
            sample("2024-05-01T10:05:00+00:00", 82),
        ],
        100,
    );

    let mut previous = None;
    let mut outcomes = Vec::new();
    for _ in 0..5 {
        outcomes.push(h.monitor.tick().await);
        let current = h.monitor.watermark().last();
        assert!(current >= previous, "watermark regressed: {:?} -> {:?}", previous, current);
        previous = current;
    }

    // The stale sample is ignored entirely, including its alert
    assert_eq!(outcomes[1], TickOutcome::NoData);
    assert!(h.sink.alerts().is_empty());
    assert_eq!(previous, Some(at("2024-05-01T10:05:00+00:00")));
}

#[tokio::test]
async fn test_new_icon_installed_before_old_released() {
    let mut h = scripted(
        vec![
            sample("2024-05-01T10:00:00+00:00", 85),
            sample("2024-05-01T10:01:00+00:00", 105),
        ],
        100,
    );

    h.monitor.tick().await;
    h.monitor.tick().await;
    h.monitor.shutdown();

    assert_eq!(
        h.host.calls(),
        vec![
            HostCall::Install {
                id: 1,
                text: "No heart rate data yet".to_string(),
                alert: false
            },
            HostCall::Install {
                id: 2,
                text: "85 at 10:00:00".to_string(),
                alert: false
            },
            HostCall::Release(1),
            HostCall::Install {
                id: 3,
                text: "105 at 10:01:00".to_string(),
                alert: true
            },
            HostCall::Release(2),
            HostCall::Release(3),
        ]
    );
}

#[tokio::test]
async fn test_source_label_in_text_and_alert() {
    let source = ScriptedSource::new(vec![Ok(Some(
        Measurement::new(at("2024-05-01T10:00:00+00:00"), 130).with_source("workout"),
    ))]);
    let host = RecordingHost::default();
    let sink = RecordingSink::default();
    let renderer = IndicatorRenderer::new(
        RenderOptions {
            include_source_label: true,
            ..Default::default()
        },
        Palette::dark(),
    )
    .with_zone(DisplayZone::Fixed(FixedOffset::east_opt(0).unwrap()));
    let mut monitor = Monitor::new(
        Box::new(source),
        ThresholdPolicy::new(100),
        renderer,
        Box::new(host.clone()),
        Box::new(sink.clone()),
    );

    monitor.tick().await;

    assert_eq!(
        monitor.current_indicator().unwrap().status_text,
        "130 at 10:00:00 (workout)"
    );
    assert_eq!(sink.alerts()[0].title, "workout heart rate at 10:00:00");
}

#[tokio::test]
async fn test_status_published_after_tick() {
    let mut h = scripted(vec![sample("2024-05-01T10:00:00+00:00", 85)], 100);
    let status = h.monitor.subscribe();

    h.monitor.tick().await;

    let status = status.borrow().clone();
    assert_eq!(status.phase, Phase::Idle);
    assert_eq!(status.ticks, 1);
    assert_eq!(status.last_outcome, Some(TickOutcome::Updated { bpm: 85, alert: false }));
    assert_eq!(status.watermark, Some(at("2024-05-01T10:00:00+00:00")));
    assert!(status.last_tick_at.is_some());
}

// -- the spawned loop ------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_loop_ticks_at_start_and_every_interval() {
    let h = scripted(vec![], 100);
    let source = h.source.clone();

    let handle = h.monitor.spawn(Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(150)).await;

    // t = 0, 60, 120
    assert_eq!(handle.status().ticks, 3);
    assert_eq!(source.queries().len(), 3);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_refresh_now_runs_an_extra_tick() {
    let h = scripted(vec![], 100);
    let handle = h.monitor.spawn(Duration::from_secs(3600));
    let mut status = handle.subscribe();

    status.wait_for(|s| s.ticks >= 1).await.unwrap();
    assert!(handle.refresh_now());
    tokio::time::timeout(Duration::from_secs(5), status.wait_for(|s| s.ticks >= 2))
        .await
        .expect("refresh tick ran")
        .unwrap();

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_runs_at_the_minimum() {
    let h = scripted(vec![], 100);
    let source = h.source.clone();

    let handle = h.monitor.spawn(Duration::ZERO);
    assert_eq!(handle.interval(), MIN_REFRESH_INTERVAL);
    tokio::time::sleep(Duration::from_millis(2500)).await;

    // t = 0, 1, 2
    assert_eq!(source.queries().len(), 3);

    handle.shutdown().await;
}

/// Sleeps before answering and records how many fetches overlap.
#[derive(Debug, Clone, Default)]
struct SlowSource {
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl MeasurementSource for SlowSource {
    async fn fetch_latest(&self, _since: Timestamp) -> Result<Option<Measurement>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(90)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(None)
    }

    fn description(&self) -> &str {
        "slow"
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetch_never_overlaps_next_tick() {
    let (monitor, source, _host, _sink) = harness(SlowSource::default(), 100);

    let handle = monitor.spawn(Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(400)).await;

    assert!(source.calls.load(Ordering::SeqCst) >= 2);
    assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);

    handle.shutdown().await;
}

/// A fetch that never completes.
#[derive(Debug, Clone, Default)]
struct PendingSource;

#[async_trait]
impl MeasurementSource for PendingSource {
    async fn fetch_latest(&self, _since: Timestamp) -> Result<Option<Measurement>, FetchError> {
        std::future::pending().await
    }

    fn description(&self) -> &str {
        "pending"
    }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_abandons_fetch_and_releases_icon() {
    let (monitor, _source, host, sink) = harness(PendingSource, 100);

    let handle = monitor.spawn(Duration::from_secs(60));
    let mut status = handle.subscribe();
    status.wait_for(|s| s.phase == Phase::Fetching).await.unwrap();

    handle.shutdown().await;

    let status = status.borrow().clone();
    assert_eq!(status.phase, Phase::Idle);
    assert_eq!(status.ticks, 0);
    assert_eq!(status.watermark, None);
    assert_eq!(host.calls().last(), Some(&HostCall::Release(1)));
    assert!(sink.alerts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_monitor() {
    let h = scripted(vec![], 100);
    let host = h.host.clone();

    let handle = h.monitor.spawn(Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(1)).await;
    drop(handle);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(host.calls().last(), Some(&HostCall::Release(1)));
}
