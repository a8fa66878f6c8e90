use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use timeline_panel::api::{PanelView, ReloadOutcome, ReloadTrigger};
use timeline_panel::backend::{InMemoryBackend, RuleDescriptor, ServiceDescriptor, ServiceMap};
use timeline_panel::core::{FilterState, Metric, Sample, TimeRange};
use timeline_panel::events::{NotificationKind, TimelineEvent, TimelineListener};
use timeline_panel::{TimelineConfig, TimelineError, TimelinePanel};

fn at(minute: i64) -> DateTime<Utc> {
    "2024-05-01T12:00:00Z"
        .parse::<DateTime<Utc>>()
        .expect("base instant")
        + TimeDelta::minutes(minute)
}

fn range(begin: i64, end: i64) -> TimeRange {
    TimeRange::new(at(begin), at(end)).expect("range")
}

fn samples(minutes: std::ops::RangeInclusive<i64>, column: &str) -> Vec<Sample> {
    minutes
        .map(|minute| Sample::new(at(minute)).with_value(column, 2.0))
        .collect()
}

fn backend() -> InMemoryBackend {
    let mut services = ServiceMap::new();
    services.insert("80".to_owned(), ServiceDescriptor::default());
    services.insert("443".to_owned(), ServiceDescriptor::default());
    InMemoryBackend::new()
        .with_services(services)
        .with_rules(vec![RuleDescriptor::new("r1"), RuleDescriptor::new("r2")])
        .with_statistics(samples(0..=30, "80"))
}

struct RecordingListener {
    events: Rc<RefCell<Vec<TimelineEvent>>>,
}

impl TimelineListener for RecordingListener {
    fn id(&self) -> &str {
        "recorder"
    }

    fn on_event(&mut self, event: &TimelineEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[test]
fn panel_shows_loading_until_first_reload() {
    let mut panel = TimelinePanel::new(backend(), TimelineConfig::default()).expect("panel init");
    assert_eq!(panel.view(), PanelView::Loading);
    assert_eq!(panel.applied_generation(), 0);

    let outcome = panel.mount(Instant::now()).expect("mount");
    assert_eq!(
        outcome,
        ReloadOutcome::Loaded {
            points: 33,
            span_capped: false
        }
    );
    assert_eq!(panel.applied_generation(), 1);
    assert_eq!(panel.columns(), ["80".to_owned(), "443".to_owned()].as_slice());
}

#[test]
fn stale_payload_is_discarded() {
    let now = Instant::now();
    let mut panel = TimelinePanel::new(backend(), TimelineConfig::default()).expect("panel init");

    let older = panel.begin_reload(Metric::ConnectionsPerService, ReloadTrigger::Mount);
    let newer = panel.begin_reload(Metric::MatchedRules, ReloadTrigger::MetricChanged);
    assert!(newer.generation() > older.generation());

    let older_payload = older.fetch(panel.backend()).expect("fetch older");
    let newer_payload = newer.fetch(panel.backend()).expect("fetch newer");

    assert!(matches!(
        panel.complete_reload(newer_payload, now),
        ReloadOutcome::Loaded { .. }
    ));
    assert_eq!(panel.complete_reload(older_payload, now), ReloadOutcome::Stale);
    assert_eq!(panel.metric(), Metric::MatchedRules);
    assert_eq!(panel.applied_generation(), newer.generation());
}

#[test]
fn fetch_failure_keeps_previous_state() {
    let now = Instant::now();
    let mut panel = TimelinePanel::new(backend(), TimelineConfig::default()).expect("panel init");
    panel.mount(now).expect("mount");
    let series_before = panel.series().cloned();
    let selection_before = panel.selection();

    panel.backend_mut().fail_with("connection refused");
    let error = panel
        .set_metric(Metric::ServerBytesPerService, now)
        .expect_err("fetch must fail");

    assert!(matches!(error, TimelineError::Fetch(_)));
    assert_eq!(panel.metric(), Metric::ConnectionsPerService);
    assert_eq!(panel.series().cloned(), series_before);
    assert_eq!(panel.selection(), selection_before);
    assert!(matches!(panel.view(), PanelView::Chart(_)));

    panel.backend_mut().clear_failure();
    panel
        .set_metric(Metric::ServerBytesPerService, now)
        .expect("retry");
    assert_eq!(panel.metric(), Metric::ServerBytesPerService);
}

#[test]
fn empty_result_shows_no_data_and_clears_selection() {
    let now = Instant::now();
    let mut panel = TimelinePanel::new(backend(), TimelineConfig::default()).expect("panel init");
    panel.mount(now).expect("mount");

    panel.backend_mut().set_statistics(Vec::new());
    let outcome = panel.reload(ReloadTrigger::Manual, now).expect("reload");

    assert_eq!(outcome, ReloadOutcome::Empty);
    assert_eq!(panel.view(), PanelView::NoData);
    assert!(panel.series().is_none());
    assert_eq!(panel.selection(), None);
    assert_eq!(panel.view_window(), None);
}

#[test]
fn reload_keeps_selection_clamped_to_new_bounds() {
    let now = Instant::now();
    let mut panel = TimelinePanel::new(backend(), TimelineConfig::default()).expect("panel init");
    panel.mount(now).expect("mount");
    assert!(panel.receive_external_selection(at(2), at(8)));

    panel.backend_mut().set_statistics(samples(5..=40, "80"));
    panel.reload(ReloadTrigger::Manual, now).expect("reload");
    assert_eq!(panel.series_bounds(), Some(range(4, 41)));
    assert_eq!(panel.selection(), Some(range(4, 8)));

    panel.backend_mut().set_statistics(samples(100..=120, "80"));
    panel.reload(ReloadTrigger::Manual, now).expect("reload");
    assert_eq!(panel.series_bounds(), Some(range(99, 121)));
    assert_eq!(panel.selection(), None);
}

#[test]
fn default_selection_applies_on_first_load_only() {
    let now = Instant::now();
    let mut panel = TimelinePanel::new(backend(), TimelineConfig::default()).expect("panel init");
    panel.mount(now).expect("mount");
    assert_eq!(panel.selection(), Some(range(21, 31)));

    panel.backend_mut().set_statistics(Vec::new());
    panel.reload(ReloadTrigger::Manual, now).expect("empty reload");
    assert_eq!(panel.selection(), None);

    panel.backend_mut().set_statistics(samples(0..=30, "80"));
    let outcome = panel.reload(ReloadTrigger::Manual, now).expect("reload");
    assert_eq!(
        outcome,
        ReloadOutcome::Loaded {
            points: 33,
            span_capped: false
        }
    );
    assert_eq!(panel.series_bounds(), Some(range(-1, 31)));
    assert_eq!(panel.selection(), None);
}

#[test]
fn span_cap_publishes_throttled_notice() {
    let t0 = Instant::now();
    let config = TimelineConfig::default().with_max_span(TimeDelta::minutes(10));
    let mut panel = TimelinePanel::new(backend(), config).expect("panel init");
    let events = Rc::new(RefCell::new(Vec::new()));
    panel
        .register_listener(Box::new(RecordingListener {
            events: events.clone(),
        }))
        .expect("register listener");

    let outcome = panel.mount(t0).expect("mount");
    assert_eq!(
        outcome,
        ReloadOutcome::Loaded {
            points: 11,
            span_capped: true
        }
    );
    panel
        .reload(ReloadTrigger::Manual, t0 + Duration::from_secs(10))
        .expect("reload");
    panel
        .reload(ReloadTrigger::Manual, t0 + Duration::from_secs(61))
        .expect("reload");

    let notices: Vec<NotificationKind> = events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            TimelineEvent::Notifications(notification) => Some(notification.kind()),
            TimelineEvent::TimelineUpdates(_) => None,
        })
        .collect();
    assert_eq!(
        notices,
        vec![
            NotificationKind::TimelineRangeLarge,
            NotificationKind::TimelineRangeLarge
        ]
    );
}

#[test]
fn filters_are_snapshotted_into_the_request() {
    let mut panel = TimelinePanel::new(backend(), TimelineConfig::default()).expect("panel init");
    let filters = FilterState {
        service_port: Some("443".to_owned()),
        matched_rules: Vec::new(),
    };
    panel
        .set_filters(filters.clone(), Instant::now())
        .expect("set filters");

    let request = panel.begin_reload(panel.metric(), ReloadTrigger::Manual);
    assert_eq!(request.filters(), &filters);
    assert_eq!(panel.columns(), ["443".to_owned()].as_slice());
}
