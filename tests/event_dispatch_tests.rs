use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use timeline_panel::api::{EventOutcome, ReloadOutcome};
use timeline_panel::backend::{InMemoryBackend, RuleDescriptor, ServiceDescriptor, ServiceMap};
use timeline_panel::core::{Metric, Sample};
use timeline_panel::events::{
    ConnectionsFilters, InboundEvent, Notification, SelectionPayload, TimelineEvent,
    TimelineListener, Topic,
};
use timeline_panel::{TimelineConfig, TimelineError, TimelinePanel};

fn at(minute: i64) -> DateTime<Utc> {
    "2024-05-01T12:00:00Z"
        .parse::<DateTime<Utc>>()
        .expect("base instant")
        + TimeDelta::minutes(minute)
}

fn backend() -> InMemoryBackend {
    let mut services = ServiceMap::new();
    services.insert("80".to_owned(), ServiceDescriptor::default());
    services.insert("443".to_owned(), ServiceDescriptor::default());
    let samples = (0..=20)
        .map(|minute| Sample::new(at(minute)).with_value("80", 1.0))
        .collect();
    InMemoryBackend::new()
        .with_services(services)
        .with_rules(vec![RuleDescriptor::new("r1")])
        .with_statistics(samples)
}

fn mounted(metric: Metric) -> TimelinePanel<InMemoryBackend> {
    let mut panel =
        TimelinePanel::new(backend(), TimelineConfig::new(metric)).expect("panel init");
    panel.mount(Instant::now()).expect("mount");
    panel
}

fn query_count(panel: &TimelinePanel<InMemoryBackend>) -> usize {
    panel.backend().recorded_queries().len()
}

#[derive(Clone)]
struct RecordingListener {
    id: String,
    events: Rc<RefCell<Vec<TimelineEvent>>>,
}

impl RecordingListener {
    fn new(id: impl Into<String>, events: Rc<RefCell<Vec<TimelineEvent>>>) -> Self {
        Self {
            id: id.into(),
            events,
        }
    }
}

impl TimelineListener for RecordingListener {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: &TimelineEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[test]
fn filter_change_reloads_once() {
    let mut panel = mounted(Metric::ConnectionsPerService);
    assert_eq!(query_count(&panel), 1);

    let outcome = panel
        .handle_event(
            InboundEvent::ConnectionsFilters(ConnectionsFilters {
                service_port: Some(Some("443".to_owned())),
                matched_rules: Some(vec!["r1".to_owned()]),
            }),
            Instant::now(),
        )
        .expect("filters");

    assert!(matches!(
        outcome,
        EventOutcome::Reloaded(ReloadOutcome::Loaded { .. })
    ));
    assert_eq!(query_count(&panel), 2);
    assert_eq!(panel.filters().service_port.as_deref(), Some("443"));
    assert_eq!(panel.filters().matched_rules, vec!["r1"]);
    assert_eq!(panel.columns(), ["443".to_owned()].as_slice());
}

#[test]
fn unchanged_or_absent_filters_do_not_reload() {
    let mut panel = mounted(Metric::ConnectionsPerService);

    let outcome = panel
        .handle_topic_json("connections_filters", "{}", Instant::now())
        .expect("empty filters");
    assert_eq!(outcome, EventOutcome::Ignored);

    let outcome = panel
        .handle_topic_json(
            "connections_filters",
            r#"{"service_port": null, "matched_rules": []}"#,
            Instant::now(),
        )
        .expect("same filters");
    assert_eq!(outcome, EventOutcome::Ignored);
    assert_eq!(query_count(&panel), 1);

    let outcome = panel
        .handle_topic_json(
            "connections_filters",
            r#"{"service_port": 80}"#,
            Instant::now(),
        )
        .expect("numeric port");
    assert!(matches!(outcome, EventOutcome::Reloaded(_)));
    assert_eq!(panel.filters().service_port.as_deref(), Some("80"));

    let outcome = panel
        .handle_topic_json(
            "connections_filters",
            r#"{"service_port": ""}"#,
            Instant::now(),
        )
        .expect("cleared port");
    assert!(matches!(outcome, EventOutcome::Reloaded(_)));
    assert_eq!(panel.filters().service_port, None);
    assert_eq!(query_count(&panel), 3);
}

#[test]
fn connection_updates_follow_bounds() {
    let mut panel = mounted(Metric::ConnectionsPerService);

    let applied = panel
        .handle_event(
            InboundEvent::ConnectionUpdates(SelectionPayload {
                from: at(3),
                to: at(6),
            }),
            Instant::now(),
        )
        .expect("update");
    assert_eq!(applied, EventOutcome::SelectionApplied);

    let dropped = panel
        .handle_topic_json(
            "connection_updates",
            r#"{"from": "2024-05-01T11:00:00Z", "to": "2024-05-01T12:05:00Z"}"#,
            Instant::now(),
        )
        .expect("update");
    assert_eq!(dropped, EventOutcome::SelectionDropped);
    assert_eq!(
        panel.selection().map(|range| (range.begin(), range.end())),
        Some((at(3), at(6)))
    );
}

#[test]
fn notifications_reload_by_metric_family() {
    let now = Instant::now();
    let mut services = mounted(Metric::ConnectionsPerService);
    let mut rules = mounted(Metric::MatchedRules);

    let notify = |panel: &mut TimelinePanel<InMemoryBackend>, event: &str| {
        panel
            .handle_event(InboundEvent::Notifications(Notification::new(event)), now)
            .expect("notification")
    };

    assert!(matches!(notify(&mut services, "services.edit"), EventOutcome::Reloaded(_)));
    assert_eq!(notify(&mut services, "rules.edit"), EventOutcome::Ignored);
    assert!(matches!(notify(&mut services, "pcap.completed"), EventOutcome::Reloaded(_)));
    assert_eq!(notify(&mut services, "timeline.range.large"), EventOutcome::Ignored);

    assert_eq!(notify(&mut rules, "services.edit"), EventOutcome::Ignored);
    assert!(matches!(notify(&mut rules, "rules.edit"), EventOutcome::Reloaded(_)));
    assert!(matches!(notify(&mut rules, "rules.delete"), EventOutcome::Reloaded(_)));
    assert!(matches!(notify(&mut rules, "pcap.completed"), EventOutcome::Reloaded(_)));
    assert_eq!(notify(&mut rules, "capture.started"), EventOutcome::Ignored);

    assert_eq!(query_count(&services), 3);
    assert_eq!(query_count(&rules), 4);
}

#[test]
fn reload_failure_from_event_is_returned() {
    let mut panel = mounted(Metric::ConnectionsPerService);
    panel.backend_mut().fail_with("timeout");

    let error = panel
        .handle_event(
            InboundEvent::Notifications(Notification::new("pcap.completed")),
            Instant::now(),
        )
        .expect_err("fetch fails");
    assert!(matches!(error, TimelineError::Fetch(_)));
    assert!(panel.series().is_some());
}

#[test]
fn malformed_or_outbound_topics_are_rejected() {
    let mut panel = mounted(Metric::ConnectionsPerService);

    assert!(matches!(
        panel.handle_topic_json("connection_updates", "{\"from\": 1}", Instant::now()),
        Err(TimelineError::Decode(_))
    ));
    assert!(matches!(
        panel.handle_topic_json("timeline_updates", "{}", Instant::now()),
        Err(TimelineError::InvalidData(_))
    ));
    assert!(panel
        .handle_topic_json("weather", "{}", Instant::now())
        .is_err());
}

#[test]
fn listener_registry_rejects_duplicates() {
    let mut panel = mounted(Metric::ConnectionsPerService);
    let events = Rc::new(RefCell::new(Vec::new()));

    panel
        .register_listener(Box::new(RecordingListener::new("bus", events.clone())))
        .expect("register");
    assert!(
        panel
            .register_listener(Box::new(RecordingListener::new("bus", events.clone())))
            .is_err()
    );
    assert!(
        panel
            .register_listener(Box::new(RecordingListener::new("", events.clone())))
            .is_err()
    );
    assert_eq!(panel.listener_count(), 1);
    assert!(panel.has_listener("bus"));

    assert!(panel.unregister_listener("bus"));
    assert!(!panel.unregister_listener("bus"));
    assert_eq!(panel.listener_count(), 0);
}

#[test]
fn outbound_events_carry_topic_and_payload() {
    let update = TimelineEvent::TimelineUpdates(SelectionPayload {
        from: at(0),
        to: at(5),
    });
    assert_eq!(update.topic(), Topic::TimelineUpdates);
    assert_eq!(
        update.payload_json().expect("payload"),
        r#"{"from":"2024-05-01T12:00:00Z","to":"2024-05-01T12:05:00Z"}"#
    );

    let notice = TimelineEvent::Notifications(Notification::timeline_range_large());
    assert_eq!(notice.topic().as_str(), "notifications");
    assert_eq!(
        notice.payload_json().expect("payload"),
        r#"{"event":"timeline.range.large"}"#
    );
}
