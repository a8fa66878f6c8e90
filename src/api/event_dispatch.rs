use std::time::Instant;

use tracing::{debug, trace};

use crate::backend::StatisticsBackend;
use crate::core::MetricFamily;
use crate::error::{TimelineError, TimelineResult};
use crate::events::{
    ConnectionsFilters, InboundEvent, NotificationKind, TimelineEvent, TimelineListener,
};

use super::{ReloadOutcome, ReloadTrigger, TimelinePanel};

/// Effect of one inbound bus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Reloaded(ReloadOutcome),
    SelectionApplied,
    /// External selection outside the series bounds.
    SelectionDropped,
    Ignored,
}

impl<B: StatisticsBackend> TimelinePanel<B> {
    /// Routes one inbound bus event.
    ///
    /// Fetch errors from triggered reloads are returned; state stays as it was.
    pub fn handle_event(
        &mut self,
        event: InboundEvent,
        now: Instant,
    ) -> TimelineResult<EventOutcome> {
        trace!(topic = %event.topic(), "inbound event");
        match event {
            InboundEvent::ConnectionsFilters(filters) => {
                if !self.merge_filters(filters) {
                    return Ok(EventOutcome::Ignored);
                }
                self.reload(ReloadTrigger::FiltersChanged, now)
                    .map(EventOutcome::Reloaded)
            }
            InboundEvent::ConnectionUpdates(payload) => {
                if self.receive_external_selection(payload.from, payload.to) {
                    Ok(EventOutcome::SelectionApplied)
                } else {
                    Ok(EventOutcome::SelectionDropped)
                }
            }
            InboundEvent::Notifications(notification) => {
                let family = self.metric.family();
                let trigger = match (notification.kind(), family) {
                    (NotificationKind::ServicesEdited, MetricFamily::Services) => {
                        ReloadTrigger::ServicesEdited
                    }
                    (NotificationKind::RulesChanged, MetricFamily::Rules) => {
                        ReloadTrigger::RulesChanged
                    }
                    (NotificationKind::CaptureCompleted, _) => ReloadTrigger::CaptureCompleted,
                    _ => {
                        trace!(event = %notification.event, "notification ignored");
                        return Ok(EventOutcome::Ignored);
                    }
                };
                self.reload(trigger, now).map(EventOutcome::Reloaded)
            }
        }
    }

    /// Decodes a raw bus message and routes it.
    pub fn handle_topic_json(
        &mut self,
        topic: &str,
        payload: &str,
        now: Instant,
    ) -> TimelineResult<EventOutcome> {
        let event = InboundEvent::from_topic_json(topic, payload)?;
        self.handle_event(event, now)
    }

    /// Registers an outbound listener with a unique identifier.
    pub fn register_listener(&mut self, listener: Box<dyn TimelineListener>) -> TimelineResult<()> {
        let listener_id = listener.id().to_owned();
        if listener_id.is_empty() {
            return Err(TimelineError::InvalidData(
                "listener id must not be empty".to_owned(),
            ));
        }
        if self.has_listener(&listener_id) {
            return Err(TimelineError::InvalidData(format!(
                "listener with id `{listener_id}` is already registered"
            )));
        }
        self.listeners.push(listener);
        Ok(())
    }

    /// Unregisters a listener by id. Returns `true` when removed.
    pub fn unregister_listener(&mut self, listener_id: &str) -> bool {
        if let Some(position) = self
            .listeners
            .iter()
            .position(|entry| entry.id() == listener_id)
        {
            self.listeners.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn has_listener(&self, listener_id: &str) -> bool {
        self.listeners
            .iter()
            .any(|listener| listener.id() == listener_id)
    }

    pub(super) fn emit(&mut self, event: TimelineEvent) {
        debug!(
            topic = %event.topic(),
            listeners = self.listeners.len(),
            "publishing timeline event"
        );
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }

    /// Applies the keys present in a filters payload. Returns `true` when any
    /// filter changed.
    fn merge_filters(&mut self, update: ConnectionsFilters) -> bool {
        let mut changed = false;
        if let Some(port) = update.service_port {
            if port != self.filters.service_port {
                self.filters.service_port = port;
                changed = true;
            }
        }
        if let Some(rules) = update.matched_rules {
            if rules != self.filters.matched_rules {
                self.filters.matched_rules = rules;
                changed = true;
            }
        }
        if changed {
            debug!(filters = ?self.filters, "filters changed");
        }
        changed
    }
}
