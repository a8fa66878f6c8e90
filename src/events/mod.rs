//! Typed dashboard bus contracts.
//!
//! Each topic carries its own payload schema. The bus itself is a host
//! concern: inbound payloads are handed to `TimelinePanel::handle_event`,
//! outbound events reach registered [`TimelineListener`]s.

mod payloads;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

pub use payloads::{
    ConnectionsFilters, Notification, NotificationKind, SelectionPayload, TIMELINE_RANGE_LARGE,
};

/// Named bus topics the panel consumes or publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    ConnectionsFilters,
    ConnectionUpdates,
    Notifications,
    TimelineUpdates,
}

impl Topic {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::ConnectionsFilters => "connections_filters",
            Topic::ConnectionUpdates => "connection_updates",
            Topic::Notifications => "notifications",
            Topic::TimelineUpdates => "timeline_updates",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = TimelineError;

    fn from_str(s: &str) -> TimelineResult<Self> {
        match s {
            "connections_filters" => Ok(Topic::ConnectionsFilters),
            "connection_updates" => Ok(Topic::ConnectionUpdates),
            "notifications" => Ok(Topic::Notifications),
            "timeline_updates" => Ok(Topic::TimelineUpdates),
            other => Err(TimelineError::InvalidData(format!(
                "unknown bus topic `{other}`"
            ))),
        }
    }
}

/// Events the panel subscribes to.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    ConnectionsFilters(ConnectionsFilters),
    ConnectionUpdates(SelectionPayload),
    Notifications(Notification),
}

impl InboundEvent {
    #[must_use]
    pub fn topic(&self) -> Topic {
        match self {
            InboundEvent::ConnectionsFilters(_) => Topic::ConnectionsFilters,
            InboundEvent::ConnectionUpdates(_) => Topic::ConnectionUpdates,
            InboundEvent::Notifications(_) => Topic::Notifications,
        }
    }

    /// Decodes a JSON payload according to the schema of `topic`.
    pub fn from_topic_json(topic: &str, payload: &str) -> TimelineResult<Self> {
        let topic: Topic = topic.parse()?;
        let decode_error =
            |e: serde_json::Error| TimelineError::Decode(format!("`{topic}` payload: {e}"));
        match topic {
            Topic::ConnectionsFilters => serde_json::from_str(payload)
                .map(InboundEvent::ConnectionsFilters)
                .map_err(decode_error),
            Topic::ConnectionUpdates => serde_json::from_str(payload)
                .map(InboundEvent::ConnectionUpdates)
                .map_err(decode_error),
            Topic::Notifications => serde_json::from_str(payload)
                .map(InboundEvent::Notifications)
                .map_err(decode_error),
            Topic::TimelineUpdates => Err(TimelineError::InvalidData(
                "`timeline_updates` is published by the timeline, not consumed".to_owned(),
            )),
        }
    }
}

/// Events the panel publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineEvent {
    TimelineUpdates(SelectionPayload),
    Notifications(Notification),
}

impl TimelineEvent {
    #[must_use]
    pub fn topic(&self) -> Topic {
        match self {
            TimelineEvent::TimelineUpdates(_) => Topic::TimelineUpdates,
            TimelineEvent::Notifications(_) => Topic::Notifications,
        }
    }

    /// Payload JSON as published on the bus (without the topic envelope).
    pub fn payload_json(&self) -> TimelineResult<String> {
        let encoded = match self {
            TimelineEvent::TimelineUpdates(payload) => serde_json::to_string(payload),
            TimelineEvent::Notifications(payload) => serde_json::to_string(payload),
        };
        encoded.map_err(|e| {
            TimelineError::InvalidData(format!("failed to encode `{}` payload: {e}", self.topic()))
        })
    }
}

/// Observer of outbound panel events.
///
/// Listeners receive copies; they cannot reach back into panel state.
pub trait TimelineListener {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &TimelineEvent);
}
