use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Event name published when the timeline span had to be clamped.
pub const TIMELINE_RANGE_LARGE: &str = "timeline.range.large";

/// `connections_filters` payload.
///
/// A key that is absent leaves the corresponding filter untouched; an explicit
/// `null` service port clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionsFilters {
    #[serde(
        default,
        deserialize_with = "deserialize_present_port",
        skip_serializing_if = "Option::is_none"
    )]
    pub service_port: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rules: Option<Vec<String>>,
}

/// `{from, to}` payload shared by `connection_updates` and `timeline_updates`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPayload {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// `notifications` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub event: String,
}

/// Notification names the timeline reacts to or emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    ServicesEdited,
    RulesChanged,
    CaptureCompleted,
    TimelineRangeLarge,
    Other,
}

impl Notification {
    #[must_use]
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
        }
    }

    #[must_use]
    pub fn timeline_range_large() -> Self {
        Self::new(TIMELINE_RANGE_LARGE)
    }

    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        match self.event.as_str() {
            "services.edit" => NotificationKind::ServicesEdited,
            "pcap.completed" => NotificationKind::CaptureCompleted,
            TIMELINE_RANGE_LARGE => NotificationKind::TimelineRangeLarge,
            event if event.starts_with("rules") => NotificationKind::RulesChanged,
            _ => NotificationKind::Other,
        }
    }
}

/// Wraps the decoded port in `Some` so "key present" survives decoding.
/// Ports arrive as strings from the URL and as numbers from some emitters.
fn deserialize_present_port<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let port = match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(port) if port.is_empty() => None,
        serde_json::Value::String(port) => Some(port),
        serde_json::Value::Number(port) => Some(port.to_string()),
        other => {
            return Err(serde::de::Error::custom(format!(
                "service_port must be a string, number or null, got {other}"
            )));
        }
    };
    Ok(Some(port))
}
