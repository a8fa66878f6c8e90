use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

/// Metrics exposed by the statistics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    ConnectionsPerService,
    ClientBytesPerService,
    ServerBytesPerService,
    DurationPerService,
    MatchedRules,
}

/// Entity kind a metric is broken down by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricFamily {
    Services,
    Rules,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::ConnectionsPerService,
        Metric::ClientBytesPerService,
        Metric::ServerBytesPerService,
        Metric::DurationPerService,
        Metric::MatchedRules,
    ];

    /// Wire name used in the statistics query and response objects.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::ConnectionsPerService => "connections_per_service",
            Metric::ClientBytesPerService => "client_bytes_per_service",
            Metric::ServerBytesPerService => "server_bytes_per_service",
            Metric::DurationPerService => "duration_per_service",
            Metric::MatchedRules => "matched_rules",
        }
    }

    #[must_use]
    pub fn family(self) -> MetricFamily {
        match self {
            Metric::MatchedRules => MetricFamily::Rules,
            _ => MetricFamily::Services,
        }
    }

    /// Label shown in the metric picker.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::ConnectionsPerService => "Connections by Service",
            Metric::ClientBytesPerService => "Client Bytes by Service",
            Metric::ServerBytesPerService => "Server Bytes by Service",
            Metric::DurationPerService => "Duration by Service",
            Metric::MatchedRules => "Matched Rules",
        }
    }

    /// Unit-ish suffix shown next to tooltip values.
    #[must_use]
    pub fn value_label(self) -> &'static str {
        match self {
            Metric::ConnectionsPerService => "Connections",
            Metric::ClientBytesPerService => "Client Bytes",
            Metric::ServerBytesPerService => "Server Bytes",
            Metric::DurationPerService => "Duration",
            Metric::MatchedRules => "Rule",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = TimelineError;

    fn from_str(s: &str) -> TimelineResult<Self> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| TimelineError::UnknownMetric(s.to_owned()))
    }
}

/// Column filters shared with the connections panel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub service_port: Option<String>,
    pub matched_rules: Vec<String>,
}

impl FilterState {
    /// Reads `service_port` (first occurrence) and every `matched_rules`
    /// value from decoded query pairs.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Self::default();
        for (key, value) in pairs {
            match key.as_ref() {
                "service_port" if filters.service_port.is_none() => {
                    let value = value.as_ref();
                    if !value.is_empty() {
                        filters.service_port = Some(value.to_owned());
                    }
                }
                "matched_rules" => filters.matched_rules.push(value.as_ref().to_owned()),
                _ => {}
            }
        }
        filters
    }
}
