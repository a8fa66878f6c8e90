use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::core::primitives::parse_instant;
use crate::core::{ColumnKey, Metric, Sample};
use crate::error::{TimelineError, TimelineResult};

/// Service descriptor from `/api/services`. Unknown fields are preserved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Services keyed by port, in backend order.
pub type ServiceMap = IndexMap<String, ServiceDescriptor>;

/// Rule descriptor from `/api/rules`. Unknown fields are preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RuleDescriptor {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            color: None,
            extra: Map::new(),
        }
    }
}

/// Which entity columns a statistics request asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnSelector {
    Ports(Vec<ColumnKey>),
    RuleIds(Vec<ColumnKey>),
    /// No column restriction (all rules).
    Unrestricted,
}

/// Parameters of one `/api/statistics` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsQuery {
    pub metric: Metric,
    pub columns: ColumnSelector,
}

impl StatisticsQuery {
    /// Ordered query pairs: `metric` first, then repeated `ports` or `rules_ids`.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("metric", self.metric.as_str().to_owned())];
        match &self.columns {
            ColumnSelector::Ports(ports) => {
                pairs.extend(ports.iter().map(|port| ("ports", port.clone())));
            }
            ColumnSelector::RuleIds(ids) => {
                pairs.extend(ids.iter().map(|id| ("rules_ids", id.clone())));
            }
            ColumnSelector::Unrestricted => {}
        }
        pairs
    }

    /// Form-encoded query string (without the leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct StatisticsRecord {
    range_start: String,
    #[serde(flatten)]
    metrics: Map<String, Value>,
}

/// Decodes a `/api/statistics` body for `metric`.
///
/// Each record is `{range_start, <metric>: {<column>: number}}`; a missing or
/// `null` metric object yields a sample without values.
pub fn decode_statistics(metric: Metric, body: &str) -> TimelineResult<Vec<Sample>> {
    let records: Vec<StatisticsRecord> = serde_json::from_str(body)
        .map_err(|e| TimelineError::Decode(format!("statistics body: {e}")))?;

    records
        .into_iter()
        .map(|record| {
            let mut sample = Sample::new(parse_instant(&record.range_start)?);
            match record.metrics.get(metric.as_str()) {
                None | Some(Value::Null) => {}
                Some(Value::Object(columns)) => {
                    for (column, value) in columns {
                        match value {
                            Value::Null => {}
                            Value::Number(number) => {
                                let value = number.as_f64().ok_or_else(|| {
                                    TimelineError::Decode(format!(
                                        "column `{column}` value is not representable as f64"
                                    ))
                                })?;
                                sample.values.insert(column.clone(), value);
                            }
                            other => {
                                return Err(TimelineError::Decode(format!(
                                    "column `{column}` value must be numeric, got {other}"
                                )));
                            }
                        }
                    }
                }
                Some(other) => {
                    return Err(TimelineError::Decode(format!(
                        "`{metric}` must be an object, got {other}"
                    )));
                }
            }
            Ok(sample)
        })
        .collect()
}
