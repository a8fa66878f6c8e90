use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

/// Identifier of one plotted line: a service port or a rule id.
pub type ColumnKey = String;

/// Closed time interval with `begin <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> TimelineResult<Self> {
        if begin > end {
            return Err(TimelineError::InvalidRange { begin, end });
        }
        Ok(Self { begin, end })
    }

    /// Builds a range that must have a positive duration.
    ///
    /// Selections are always non-empty; zero or negative spans are rejected.
    pub fn non_empty(begin: DateTime<Utc>, end: DateTime<Utc>) -> TimelineResult<Self> {
        if begin >= end {
            return Err(TimelineError::InvalidRange { begin, end });
        }
        Ok(Self { begin, end })
    }

    /// Caller guarantees `begin <= end`.
    pub(crate) fn from_ordered(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(begin <= end);
        Self { begin, end }
    }

    #[must_use]
    pub fn begin(self) -> DateTime<Utc> {
        self.begin
    }

    #[must_use]
    pub fn end(self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn duration(self) -> TimeDelta {
        self.end - self.begin
    }

    #[must_use]
    pub fn contains(self, time: DateTime<Utc>) -> bool {
        self.begin <= time && time <= self.end
    }

    #[must_use]
    pub fn contains_range(self, other: TimeRange) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// Returns the overlap with `bounds`, or `None` when it would be empty.
    #[must_use]
    pub fn clamp_to(self, bounds: TimeRange) -> Option<TimeRange> {
        let begin = self.begin.max(bounds.begin);
        let end = self.end.min(bounds.end);
        (begin < end).then_some(TimeRange { begin, end })
    }
}

/// One backend-reported metric bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub bucket_start: DateTime<Utc>,
    pub values: IndexMap<ColumnKey, f64>,
}

impl Sample {
    #[must_use]
    pub fn new(bucket_start: DateTime<Utc>) -> Self {
        Self {
            bucket_start,
            values: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, column: impl Into<ColumnKey>, value: f64) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    /// Value for `column`, treating absent columns as zero.
    #[must_use]
    pub fn value(&self, column: &str) -> f64 {
        self.values.get(column).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::TimeRange;
    use crate::core::primitives::minutes;
    use chrono::{DateTime, Utc};

    fn at(minute: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + minutes(minute)
    }

    #[test]
    fn non_empty_rejects_zero_width() {
        assert!(TimeRange::non_empty(at(3), at(3)).is_err());
        assert!(TimeRange::new(at(3), at(3)).is_ok());
    }

    #[test]
    fn clamp_to_returns_overlap_only() {
        let bounds = TimeRange::new(at(0), at(10)).expect("bounds");
        let range = TimeRange::new(at(-5), at(4)).expect("range");
        let clamped = range.clamp_to(bounds).expect("overlap");
        assert_eq!((clamped.begin(), clamped.end()), (at(0), at(4)));

        let outside = TimeRange::new(at(11), at(20)).expect("range");
        assert!(outside.clamp_to(bounds).is_none());
    }
}
