use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{TimelineError, TimelineResult};

/// Width of one metric bucket.
pub const BUCKET: TimeDelta = TimeDelta::minutes(1);

#[must_use]
pub fn minutes(count: i64) -> TimeDelta {
    TimeDelta::minutes(count)
}

#[must_use]
pub fn millis(count: i64) -> TimeDelta {
    TimeDelta::milliseconds(count)
}

/// Scales a duration by a finite ratio with millisecond precision.
///
/// Fractional milliseconds are truncated toward zero.
pub fn scale_delta(delta: TimeDelta, ratio: f64) -> TimelineResult<TimeDelta> {
    if !ratio.is_finite() {
        return Err(TimelineError::InvalidData(
            "duration scale ratio must be finite".to_owned(),
        ));
    }
    let scaled = delta.num_milliseconds() as f64 * ratio;
    if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 {
        return Err(TimelineError::InvalidData(
            "scaled duration overflows millisecond range".to_owned(),
        ));
    }
    Ok(TimeDelta::milliseconds(scaled.trunc() as i64))
}

/// Parses an ISO-8601 / RFC 3339 instant as reported by the backend.
pub fn parse_instant(raw: &str) -> TimelineResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| TimelineError::Decode(format!("invalid instant `{raw}`: {e}")))
}

/// Returns `true` for instants before the Unix epoch.
#[must_use]
pub fn is_pre_epoch(time: DateTime<Utc>) -> bool {
    time.timestamp_millis() < 0
}
