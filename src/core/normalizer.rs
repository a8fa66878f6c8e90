use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, trace};

use crate::core::primitives::{BUCKET, is_pre_epoch};
use crate::core::{ColumnKey, DensePoint, DenseSeries, Sample};
use crate::error::{TimelineError, TimelineResult};

/// Result of one normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    /// `None` when the response held no usable samples.
    pub series: Option<DenseSeries>,
    /// The raw span exceeded the maximum and the grid end was clamped.
    pub span_capped: bool,
    /// A "range too large" advisory should be published for this pass.
    pub span_notice_due: bool,
    /// Leading samples skipped by the pre-epoch start correction.
    pub skipped_pre_epoch: usize,
    /// Samples that never landed on a grid bucket (misaligned, duplicated,
    /// out of order, or past the clamped end).
    pub dropped_samples: usize,
}

impl Normalization {
    fn empty() -> Self {
        Self {
            series: None,
            span_capped: false,
            span_notice_due: false,
            skipped_pre_epoch: 0,
            dropped_samples: 0,
        }
    }
}

/// Converts sparse minute buckets into a [`DenseSeries`].
///
/// The grid starts one bucket before the first sample and ends one bucket
/// after the last one, clamped to `max_span`. Clamping raises an advisory that
/// is throttled on wall-clock time across passes.
#[derive(Debug, Clone)]
pub struct TimeSeriesNormalizer {
    max_span: TimeDelta,
    notice_interval: Duration,
    last_notice_at: Option<Instant>,
}

impl TimeSeriesNormalizer {
    pub fn new(max_span: TimeDelta, notice_interval: Duration) -> TimelineResult<Self> {
        if max_span < BUCKET || max_span.num_milliseconds() % BUCKET.num_milliseconds() != 0 {
            return Err(TimelineError::InvalidData(
                "max span must be a positive whole number of buckets".to_owned(),
            ));
        }
        Ok(Self {
            max_span,
            notice_interval,
            last_notice_at: None,
        })
    }

    #[must_use]
    pub fn max_span(&self) -> TimeDelta {
        self.max_span
    }

    pub fn normalize(
        &mut self,
        samples: &[Sample],
        columns: &[ColumnKey],
        now: Instant,
    ) -> Normalization {
        let Some(mut cursor) = first_post_epoch_start(samples) else {
            if !samples.is_empty() {
                debug!(
                    sample_count = samples.len(),
                    "every sample sits before the epoch; treating response as empty"
                );
            }
            return Normalization::empty();
        };
        let skipped_pre_epoch = cursor;

        let grid_start = samples[cursor].bucket_start - BUCKET;
        let last_bucket = samples[samples.len() - 1].bucket_start;
        let mut grid_end = (last_bucket + BUCKET).max(grid_start);

        let span_capped = grid_end - grid_start > self.max_span;
        let mut span_notice_due = false;
        if span_capped {
            grid_end = grid_start + self.max_span;
            span_notice_due = self.take_span_notice(now);
        }

        let mut points = Vec::with_capacity(bucket_count(grid_start, grid_end));
        let mut dropped_samples = 0;
        let mut time = grid_start;
        while time <= grid_end {
            while cursor < samples.len() && samples[cursor].bucket_start < time {
                trace!(bucket = %samples[cursor].bucket_start, "dropping off-grid sample");
                cursor += 1;
                dropped_samples += 1;
            }
            let values = match samples.get(cursor) {
                Some(sample) if sample.bucket_start == time => {
                    cursor += 1;
                    columns.iter().map(|column| sample.value(column)).collect()
                }
                _ => vec![0.0; columns.len()],
            };
            points.push(DensePoint { time, values });
            time += BUCKET;
        }
        dropped_samples += samples.len() - cursor;

        debug!(
            sample_count = samples.len(),
            dense_len = points.len(),
            skipped_pre_epoch,
            dropped_samples,
            span_capped,
            "normalized metric samples"
        );

        Normalization {
            series: Some(DenseSeries::from_grid_unchecked(columns.to_vec(), points)),
            span_capped,
            span_notice_due,
            skipped_pre_epoch,
            dropped_samples,
        }
    }

    fn take_span_notice(&mut self, now: Instant) -> bool {
        let due = self
            .last_notice_at
            .is_none_or(|last| last + self.notice_interval < now);
        if due {
            self.last_notice_at = Some(now);
        }
        due
    }
}

/// Index of the first sample whose grid start (one bucket earlier) is not
/// before the epoch. Guards against malformed near-epoch timestamps only.
///
/// The sample at the returned index keeps its value on the grid; it is not
/// zero-filled along with the skipped leading samples.
fn first_post_epoch_start(samples: &[Sample]) -> Option<usize> {
    samples
        .iter()
        .position(|sample| !is_pre_epoch(sample.bucket_start - BUCKET))
}

fn bucket_count(start: DateTime<Utc>, end: DateTime<Utc>) -> usize {
    let buckets = (end - start).num_milliseconds() / BUCKET.num_milliseconds();
    usize::try_from(buckets).map_or(0, |count| count + 1)
}
