use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

use crate::core::primitives::scale_delta;
use crate::core::{DenseSeries, TimeRange};
use crate::error::{TimelineError, TimelineResult};

use super::{Debouncer, InputEvent, NavigationKey};

/// Tuning for mapping discrete inputs onto selection ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputTuning {
    /// Width of the selection created by a chart click.
    pub click_selection_width: TimeDelta,
    /// Fraction of the selection width moved per arrow key press.
    pub keyboard_step_ratio: f64,
    /// Lower bound for keyboard shrinking.
    pub min_selection_width: TimeDelta,
}

impl Default for InputTuning {
    fn default() -> Self {
        Self {
            click_selection_width: TimeDelta::minutes(10),
            keyboard_step_ratio: 0.1,
            min_selection_width: TimeDelta::minutes(1),
        }
    }
}

/// What an input asks the selection controller to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Apply this range immediately.
    Select(TimeRange),
    /// A brush range was queued; it is released by `poll_brush`.
    Deferred { due_at: Instant },
    Ignored,
}

/// Maps raw panel inputs to selection ranges.
///
/// Brush frames are coalesced on their own short debounce before they reach
/// the selection controller.
#[derive(Debug, Clone)]
pub struct InputAdapter {
    tuning: InputTuning,
    brush: Debouncer<TimeRange>,
}

impl InputAdapter {
    #[must_use]
    pub fn new(tuning: InputTuning, brush_delay: Duration) -> Self {
        Self {
            tuning,
            brush: Debouncer::new(brush_delay),
        }
    }

    #[must_use]
    pub fn tuning(&self) -> InputTuning {
        self.tuning
    }

    pub fn map(
        &mut self,
        event: InputEvent,
        series: &DenseSeries,
        selection: Option<TimeRange>,
        now: Instant,
    ) -> TimelineResult<InputAction> {
        let bounds = series.bounds();
        let action = match event {
            InputEvent::Click { time } => match selection {
                Some(_) => resolve_click_range(time, self.tuning.click_selection_width, bounds)?
                    .map_or(InputAction::Ignored, InputAction::Select),
                None => InputAction::Ignored,
            },
            InputEvent::Key { key, modifier } => match selection {
                Some(selection) => resolve_keyboard_range(
                    selection,
                    bounds,
                    key,
                    modifier,
                    self.tuning.keyboard_step_ratio,
                    self.tuning.min_selection_width,
                )?
                .map_or(InputAction::Ignored, InputAction::Select),
                None => InputAction::Ignored,
            },
            InputEvent::Brush {
                start_index,
                end_index,
            } => match resolve_brush_range(series, start_index, end_index) {
                Some(range) => InputAction::Deferred {
                    due_at: self.brush.schedule(range, now),
                },
                None => InputAction::Ignored,
            },
            InputEvent::Drag { move_percent } => match selection {
                Some(selection) => {
                    InputAction::Select(resolve_drag_range(selection, bounds, move_percent)?)
                }
                None => InputAction::Ignored,
            },
        };
        trace!(?event, ?action, "mapped panel input");
        Ok(action)
    }

    /// Releases the coalesced brush range once its delay has elapsed.
    pub fn poll_brush(&mut self, now: Instant) -> Option<TimeRange> {
        self.brush.poll(now)
    }

    #[must_use]
    pub fn brush_deadline(&self) -> Option<Instant> {
        self.brush.deadline()
    }

    pub fn cancel_pending(&mut self) -> bool {
        self.brush.cancel().is_some()
    }
}

/// `[time, time + width]`, moved back inside `bounds` when it would cross
/// an edge. Bounds narrower than `width` are selected whole.
/// `None` when the width is not positive.
pub fn resolve_click_range(
    time: DateTime<Utc>,
    width: TimeDelta,
    bounds: TimeRange,
) -> TimelineResult<Option<TimeRange>> {
    if width <= TimeDelta::zero() {
        return Ok(None);
    }
    let latest_begin = bounds.end().checked_sub_signed(width).ok_or_else(|| {
        TimelineError::InvalidData("click selection width overflows".to_owned())
    })?;
    let begin = time.min(latest_begin).max(bounds.begin());
    let end = begin
        .checked_add_signed(width)
        .map_or(bounds.end(), |end| end.min(bounds.end()));
    Ok(TimeRange::non_empty(begin, end).ok())
}

/// Moves or resizes `selection` for an arrow key press.
///
/// Without modifier the whole range moves by `step_ratio` of its width and
/// stops at `bounds`. With modifier only the trailing edge moves: left
/// shrinks down to `min_width` and never grows, right grows up to
/// `bounds.end`.
/// Returns `None` when the range would not change.
pub fn resolve_keyboard_range(
    selection: TimeRange,
    bounds: TimeRange,
    key: NavigationKey,
    modifier: bool,
    step_ratio: f64,
    min_width: TimeDelta,
) -> TimelineResult<Option<TimeRange>> {
    let width = selection.duration();
    let step = scale_delta(width, step_ratio)?;
    let (mut begin, mut end) = (selection.begin(), selection.end());

    match (key, modifier) {
        (NavigationKey::ArrowLeft, true) => {
            end = (begin + min_width).max(end - step).min(selection.end());
        }
        (NavigationKey::ArrowLeft, false) => {
            begin = bounds.begin().max(begin - step);
            end = begin + width;
        }
        (NavigationKey::ArrowRight, true) => {
            end = bounds.end().min(end + step);
        }
        (NavigationKey::ArrowRight, false) => {
            end = bounds.end().min(end + step);
            begin = end - width;
        }
        (NavigationKey::Other, _) => return Ok(None),
    }

    if begin == selection.begin() && end == selection.end() {
        return Ok(None);
    }
    TimeRange::non_empty(begin, end).map(Some)
}

/// Shifts `selection` by `move_percent` of the bounds span, keeping its width.
///
/// Overshoot is pushed back inside `bounds` instead of truncating the range,
/// including shifts too large to represent as a timestamp.
pub fn resolve_drag_range(
    selection: TimeRange,
    bounds: TimeRange,
    move_percent: f64,
) -> TimelineResult<TimeRange> {
    if !move_percent.is_finite() {
        return Err(TimelineError::InvalidData(
            "drag move percent must be finite".to_owned(),
        ));
    }
    let width = selection.duration();
    let shift = scale_delta(bounds.duration(), move_percent)?;

    let latest_begin = bounds.end().checked_sub_signed(width).ok_or_else(|| {
        TimelineError::InvalidData("drag selection width overflows".to_owned())
    })?;
    let begin = selection
        .begin()
        .checked_add_signed(shift)
        .unwrap_or(if shift > TimeDelta::zero() {
            latest_begin
        } else {
            bounds.begin()
        })
        .max(bounds.begin())
        .min(latest_begin);
    TimeRange::non_empty(begin, begin + width)
}

/// Grid timestamps for a brush window given as point indices.
#[must_use]
pub fn resolve_brush_range(
    series: &DenseSeries,
    start_index: usize,
    end_index: usize,
) -> Option<TimeRange> {
    let begin = series.time_at(start_index)?;
    let end = series.time_at(end_index)?;
    TimeRange::non_empty(begin, end).ok()
}
