use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::primitives::scale_delta;
use crate::core::{DenseSeries, TimeRange};
use crate::error::{TimelineError, TimelineResult};

/// Lifecycle of the selection stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// No series has been loaded yet.
    Uninitialized,
    /// Series loaded; no outward notification pending.
    Initialized,
    /// A user-driven selection is waiting for its debounce to elapse.
    UserAdjusting { commit_at: Instant, pending: TimeRange },
}

/// Multipliers of the selection width used to pad the view window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionPadding {
    pub left_multiplier: f64,
    pub right_multiplier: f64,
}

impl Default for SelectionPadding {
    fn default() -> Self {
        Self {
            left_multiplier: 24.0,
            right_multiplier: 8.0,
        }
    }
}

/// Selection and view window over the loaded series bounds.
///
/// `bounds` tracks the dense grid range.
/// `view_window` is the rendered span, usually a padded superset of the
/// selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionModel {
    phase: SelectionPhase,
    bounds: Option<TimeRange>,
    selection: Option<TimeRange>,
    view_window: Option<TimeRange>,
    commit_delay: Duration,
    padding: SelectionPadding,
    default_lookback_points: usize,
    default_applied: bool,
}

impl SelectionModel {
    #[must_use]
    pub fn new(
        commit_delay: Duration,
        padding: SelectionPadding,
        default_lookback_points: usize,
    ) -> Self {
        Self {
            phase: SelectionPhase::Uninitialized,
            bounds: None,
            selection: None,
            view_window: None,
            commit_delay,
            padding,
            default_lookback_points,
            default_applied: false,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_adjusting(&self) -> bool {
        matches!(self.phase, SelectionPhase::UserAdjusting { .. })
    }

    #[must_use]
    pub fn bounds(&self) -> Option<TimeRange> {
        self.bounds
    }

    #[must_use]
    pub fn selection(&self) -> Option<TimeRange> {
        self.selection
    }

    #[must_use]
    pub fn view_window(&self) -> Option<TimeRange> {
        self.view_window
    }

    #[must_use]
    pub fn commit_deadline(&self) -> Option<Instant> {
        match self.phase {
            SelectionPhase::UserAdjusting { commit_at, .. } => Some(commit_at),
            _ => None,
        }
    }

    /// Re-derives bounds, selection and view window from a freshly loaded
    /// series (`None` for an empty response).
    ///
    /// A pending commit survives the reload. The active selection is kept,
    /// narrowed to the new bounds, and dropped when nothing of it remains.
    /// The default selection applies once, on the first load whose series
    /// has more than two points.
    pub fn load_series(&mut self, series: Option<&DenseSeries>) {
        let Some(series) = series else {
            self.bounds = None;
            self.selection = None;
            self.view_window = None;
            if !self.is_adjusting() {
                self.phase = SelectionPhase::Uninitialized;
            }
            return;
        };

        let bounds = series.bounds();
        self.bounds = Some(bounds);
        self.selection = self.selection.and_then(|selection| selection.clamp_to(bounds));
        if !self.default_applied && self.selection.is_none() {
            self.selection = self.default_selection(series);
            self.default_applied = self.selection.is_some();
        }

        self.view_window = if self.is_adjusting() {
            self.view_window
                .and_then(|window| window.clamp_to(bounds))
                .or(Some(bounds))
        } else {
            Some(bounds)
        };

        if self.phase == SelectionPhase::Uninitialized {
            self.phase = SelectionPhase::Initialized;
        }
        debug!(
            bounds_begin = %bounds.begin(),
            bounds_end = %bounds.end(),
            selection = ?self.selection,
            adjusting = self.is_adjusting(),
            "selection model loaded series"
        );
    }

    /// Stores a user-driven selection and (re)starts the commit debounce.
    pub fn set_selection(&mut self, range: TimeRange, now: Instant) -> TimelineResult<()> {
        if range.begin() >= range.end() {
            return Err(TimelineError::InvalidRange {
                begin: range.begin(),
                end: range.end(),
            });
        }
        if self.phase == SelectionPhase::Uninitialized {
            return Err(TimelineError::NotInitialized);
        }
        self.selection = Some(range);
        self.phase = SelectionPhase::UserAdjusting {
            commit_at: now + self.commit_delay,
            pending: range,
        };
        trace!(begin = %range.begin(), end = %range.end(), "selection pending commit");
        Ok(())
    }

    /// Applies a selection published by another panel.
    ///
    /// Returns `false` (and changes nothing) unless
    /// `bounds.begin <= from < to <= bounds.end`.
    pub fn receive_external(&mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };
        if from < bounds.begin() || from >= to || to > bounds.end() {
            return false;
        }
        self.selection = Some(TimeRange::from_ordered(from, to));
        self.adjust_view_window();
        true
    }

    /// Pads the view window around the selection, biased toward history.
    pub fn adjust_view_window(&mut self) {
        let (Some(bounds), Some(selection)) = (self.bounds, self.selection) else {
            return;
        };
        self.view_window = Some(padded_window(selection, bounds, self.padding));
    }

    /// Accepts a view window proposed by the rendering layer unless a user
    /// adjustment is pending. Returns `true` when stored.
    pub fn propose_view_window(&mut self, window: TimeRange) -> bool {
        if self.is_adjusting() {
            return false;
        }
        match self.bounds.and_then(|bounds| window.clamp_to(bounds)) {
            Some(window) => {
                self.view_window = Some(window);
                true
            }
            None => false,
        }
    }

    /// Fires the commit debounce when due, returning the committed range.
    pub fn poll_commit(&mut self, now: Instant) -> Option<TimeRange> {
        let SelectionPhase::UserAdjusting { commit_at, pending } = self.phase else {
            return None;
        };
        if now < commit_at {
            return None;
        }
        self.phase = if self.bounds.is_some() {
            SelectionPhase::Initialized
        } else {
            SelectionPhase::Uninitialized
        };
        Some(pending)
    }

    fn default_selection(&self, series: &DenseSeries) -> Option<TimeRange> {
        if series.len() <= 2 {
            return None;
        }
        let last_index = series.len() - 1;
        let first_index = last_index.saturating_sub(self.default_lookback_points);
        let begin = series.time_at(first_index)?;
        let end = series.time_at(last_index)?;
        TimeRange::non_empty(begin, end).ok()
    }
}

/// `[selection.begin - left * width, selection.end + right * width]`
/// intersected with `bounds`.
#[must_use]
pub fn padded_window(
    selection: TimeRange,
    bounds: TimeRange,
    padding: SelectionPadding,
) -> TimeRange {
    let width = selection.duration();
    let begin = scale_delta(width, padding.left_multiplier)
        .ok()
        .and_then(|pad| selection.begin().checked_sub_signed(pad))
        .map_or(bounds.begin(), |begin| begin.max(bounds.begin()));
    let end = scale_delta(width, padding.right_multiplier)
        .ok()
        .and_then(|pad| selection.end().checked_add_signed(pad))
        .map_or(bounds.end(), |end| end.min(bounds.end()));
    TimeRange::from_ordered(begin.min(end), end)
}
