use std::time::Instant;

use chrono::{DateTime, Utc};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::backend::StatisticsBackend;
use crate::core::{SelectionPhase, TimeRange};
use crate::error::TimelineResult;
use crate::events::{SelectionPayload, TimelineEvent};

use super::TimelinePanel;

/// Timer that fired during a [`TimelinePanel::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Coalesced brush range was handed to the selection.
    Brush,
    /// Selection commit was published on `timeline_updates`.
    Commit,
}

/// Timers fired by one tick, in firing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub fired: SmallVec<[TimerKind; 2]>,
}

impl TickOutcome {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.fired.is_empty()
    }

    #[must_use]
    pub fn committed(&self) -> bool {
        self.fired.contains(&TimerKind::Commit)
    }
}

impl<B: StatisticsBackend> TimelinePanel<B> {
    #[must_use]
    pub fn selection(&self) -> Option<TimeRange> {
        self.selection.selection()
    }

    #[must_use]
    pub fn view_window(&self) -> Option<TimeRange> {
        self.selection.view_window()
    }

    #[must_use]
    pub fn series_bounds(&self) -> Option<TimeRange> {
        self.selection.bounds()
    }

    #[must_use]
    pub fn selection_phase(&self) -> SelectionPhase {
        self.selection.phase()
    }

    /// Stores a user selection and restarts the commit debounce.
    pub fn set_selection(&mut self, range: TimeRange, now: Instant) -> TimelineResult<()> {
        self.selection.set_selection(range, now)
    }

    /// Applies a selection published by another panel; out-of-bounds ranges are
    /// dropped. Returns `true` when applied.
    pub fn receive_external_selection(&mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        let applied = self.selection.receive_external(from, to);
        if !applied {
            debug!(%from, %to, bounds = ?self.selection.bounds(), "dropping external selection");
        }
        applied
    }

    /// View window proposed by the rendering layer (zoom, pan).
    pub fn propose_view_window(&mut self, window: TimeRange) -> bool {
        let accepted = self.selection.propose_view_window(window);
        if !accepted {
            trace!(?window, "view window proposal rejected");
        }
        accepted
    }

    /// Fires due timers: the brush coalescer first, then the selection commit.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if !self.input_attachment.is_live() && self.input.cancel_pending() {
            debug!("input detached; discarded pending brush range");
        }

        if let Some(range) = self.input.poll_brush(now) {
            outcome.fired.push(TimerKind::Brush);
            if let Err(err) = self.selection.set_selection(range, now) {
                warn!(error = %err, "brush range rejected");
            }
        }

        if let Some(range) = self.selection.poll_commit(now) {
            outcome.fired.push(TimerKind::Commit);
            debug!(from = %range.begin(), to = %range.end(), "publishing selection");
            self.emit(TimelineEvent::TimelineUpdates(SelectionPayload {
                from: range.begin(),
                to: range.end(),
            }));
        }
        outcome
    }

    /// Earliest instant at which [`TimelinePanel::tick`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.input.brush_deadline(), self.selection.commit_deadline()) {
            (Some(brush), Some(commit)) => Some(brush.min(commit)),
            (brush, commit) => brush.or(commit),
        }
    }
}
