use std::time::Instant;

use tracing::trace;

use crate::backend::StatisticsBackend;
use crate::core::TimeRange;
use crate::error::TimelineResult;
use crate::interaction::{InputAction, InputEvent, InputSubscription};

use super::TimelinePanel;

/// What happened to one panel input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputOutcome {
    /// Selection changed to this range; commit debounce restarted.
    Applied(TimeRange),
    /// Brush range queued until `due_at`.
    Deferred { due_at: Instant },
    /// Nothing to do (no series, no selection, unchanged range).
    Ignored,
    /// The subscription is no longer the panel's attached input.
    Detached,
}

impl InputOutcome {
    /// Whether the host should suppress the platform default action.
    #[must_use]
    pub fn prevents_default(self) -> bool {
        matches!(self, InputOutcome::Applied(_) | InputOutcome::Deferred { .. })
    }
}

impl<B: StatisticsBackend> TimelinePanel<B> {
    /// Attaches a new input source, replacing any previous one. Dropping the
    /// returned handle detaches it and discards a pending brush range.
    pub fn attach_input(&mut self) -> InputSubscription {
        self.input.cancel_pending();
        self.input_attachment.attach()
    }

    #[must_use]
    pub fn has_input_attached(&self) -> bool {
        self.input_attachment.is_live()
    }

    pub fn handle_input(
        &mut self,
        subscription: &InputSubscription,
        event: InputEvent,
        now: Instant,
    ) -> TimelineResult<InputOutcome> {
        if !self.input_attachment.accepts(subscription) {
            trace!(?event, "input from detached subscription");
            return Ok(InputOutcome::Detached);
        }
        let Some(series) = self.series.as_ref() else {
            return Ok(InputOutcome::Ignored);
        };

        let outcome = match self
            .input
            .map(event, series, self.selection.selection(), now)?
        {
            InputAction::Select(range) => {
                self.selection.set_selection(range, now)?;
                InputOutcome::Applied(range)
            }
            InputAction::Deferred { due_at } => InputOutcome::Deferred { due_at },
            InputAction::Ignored => InputOutcome::Ignored,
        };
        Ok(outcome)
    }
}
