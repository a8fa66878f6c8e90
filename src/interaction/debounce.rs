use std::time::{Duration, Instant};

/// Trailing-edge debounce over an explicit clock.
///
/// Scheduling replaces any pending value and restarts the delay, so at most
/// one value is ever pending.
#[derive(Debug, Clone, PartialEq)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces the pending value; returns the new deadline.
    pub fn schedule(&mut self, value: T, now: Instant) -> Instant {
        let due_at = now + self.delay;
        self.pending = Some((due_at, value));
        due_at
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(due_at, _)| *due_at)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|due_at| due_at <= now) {
            return self.cancel();
        }
        None
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }
}
