//! Debounce timer for pending saves.

use std::time::{Duration, Instant};

/// Single-slot timer for the next save.
///
/// Scheduling always replaces the pending deadline, so only the latest change
/// in a burst is ever written. The owner polls it with [`PersistTimer::take_due`].
#[derive(Debug, Clone, Default)]
pub struct PersistTimer {
    /// When the pending save should run.
    deadline: Option<Instant>,
}

impl PersistTimer {
    /// Create a timer with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a save is pending.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Schedule a save `delay` after `now`, replacing any pending one.
    ///
    /// Returns `true` if a pending save was replaced.
    pub fn schedule(&mut self, now: Instant, delay: Duration) -> bool {
        self.deadline.replace(now + delay).is_some()
    }

    /// Drop the pending save. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Check if the pending save should run at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Clear the pending save if it is due. Returns `true` if the caller
    /// should save now.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    /// Time left until the pending save, if any.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
