//! Trailing-edge debounce for the local "stop typing" notification.
//!
//! DESIGN
//! ======
//! The debouncer owns the single pending countdown as a deadline rather than
//! a spawned timer task. The session loop sleeps until [`TypingDebouncer::deadline`]
//! and then calls [`TypingDebouncer::expire`], so replacing or cancelling the
//! countdown is a plain assignment inside one turn and a superseded timer can
//! never fire late.

#[cfg(test)]
#[path = "typing_test.rs"]
mod typing_test;

use std::time::Duration;

use tokio::time::Instant;

/// Quiet period after the last keystroke before "stop typing" is sent.
pub const DEFAULT_TYPING_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Clone, Debug)]
pub struct TypingDebouncer {
    timeout: Duration,
    pending: Option<Instant>,
}

impl Default for TypingDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_TIMEOUT)
    }
}

impl TypingDebouncer {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, pending: None }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Cancel any pending countdown and start a new one from `now`.
    pub fn restart(&mut self, now: Instant) {
        self.pending = Some(now + self.timeout);
    }

    /// Drop the pending countdown. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Consume the countdown if it has elapsed by `now`.
    ///
    /// Returns `true` at most once per started countdown.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
