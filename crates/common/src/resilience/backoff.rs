//! Bounded-backoff policy for retryable operations
//!
//! A small policy object deciding whether a failed attempt should be retried
//! and after what delay. Callers that historically retried forever keep that
//! behavior through the unbounded default, but the bound is configurable and
//! fault-injectable in tests.

use std::time::Duration;

/// Decision for whether to retry an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given delay.
    RetryAfter(Duration),
    /// Give up; surface the last result to the caller.
    Stop,
}

/// Fixed-interval backoff with an optional attempt cap.
///
/// `max_attempts: None` retries indefinitely; `Some(n)` counts the initial
/// attempt, so `Some(1)` means no retries at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    delay: Duration,
    max_attempts: Option<u32>,
}

impl BackoffPolicy {
    /// Retry forever with a fixed delay between attempts.
    pub const fn unbounded(delay: Duration) -> Self {
        Self { delay, max_attempts: None }
    }

    /// Retry with a fixed delay, giving up after `max_attempts` total tries.
    pub const fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self { delay, max_attempts: Some(max_attempts) }
    }

    /// The fixed delay between attempts.
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// The attempt cap, if any.
    pub const fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Decide whether a further attempt is allowed after `attempt` completed
    /// tries (1-based: pass 1 after the first failure).
    pub fn next(&self, attempt: u32) -> RetryDecision {
        match self.max_attempts {
            Some(max) if attempt >= max => RetryDecision::Stop,
            _ => RetryDecision::RetryAfter(self.delay),
        }
    }
}
