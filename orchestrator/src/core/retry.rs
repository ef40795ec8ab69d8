//! Backoff policy for rate-limited polls
//!
//! All transitions are pure: they take the current state and return the next
//! one, so the policy is tested without any clock.

use std::time::Duration;

/// Upper bound on any single wait between polls
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(60_000);

/// Rate-limit retries allowed before a poll loop gives up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default wait between two polls of a healthy job
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Regular polling cadence, also the first backoff step
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_POLL_INTERVAL,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Backoff bookkeeping of one poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt_count: u32,
    current_delay: Duration,
}

/// What to do after a rate-limited poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `next.current_delay()` and poll again
    Retry(RetryState),
    /// Budget spent; `attempts` retries were already made
    GiveUp { attempts: u32 },
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt_count: 0,
            current_delay: policy.base_delay,
        }
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Wait before the next poll
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    /// Any successful poll brings the loop back to its baseline
    pub fn reset(self, policy: &RetryPolicy) -> Self {
        Self::new(policy)
    }

    pub fn on_rate_limit(self, policy: &RetryPolicy) -> RetryDecision {
        let attempt_count = self.attempt_count + 1;
        if attempt_count > policy.max_attempts {
            return RetryDecision::GiveUp {
                attempts: self.attempt_count,
            };
        }

        let current_delay = self
            .current_delay
            .saturating_mul(2)
            .min(policy.max_delay);

        RetryDecision::Retry(Self {
            attempt_count,
            current_delay,
        })
    }
}
