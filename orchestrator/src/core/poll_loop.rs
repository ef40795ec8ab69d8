//! Drives one submitted job to a terminal outcome
//!
//! State machine:
//!
//! ```text
//! Submitted ─┬─> Pending (poll ok, not done; retry state reset) ─┐
//!            └─> PendingRetry (rate limited; backoff) ───────────┤
//!                                                               └─> Succeeded | Failed
//! ```
//!
//! Terminal states are absorbing: the loop returns and the handle is never
//! polled again.

use shared::{run_debug, run_warn, ArtifactRef, BatchJob, JobOperation, OperationOutcome};

use crate::core::retry::{RetryDecision, RetryPolicy, RetryState};
use crate::error::PollFailure;
use crate::traits::{RemoteJobClient, StatusReporter};
use crate::types::StatusUpdate;

/// Flavor text cycled through on every poll
pub const POLL_MESSAGES: [&str; 5] = [
    "Warming up the generator...",
    "Composing scenes...",
    "Rendering frames...",
    "Adding finishing touches...",
    "Still working, long jobs take a while...",
];

/// Terminal result of one poll loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Succeeded(Vec<ArtifactRef>),
    Failed(PollFailure),
}

/// Non-terminal phase, kept for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollPhase {
    Submitted,
    Pending,
    PendingRetry,
}

pub struct PollLoop<'a, C: ?Sized, R: ?Sized> {
    client: &'a C,
    reporter: &'a R,
    policy: RetryPolicy,
    batch: BatchJob,
}

impl<'a, C, R> PollLoop<'a, C, R>
where
    C: RemoteJobClient + ?Sized,
    R: StatusReporter + ?Sized,
{
    pub fn new(client: &'a C, reporter: &'a R, policy: RetryPolicy, batch: BatchJob) -> Self {
        Self {
            client,
            reporter,
            policy,
            batch,
        }
    }

    /// Poll `operation` until it finishes or fails
    pub async fn run(self, operation: JobOperation) -> PollOutcome {
        let batch = self.batch.batch_index;
        let mut operation = operation;
        let mut retry = RetryState::new(&self.policy);
        let mut phase = PollPhase::Submitted;
        let mut cycle = 0usize;

        // A handle that is already terminal is never polled
        if let Some(outcome) = terminal_outcome(&operation) {
            run_debug!("✨ Batch {} was terminal on submission", batch);
            return outcome;
        }

        loop {
            tokio::time::sleep(retry.current_delay()).await;

            self.reporter.report(&StatusUpdate::Polling {
                batch,
                message: POLL_MESSAGES[cycle % POLL_MESSAGES.len()],
            });
            cycle += 1;

            match self.client.poll(&operation).await {
                Ok(updated) => {
                    retry = retry.reset(&self.policy);

                    if let Some(outcome) = terminal_outcome(&updated) {
                        run_debug!("✨ Batch {} reached a terminal state after {} poll(s)", batch, cycle);
                        return outcome;
                    }
                    run_debug!(
                        "⏳ Batch {} still running ({:?} -> Pending, poll {})",
                        batch,
                        phase,
                        cycle
                    );
                    phase = PollPhase::Pending;
                    operation = updated;
                }
                Err(failure) if failure.is_rate_limit() => {
                    match retry.on_rate_limit(&self.policy) {
                        RetryDecision::Retry(next) => {
                            run_warn!(
                                "⏳ Batch {} rate limited (attempt {}/{}), retrying in {}ms",
                                batch,
                                next.attempt_count(),
                                self.policy.max_attempts,
                                next.current_delay().as_millis()
                            );
                            self.reporter.report(&StatusUpdate::BackingOff {
                                batch,
                                attempt: next.attempt_count(),
                                wait: next.current_delay(),
                            });
                            phase = PollPhase::PendingRetry;
                            retry = next;
                        }
                        RetryDecision::GiveUp { attempts } => {
                            return PollOutcome::Failed(PollFailure::ExhaustedRetries {
                                attempts,
                                last: failure,
                            });
                        }
                    }
                }
                Err(failure) => return PollOutcome::Failed(PollFailure::Remote(failure)),
            }
        }
    }
}

/// Outcome of a finished handle, `None` while it is still pending
fn terminal_outcome(operation: &JobOperation) -> Option<PollOutcome> {
    match operation.outcome() {
        OperationOutcome::Pending => None,
        OperationOutcome::Succeeded(artifacts) => Some(PollOutcome::Succeeded(artifacts)),
        OperationOutcome::Failed(reason) => {
            let failure = if operation.is_empty_completion() {
                PollFailure::EmptyResult
            } else {
                PollFailure::JobFailed { reason }
            };
            Some(PollOutcome::Failed(failure))
        }
    }
}
