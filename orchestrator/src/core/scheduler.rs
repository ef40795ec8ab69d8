//! Splits a request into sequential batches and accumulates their output

use shared::{run_debug, run_error, run_info, ArtifactRef, BatchJob, GenerationRequest};

use crate::core::poll_loop::{PollLoop, PollOutcome};
use crate::core::retry::RetryPolicy;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{RemoteJobClient, StatusReporter};
use crate::types::StatusUpdate;

/// Size of the next batch, or `None` once the target is reached
pub fn next_batch_size(total_count: usize, max_per_batch: usize, produced: usize) -> Option<usize> {
    if produced >= total_count {
        return None;
    }
    Some(max_per_batch.min(total_count - produced))
}

/// Batch sizes for a run where every batch delivers exactly what it asks for
pub fn planned_batch_sizes(total_count: usize, max_per_batch: usize) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut produced = 0;
    while let Some(size) = next_batch_size(total_count, max_per_batch, produced) {
        sizes.push(size);
        produced += size;
    }
    sizes
}

/// Runs batches one after another until enough artifacts are accumulated
///
/// Only one job is ever outstanding. The first failed batch aborts the run;
/// what was accumulated up to that point stays inspectable through
/// [`BatchScheduler::results`] but is not handed to any sink.
pub struct BatchScheduler<'a, C: ?Sized, R: ?Sized> {
    client: &'a C,
    reporter: &'a R,
    policy: RetryPolicy,
    issued: Vec<BatchJob>,
    accumulated: Vec<ArtifactRef>,
}

impl<'a, C, R> BatchScheduler<'a, C, R>
where
    C: RemoteJobClient + ?Sized,
    R: StatusReporter + ?Sized,
{
    pub fn new(client: &'a C, reporter: &'a R, policy: RetryPolicy) -> Self {
        Self {
            client,
            reporter,
            policy,
            issued: Vec::new(),
            accumulated: Vec::new(),
        }
    }

    /// Batches issued by the last run, in submission order
    pub fn issued(&self) -> &[BatchJob] {
        &self.issued
    }

    /// Artifacts accumulated by the last run, in submission order
    pub fn results(&self) -> &[ArtifactRef] {
        &self.accumulated
    }

    pub fn into_results(self) -> Vec<ArtifactRef> {
        self.accumulated
    }

    pub async fn run(&mut self, request: &GenerationRequest) -> OrchestratorResult<()> {
        self.issued.clear();
        self.accumulated.clear();

        let planned_batches = request.batch_count();
        run_info!(
            "📋 Generating {} artifact(s) in {} batch(es) of at most {}",
            request.total_count(),
            planned_batches,
            request.max_per_batch()
        );

        while let Some(requested_count) = next_batch_size(
            request.total_count(),
            request.max_per_batch(),
            self.accumulated.len(),
        ) {
            let batch = BatchJob {
                batch_index: self.issued.len() + 1,
                requested_count,
            };
            // Under-delivering batches push the run past the planned count
            let total_batches = planned_batches.max(batch.batch_index);
            self.issued.push(batch);

            self.reporter.report(&StatusUpdate::BatchStarted {
                batch: batch.batch_index,
                total_batches,
                requested: requested_count,
            });

            let operation = self
                .client
                .submit(request.prompt_text(), requested_count)
                .await
                .map_err(|source| {
                    run_error!("❌ Batch {} submission rejected: {}", batch.batch_index, source);
                    OrchestratorError::Submission {
                        batch: batch.batch_index,
                        source,
                    }
                })?;
            run_debug!("📤 Batch {} submitted as {}", batch.batch_index, operation.name);

            let outcome = PollLoop::new(self.client, self.reporter, self.policy, batch)
                .run(operation)
                .await;

            match outcome {
                PollOutcome::Succeeded(artifacts) => {
                    self.reporter.report(&StatusUpdate::BatchSucceeded {
                        batch: batch.batch_index,
                        produced: artifacts.len(),
                    });
                    self.accumulated.extend(artifacts);
                }
                PollOutcome::Failed(reason) => {
                    run_error!("❌ Batch {} failed: {}", batch.batch_index, reason);
                    return Err(OrchestratorError::BatchFailed {
                        batch: batch.batch_index,
                        total_batches,
                        reason,
                    });
                }
            }
        }

        Ok(())
    }
}
