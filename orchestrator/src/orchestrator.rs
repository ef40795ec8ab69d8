//! Main orchestrator implementation
//!
//! Runs one generation request end to end: prompt enhancement, sequential
//! batches, then delivery of every artifact to the result sink. All
//! collaborators are injected.

use std::future::Future;
use std::sync::Arc;

use shared::{run_debug, run_error, run_info, run_warn, GenerationRequest};

use crate::config::OrchestratorConfig;
use crate::core::{deliver_all, BatchScheduler};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{RemoteJobClient, ResultSink, StatusReporter};
use crate::types::{RunReport, StatusUpdate};

/// Coordinates enhancement, batching and delivery for one run at a time
pub struct Orchestrator<C, S, R>
where
    C: RemoteJobClient,
    S: ResultSink + 'static,
    R: StatusReporter,
{
    client: C,
    sink: Arc<S>,
    reporter: R,
    config: OrchestratorConfig,
}

impl<C, S, R> Orchestrator<C, S, R>
where
    C: RemoteJobClient,
    S: ResultSink + 'static,
    R: StatusReporter,
{
    /// Create new orchestrator with injected dependencies
    pub fn new(client: C, sink: S, reporter: R, config: OrchestratorConfig) -> Self {
        Self {
            client,
            sink: Arc::new(sink),
            reporter,
            config,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Produce `request.total_count()` artifacts and hand them to the sink
    ///
    /// Fails on enhancement failure, rejected submission or failed batch.
    /// Sink failures are part of the returned report, never an error.
    pub async fn run(&self, request: GenerationRequest) -> OrchestratorResult<RunReport> {
        let request = if self.config.enhance_prompt {
            self.reporter.report(&StatusUpdate::Enhancing);
            let enhanced = self
                .client
                .enhance(request.prompt_text())
                .await
                .map_err(|failure| {
                    run_error!("❌ Prompt enhancement failed: {}", failure);
                    OrchestratorError::Enhancement(failure)
                })?;
            run_debug!("✨ Enhanced prompt: {}", enhanced);
            request.with_prompt(enhanced)
        } else {
            request
        };

        let mut scheduler = BatchScheduler::new(&self.client, &self.reporter, self.config.retry);
        scheduler.run(&request).await?;
        let batches = scheduler.issued().len();
        let artifacts = scheduler.into_results();

        run_info!(
            "✅ Generated {} artifact(s) in {} batch(es)",
            artifacts.len(),
            batches
        );
        self.reporter.report(&StatusUpdate::Completed {
            artifacts: artifacts.len(),
        });

        let delivery = deliver_all(Arc::clone(&self.sink), &self.reporter, &artifacts).await;

        Ok(RunReport {
            prompt: request.prompt_text().to_string(),
            artifacts,
            batches,
            delivery,
        })
    }
}

/// Await `run` unless `interrupt` fires first
///
/// An `interrupt` that fails (e.g. the signal handler could not be
/// registered) is logged and then ignored; the run continues.
pub async fn run_until_interrupted<T, F, I>(run: F, interrupt: I) -> OrchestratorResult<T>
where
    F: Future<Output = OrchestratorResult<T>>,
    I: Future<Output = std::io::Result<()>>,
{
    let interrupted = async {
        if let Err(e) = interrupt.await {
            run_warn!("⚠️ Interrupt handler unavailable, continuing without it: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = run => result,
        () = interrupted => Err(OrchestratorError::Interrupted),
    }
}
