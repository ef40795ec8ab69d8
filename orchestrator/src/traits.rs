//! Trait definitions with mockall annotations for testing
//!
//! The orchestration core only talks to the outside world through these
//! traits. Real implementations live in `services`; tests use the generated
//! mocks or hand-written scripted doubles.

use shared::{ApiFailure, ArtifactRef, JobOperation};
use crate::error::DeliveryResult;
use crate::types::StatusUpdate;

/// Remote generation service abstraction
///
/// Every failure is returned already classified, so retry policy never has
/// to inspect service-specific error text.
#[mockall::automock]
#[async_trait::async_trait]
pub trait RemoteJobClient: Send + Sync {
    /// Submit a generation job asking for `requested_count` artifacts
    ///
    /// # Returns
    /// Handle of the accepted job; failures are never retried by the caller
    async fn submit(&self, prompt_text: &str, requested_count: usize) -> Result<JobOperation, ApiFailure>;

    /// Fetch the current state of a submitted job
    ///
    /// Must be safe to call repeatedly for the same logical job.
    async fn poll(&self, operation: &JobOperation) -> Result<JobOperation, ApiFailure>;

    /// Rewrite the prompt before any job is submitted
    async fn enhance(&self, prompt_text: &str) -> Result<String, ApiFailure>;
}

/// Consumer of produced artifacts (display, download, persistence)
#[mockall::automock]
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    /// Hand over one artifact with its 1-based position in the run
    async fn deliver(&self, artifact: &ArtifactRef, position: usize) -> DeliveryResult<()>;
}

/// Receiver of human-readable progress updates
#[mockall::automock]
pub trait StatusReporter: Send + Sync {
    fn report(&self, update: &StatusUpdate);
}
