//! Test fixtures and sample data

use std::time::Duration;

use orchestrator::RetryPolicy;
use shared::{ApiFailure, ArtifactRef, GenerationRequest, JobOperation};

/// Canonical test data
pub struct TestFixtures;

impl TestFixtures {
    pub const BASE_DELAY: Duration = Duration::from_millis(20_000);
    pub const MAX_DELAY: Duration = Duration::from_millis(60_000);
    pub const MAX_ATTEMPTS: u32 = 5;

    /// Retry policy with a 20s base and 60s cap, five rate-limit retries
    pub fn policy() -> RetryPolicy {
        RetryPolicy::new(Self::BASE_DELAY, Self::MAX_DELAY, Self::MAX_ATTEMPTS)
    }

    pub fn request(total_count: usize, max_per_batch: usize) -> GenerationRequest {
        GenerationRequest::new("a lighthouse in a storm", total_count, max_per_batch)
            .expect("valid test request")
    }

    /// Operation name the scripted client assigns to batch `batch`
    pub fn operation_name(batch: usize) -> String {
        format!("operations/batch-{batch}")
    }

    pub fn artifact(batch: usize, item: usize) -> ArtifactRef {
        ArtifactRef::new(format!("uri://batch-{batch}/item-{item}"))
    }

    pub fn artifacts(batch: usize, count: usize) -> Vec<ArtifactRef> {
        (1..=count).map(|item| Self::artifact(batch, item)).collect()
    }

    pub fn pending(batch: usize) -> Result<JobOperation, ApiFailure> {
        Ok(JobOperation::submitted(Self::operation_name(batch)))
    }

    pub fn completed(batch: usize, count: usize) -> Result<JobOperation, ApiFailure> {
        Ok(JobOperation::completed(
            Self::operation_name(batch),
            Self::artifacts(batch, count),
        ))
    }

    pub fn empty_completion(batch: usize) -> Result<JobOperation, ApiFailure> {
        Ok(JobOperation::completed(Self::operation_name(batch), Vec::new()))
    }

    pub fn job_failed(batch: usize, reason: &str) -> Result<JobOperation, ApiFailure> {
        Ok(JobOperation::failed(Self::operation_name(batch), reason))
    }

    pub fn rate_limited() -> Result<JobOperation, ApiFailure> {
        Err(ApiFailure::rate_limited("HTTP 429 RESOURCE_EXHAUSTED: quota exceeded"))
    }

    pub fn unavailable() -> Result<JobOperation, ApiFailure> {
        Err(ApiFailure::transient("HTTP 503: service unavailable"))
    }
}
