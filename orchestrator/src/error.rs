//! Orchestrator-specific error types

use thiserror::Error;
use shared::{ApiFailure, SharedError};

/// Why a single batch's poll loop ended without usable output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    #[error("exhausted retries after {attempts} rate-limited polls (last: {last})")]
    ExhaustedRetries { attempts: u32, last: ApiFailure },

    #[error("poll failed: {0}")]
    Remote(ApiFailure),

    #[error("job failed: {reason}")]
    JobFailed { reason: String },

    #[error("job completed without artifacts")]
    EmptyResult,
}

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Prompt enhancement failed: {0}")]
    Enhancement(ApiFailure),

    #[error("Batch {batch} was rejected by the remote service: {source}")]
    Submission { batch: usize, source: ApiFailure },

    #[error("Batch {batch} of {total_batches} failed: {reason}")]
    BatchFailed {
        batch: usize,
        total_batches: usize,
        reason: PollFailure,
    },

    #[error("Configuration error: {field}: {message}")]
    ConfigurationError { field: String, message: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Run interrupted before completion")]
    Interrupted,
}

impl OrchestratorError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        OrchestratorError::ConfigurationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Batch the error is attributed to, if any
    pub fn batch(&self) -> Option<usize> {
        match self {
            OrchestratorError::Submission { batch, .. }
            | OrchestratorError::BatchFailed { batch, .. } => Some(*batch),
            _ => None,
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Failure of a single artifact hand-off; never escalates to the run
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to fetch artifact {position}: {message}")]
    Fetch { position: usize, message: String },

    #[error("Failed to persist artifact {position} to {path}: {source}")]
    Persist {
        position: usize,
        path: String,
        source: std::io::Error,
    },

    #[error("Delivery task for artifact {position} aborted: {message}")]
    TaskAborted { position: usize, message: String },
}

impl DeliveryError {
    pub fn position(&self) -> usize {
        match self {
            DeliveryError::Fetch { position, .. }
            | DeliveryError::Persist { position, .. }
            | DeliveryError::TaskAborted { position, .. } => *position,
        }
    }
}

pub type DeliveryResult<T> = Result<T, DeliveryError>;
