//! Core types used throughout the orchestrator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};

/// Global run ID singleton - set once per invocation
static RUN_ID: OnceLock<RunId> = OnceLock::new();

/// Identifier of one orchestrator invocation, attached to every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the global run ID, creating it on first use
    pub fn current() -> &'static RunId {
        RUN_ID.get_or_init(RunId::new)
    }

    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run_{}", self.short())
    }
}

/// Opaque locator of one produced artifact (usually a URI)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ArtifactRef {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

impl From<&str> for ArtifactRef {
    fn from(reference: &str) -> Self {
        Self(reference.to_string())
    }
}

/// What the caller asked for: a prompt and how many artifacts to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    prompt_text: String,
    total_count: usize,
    max_per_batch: usize,
}

impl GenerationRequest {
    pub fn new(
        prompt_text: impl Into<String>,
        total_count: usize,
        max_per_batch: usize,
    ) -> SharedResult<Self> {
        if total_count == 0 {
            return Err(SharedError::InvalidConfig {
                field: "total_count".to_string(),
                value: total_count.to_string(),
            });
        }
        if max_per_batch == 0 {
            return Err(SharedError::InvalidConfig {
                field: "max_per_batch".to_string(),
                value: max_per_batch.to_string(),
            });
        }

        Ok(Self {
            prompt_text: prompt_text.into(),
            total_count,
            max_per_batch,
        })
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn max_per_batch(&self) -> usize {
        self.max_per_batch
    }

    /// Number of batches needed when every batch delivers what it asked for
    pub fn batch_count(&self) -> usize {
        self.total_count.div_ceil(self.max_per_batch)
    }

    /// Same request with a replaced prompt (used after enhancement)
    pub fn with_prompt(&self, prompt_text: impl Into<String>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            ..self.clone()
        }
    }
}

/// One submission to the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJob {
    /// 1-based position of the batch within the run
    pub batch_index: usize,
    pub requested_count: usize,
}

/// Handle of one submitted job as last reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOperation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub artifacts: Vec<ArtifactRef>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reason given for a job that finished without producing anything
pub const EMPTY_RESULT_REASON: &str = "job completed without artifacts";

impl JobOperation {
    /// Handle of a job that has just been accepted
    pub fn submitted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            artifacts: Vec::new(),
            error: None,
        }
    }

    /// Handle of a finished job carrying the given artifacts
    pub fn completed(name: impl Into<String>, artifacts: Vec<ArtifactRef>) -> Self {
        Self {
            name: name.into(),
            done: true,
            artifacts,
            error: None,
        }
    }

    /// Handle of a finished job that reported an error
    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            artifacts: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Finished, no error reported, yet nothing usable came back
    pub fn is_empty_completion(&self) -> bool {
        self.done && self.error.is_none() && self.artifacts.is_empty()
    }

    pub fn outcome(&self) -> OperationOutcome {
        if !self.done {
            return OperationOutcome::Pending;
        }
        if let Some(error) = &self.error {
            return OperationOutcome::Failed(error.clone());
        }
        if self.artifacts.is_empty() {
            return OperationOutcome::Failed(EMPTY_RESULT_REASON.to_string());
        }
        OperationOutcome::Succeeded(self.artifacts.clone())
    }
}

/// Interpretation of a [`JobOperation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Pending,
    Succeeded(Vec<ArtifactRef>),
    Failed(String),
}

impl OperationOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationOutcome::Pending)
    }
}
