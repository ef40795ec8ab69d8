//! Orchestrator-specific data types

use std::fmt;
use std::time::Duration;

use shared::ArtifactRef;
use crate::core::delivery::DeliveryReport;

/// Progress of a run as shown to a human
///
/// Purely observational: nothing in the control flow depends on how these are
/// displayed or whether anyone listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Enhancing,
    BatchStarted {
        batch: usize,
        total_batches: usize,
        requested: usize,
    },
    Polling {
        batch: usize,
        message: &'static str,
    },
    BackingOff {
        batch: usize,
        attempt: u32,
        wait: Duration,
    },
    BatchSucceeded {
        batch: usize,
        produced: usize,
    },
    Completed {
        artifacts: usize,
    },
    ArtifactDelivered {
        position: usize,
    },
    ArtifactFailed {
        position: usize,
        error: String,
    },
    DeliveryFinished {
        delivered: usize,
        failed: usize,
    },
}

impl StatusUpdate {
    /// Updates that signal something went wrong
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            StatusUpdate::BackingOff { .. } | StatusUpdate::ArtifactFailed { .. }
        )
    }
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusUpdate::Enhancing => write!(f, "Enhancing prompt..."),
            StatusUpdate::BatchStarted {
                batch,
                total_batches,
                requested,
            } => write!(
                f,
                "Starting batch {batch} of {total_batches} ({requested} requested)"
            ),
            StatusUpdate::Polling { batch, message } => write!(f, "[batch {batch}] {message}"),
            StatusUpdate::BackingOff {
                batch,
                attempt,
                wait,
            } => write!(
                f,
                "[batch {batch}] Rate limited, waiting {wait:?} before retry {attempt}"
            ),
            StatusUpdate::BatchSucceeded { batch, produced } => {
                write!(f, "Batch {batch} produced {produced} artifact(s)")
            }
            StatusUpdate::Completed { artifacts } => {
                write!(f, "Generation complete: {artifacts} artifact(s)")
            }
            StatusUpdate::ArtifactDelivered { position } => {
                write!(f, "Artifact {position} delivered")
            }
            StatusUpdate::ArtifactFailed { position, error } => {
                write!(f, "Artifact {position} could not be delivered: {error}")
            }
            StatusUpdate::DeliveryFinished { delivered, failed } => {
                write!(f, "Delivery finished: {delivered} delivered, {failed} failed")
            }
        }
    }
}

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Prompt actually submitted (after enhancement)
    pub prompt: String,
    pub artifacts: Vec<ArtifactRef>,
    pub batches: usize,
    pub delivery: DeliveryReport,
}
