//! Fan-out of finished artifacts to the result sink
//!
//! Each artifact is delivered by its own task. A failing or panicking task
//! only marks its own position as failed.

use std::sync::Arc;

use futures_util::future::join_all;
use shared::{run_debug, run_warn, ArtifactRef};

use crate::error::DeliveryError;
use crate::traits::{ResultSink, StatusReporter};
use crate::types::StatusUpdate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub position: usize,
    pub artifact: ArtifactRef,
    pub error: String,
}

/// Per-item outcome of a delivery fan-out, positions are 1-based
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<usize>,
    pub failed: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Deliver every artifact concurrently and wait for all of them
pub async fn deliver_all<S, R>(sink: Arc<S>, reporter: &R, artifacts: &[ArtifactRef]) -> DeliveryReport
where
    S: ResultSink + ?Sized + 'static,
    R: StatusReporter + ?Sized,
{
    let handles = artifacts.iter().enumerate().map(|(index, artifact)| {
        let sink = Arc::clone(&sink);
        let artifact = artifact.clone();
        let position = index + 1;
        tokio::spawn(async move { sink.deliver(&artifact, position).await })
    });

    let results = join_all(handles).await;

    let mut report = DeliveryReport::default();
    for (index, (artifact, result)) in artifacts.iter().zip(results).enumerate() {
        let position = index + 1;
        let result = result.unwrap_or_else(|join_error| {
            Err(DeliveryError::TaskAborted {
                position,
                message: join_error.to_string(),
            })
        });

        match result {
            Ok(()) => {
                run_debug!("📦 Artifact {} delivered: {}", position, artifact);
                reporter.report(&StatusUpdate::ArtifactDelivered { position });
                report.delivered.push(position);
            }
            Err(error) => {
                run_warn!("⚠️ Artifact {} not delivered: {}", position, error);
                reporter.report(&StatusUpdate::ArtifactFailed {
                    position,
                    error: error.to_string(),
                });
                report.failed.push(DeliveryFailure {
                    position,
                    artifact: artifact.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    reporter.report(&StatusUpdate::DeliveryFinished {
        delivered: report.delivered.len(),
        failed: report.failed.len(),
    });

    report
}
