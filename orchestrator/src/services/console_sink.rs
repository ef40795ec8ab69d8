//! Result sink that only displays artifact references

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;

use shared::ArtifactRef;
use crate::error::{DeliveryError, DeliveryResult};
use crate::traits::ResultSink;

/// Writes `position: reference` lines to any writer (stdout by default)
pub struct ConsoleSink<W: Write + Send = std::io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> ResultSink for ConsoleSink<W> {
    async fn deliver(&self, artifact: &ArtifactRef, position: usize) -> DeliveryResult<()> {
        let mut out = self.out.lock().map_err(|e| DeliveryError::TaskAborted {
            position,
            message: e.to_string(),
        })?;

        writeln!(out, "{position}: {artifact}").map_err(|source| DeliveryError::Persist {
            position,
            path: "<console>".to_string(),
            source,
        })
    }
}
