//! Status reporter that writes progress through the run logging macros

use shared::{run_info, run_warn};
use crate::traits::StatusReporter;
use crate::types::StatusUpdate;

/// Logs every status update; warnings for backoff and delivery failures
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStatusReporter;

impl LogStatusReporter {
    pub fn new() -> Self {
        Self
    }
}

impl StatusReporter for LogStatusReporter {
    fn report(&self, update: &StatusUpdate) {
        if update.is_warning() {
            run_warn!("{}", update);
        } else {
            run_info!("{}", update);
        }
    }
}
