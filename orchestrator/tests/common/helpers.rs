//! Scripted collaborators for driving the orchestrator without a network

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use orchestrator::error::{DeliveryError, DeliveryResult};
use orchestrator::{RemoteJobClient, ResultSink, StatusReporter, StatusUpdate};
use shared::{ApiFailure, ArtifactRef, JobOperation};

use super::fixtures::TestFixtures;

type PollScript = VecDeque<Result<JobOperation, ApiFailure>>;

#[derive(Default)]
struct ClientState {
    scripts: HashMap<String, PollScript>,
    submit_failures: HashMap<usize, ApiFailure>,
    submissions: Vec<(String, usize)>,
    polls: Vec<(String, Instant)>,
    enhance_calls: Vec<String>,
}

/// Remote job client answering from per-batch poll scripts
///
/// Submission `n` gets the operation named [`TestFixtures::operation_name`]`(n)`
/// and its polls consume the script registered for that batch. Polling past
/// the end of a script panics.
pub struct ScriptedJobClient {
    state: Mutex<ClientState>,
    enhance_result: Result<String, ApiFailure>,
    started: Instant,
}

impl ScriptedJobClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ClientState::default()),
            enhance_result: Ok("an enhanced prompt".to_string()),
            started: Instant::now(),
        }
    }

    /// Register the poll script of the next batch
    pub fn with_batch(self, script: Vec<Result<JobOperation, ApiFailure>>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let batch = state.scripts.len() + 1;
            state
                .scripts
                .insert(TestFixtures::operation_name(batch), script.into());
        }
        self
    }

    pub fn with_submit_failure(self, batch: usize, failure: ApiFailure) -> Self {
        self.state.lock().unwrap().submit_failures.insert(batch, failure);
        self
    }

    pub fn with_enhance_result(mut self, result: Result<String, ApiFailure>) -> Self {
        self.enhance_result = result;
        self
    }

    /// `(prompt, requested_count)` of every submission, in order
    pub fn submissions(&self) -> Vec<(String, usize)> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn requested_counts(&self) -> Vec<usize> {
        self.submissions().into_iter().map(|(_, count)| count).collect()
    }

    pub fn poll_count(&self) -> usize {
        self.state.lock().unwrap().polls.len()
    }

    /// Waits between consecutive polls, starting from client creation
    pub fn poll_waits(&self) -> Vec<Duration> {
        let state = self.state.lock().unwrap();
        let mut previous = self.started;
        state
            .polls
            .iter()
            .map(|(_, at)| {
                let wait = at.duration_since(previous);
                previous = *at;
                wait
            })
            .collect()
    }

    pub fn enhance_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().enhance_calls.clone()
    }
}

#[async_trait]
impl RemoteJobClient for ScriptedJobClient {
    async fn submit(&self, prompt_text: &str, requested_count: usize) -> Result<JobOperation, ApiFailure> {
        let mut state = self.state.lock().unwrap();
        state
            .submissions
            .push((prompt_text.to_string(), requested_count));
        let batch = state.submissions.len();

        if let Some(failure) = state.submit_failures.remove(&batch) {
            return Err(failure);
        }
        Ok(JobOperation::submitted(TestFixtures::operation_name(batch)))
    }

    async fn poll(&self, operation: &JobOperation) -> Result<JobOperation, ApiFailure> {
        let mut state = self.state.lock().unwrap();
        state.polls.push((operation.name.clone(), Instant::now()));

        state
            .scripts
            .get_mut(&operation.name)
            .and_then(|script| script.pop_front())
            .unwrap_or_else(|| panic!("{} polled past the end of its script", operation.name))
    }

    async fn enhance(&self, prompt_text: &str) -> Result<String, ApiFailure> {
        self.state
            .lock()
            .unwrap()
            .enhance_calls
            .push(prompt_text.to_string());
        self.enhance_result.clone()
    }
}

/// Status reporter that keeps every update; clones share the record
#[derive(Clone, Default)]
pub struct RecordingReporter {
    updates: Arc<Mutex<Vec<StatusUpdate>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Updates other than the per-poll flavor text
    pub fn milestones(&self) -> Vec<StatusUpdate> {
        self.updates()
            .into_iter()
            .filter(|update| !matches!(update, StatusUpdate::Polling { .. }))
            .collect()
    }

    pub fn backoffs(&self) -> Vec<(u32, Duration)> {
        self.updates()
            .into_iter()
            .filter_map(|update| match update {
                StatusUpdate::BackingOff { attempt, wait, .. } => Some((attempt, wait)),
                _ => None,
            })
            .collect()
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, update: &StatusUpdate) {
        self.updates.lock().unwrap().push(update.clone());
    }
}

/// Result sink that records deliveries and fails chosen positions
#[derive(Clone, Default)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<(usize, ArtifactRef)>>>,
    failing: Arc<HashSet<usize>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(positions: &[usize]) -> Self {
        Self {
            delivered: Arc::default(),
            failing: Arc::new(positions.iter().copied().collect()),
        }
    }

    /// Delivered `(position, artifact)` pairs sorted by position
    pub fn delivered(&self) -> Vec<(usize, ArtifactRef)> {
        let mut delivered = self.delivered.lock().unwrap().clone();
        delivered.sort_by_key(|(position, _)| *position);
        delivered
    }
}

#[async_trait]
impl ResultSink for RecordingSink {
    async fn deliver(&self, artifact: &ArtifactRef, position: usize) -> DeliveryResult<()> {
        if self.failing.contains(&position) {
            return Err(DeliveryError::Fetch {
                position,
                message: "simulated download failure".to_string(),
            });
        }
        self.delivered
            .lock()
            .unwrap()
            .push((position, artifact.clone()));
        Ok(())
    }
}
