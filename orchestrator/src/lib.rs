//! Orchestrator library for batched generation jobs
//!
//! Splits a generation request into batches the remote service accepts,
//! polls each long-running job with rate-limit backoff and hands the ordered
//! results to a sink. The remote service, the sink and progress reporting are
//! injected through the traits in [`traits`].

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, Args, ClientConfig, OrchestratorConfig, SinkConfig};
pub use core::{BatchScheduler, DeliveryReport, PollLoop, PollOutcome, RetryPolicy, RetryState};
pub use error::{DeliveryError, OrchestratorError, OrchestratorResult, PollFailure};
pub use orchestrator::Orchestrator;
pub use traits::{RemoteJobClient, ResultSink, StatusReporter};
pub use types::{RunReport, StatusUpdate};
