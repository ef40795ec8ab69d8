//! Core orchestration logic
//!
//! Retry transitions are pure; the poll loop, scheduler and delivery only
//! reach the outside world through the traits in `crate::traits`.

pub mod delivery;
pub mod poll_loop;
pub mod retry;
pub mod scheduler;

pub use delivery::{deliver_all, DeliveryFailure, DeliveryReport};
pub use poll_loop::{PollLoop, PollOutcome, POLL_MESSAGES};
pub use retry::{RetryDecision, RetryPolicy, RetryState};
pub use scheduler::{next_batch_size, planned_batch_sizes, BatchScheduler};
