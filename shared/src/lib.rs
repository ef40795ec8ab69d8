//! Shared types for the batched generation orchestrator
//!
//! Contains the data model exchanged between the orchestration core and the
//! remote job client, the error classification used at that boundary, and
//! the logging setup used by every binary in the workspace.

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
