//! Common test utilities and infrastructure
//!
//! Scripted collaborators shared by the poll loop, scheduler and end-to-end
//! suites. Every suite pulls in the whole module, so not every helper is used
//! everywhere.
#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{RecordingReporter, RecordingSink, ScriptedJobClient};
