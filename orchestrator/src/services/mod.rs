//! Service implementations
//!
//! This module contains real implementations of all service traits.
//! These are the production implementations that handle actual I/O operations.

pub mod console_sink;
pub mod file_sink;
pub mod job_client;
pub mod status_reporter;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use console_sink::ConsoleSink;
pub use file_sink::FileSink;
pub use job_client::{classify_http_failure, RealJobClient};
pub use status_reporter::LogStatusReporter;
