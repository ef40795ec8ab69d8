//! Command line arguments and validated run configuration
//!
//! ## Configuration Sources
//! - command line flags (see [`Args`])
//! - `.env` file in the current directory or parent directories (if present)
//! - system environment variables for the API key
//!
//! Environment variables take precedence over `.env` file values.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use shared::GenerationRequest;
use crate::core::retry::RetryPolicy;
use crate::error::{OrchestratorError, OrchestratorResult};

/// API key variables, checked in order
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY", "GOOGLE_AI_API_KEY"];

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Batched generation of artifacts against a rate-limited remote service
#[derive(Parser, Debug, Clone)]
#[command(name = "orchestrator")]
#[command(about = "Submits batched generation jobs, polls them to completion and downloads the results")]
pub struct Args {
    /// Prompt text describing what to generate
    pub prompt: String,

    /// Total number of artifacts to produce
    #[arg(long, default_value = "1")]
    pub count: usize,

    /// Maximum artifacts the remote service accepts per submission
    #[arg(long, default_value = "4")]
    pub max_per_batch: usize,

    /// Regular wait between polls (milliseconds)
    #[arg(long, default_value = "10000")]
    pub poll_interval_ms: u64,

    /// Upper bound for rate-limit backoff (milliseconds)
    #[arg(long, default_value = "60000")]
    pub max_backoff_ms: u64,

    /// Rate-limit retries allowed per batch before giving up
    #[arg(long, default_value = "5")]
    pub max_attempts: u32,

    /// Submit the prompt as given instead of enhancing it first
    #[arg(long)]
    pub no_enhance: bool,

    /// Generation model
    #[arg(long, default_value = "veo-2.0-generate-001")]
    pub model: String,

    /// Model used to enhance the prompt
    #[arg(long, default_value = "gemini-2.0-flash")]
    pub enhance_model: String,

    /// Optional aspect ratio parameter (e.g. 16:9)
    #[arg(long)]
    pub aspect_ratio: Option<String>,

    /// Root of the remote API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout of a single HTTP request (seconds)
    #[arg(long, default_value = "60")]
    pub request_timeout_secs: u64,

    /// Output directory for downloaded artifacts
    #[arg(long, default_value = "./output")]
    pub output: PathBuf,

    /// File name stem of downloaded artifacts
    #[arg(long, default_value = "artifact")]
    pub file_stem: String,

    /// File extension of downloaded artifacts
    #[arg(long, default_value = "mp4")]
    pub extension: String,

    /// Print artifact references instead of downloading them
    #[arg(long)]
    pub no_download: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Settings of the orchestration core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub retry: RetryPolicy,
    pub enhance_prompt: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            enhance_prompt: true,
        }
    }
}

/// Settings of the HTTP job client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root without trailing slash
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub enhance_model: String,
    pub aspect_ratio: Option<String>,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> OrchestratorResult<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            api_key: api_key.into(),
            model: "veo-2.0-generate-001".to_string(),
            enhance_model: "gemini-2.0-flash".to_string(),
            aspect_ratio: None,
            request_timeout: Duration::from_secs(60),
        })
    }
}

/// Settings of the result sinks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub output_dir: PathBuf,
    pub file_stem: String,
    pub extension: String,
    pub download: bool,
}

/// Everything the binary needs for one run
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub request: GenerationRequest,
    pub orchestrator: OrchestratorConfig,
    pub client: ClientConfig,
    pub sink: SinkConfig,
    pub log_level: String,
}

impl Args {
    /// Validate the arguments and combine them with the API key
    pub fn into_config(self, api_key: String) -> OrchestratorResult<AppConfig> {
        let request = GenerationRequest::new(self.prompt, self.count, self.max_per_batch)?;

        if self.poll_interval_ms == 0 {
            return Err(OrchestratorError::config("poll_interval_ms", "must be greater than zero"));
        }
        if self.max_backoff_ms < self.poll_interval_ms {
            return Err(OrchestratorError::config(
                "max_backoff_ms",
                format!(
                    "{} is below the poll interval of {}",
                    self.max_backoff_ms, self.poll_interval_ms
                ),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(OrchestratorError::config("request_timeout_secs", "must be greater than zero"));
        }
        if self.file_stem.is_empty() || self.file_stem.contains(std::path::MAIN_SEPARATOR) {
            return Err(OrchestratorError::config("file_stem", "must be a plain file name"));
        }

        let retry = RetryPolicy::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_millis(self.max_backoff_ms),
            self.max_attempts,
        );

        let client = ClientConfig {
            base_url: normalize_base_url(&self.base_url)?,
            api_key,
            model: self.model,
            enhance_model: self.enhance_model,
            aspect_ratio: self.aspect_ratio,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        };

        Ok(AppConfig {
            request,
            orchestrator: OrchestratorConfig {
                retry,
                enhance_prompt: !self.no_enhance,
            },
            client,
            sink: SinkConfig {
                output_dir: self.output,
                file_stem: self.file_stem,
                extension: self.extension.trim_start_matches('.').to_string(),
                download: !self.no_download,
            },
            log_level: self.log_level,
        })
    }
}

fn normalize_base_url(raw: &str) -> OrchestratorResult<String> {
    let url = Url::parse(raw)
        .map_err(|e| OrchestratorError::config("base_url", format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(OrchestratorError::config(
            "base_url",
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// First non-empty API key according to [`API_KEY_VARS`]
pub fn find_api_key<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Load `.env` (if present) and read the API key from the environment
pub fn api_key_from_env() -> OrchestratorResult<String> {
    // Missing .env files are fine
    let _ = dotenv::dotenv();

    find_api_key(|name| std::env::var(name).ok()).ok_or_else(|| {
        OrchestratorError::config(
            "api_key",
            format!("set one of {}", API_KEY_VARS.join(", ")),
        )
    })
}
