//! HTTP job client for a Gemini-style long-running operation API
//!
//! - submit: `POST {base}/models/{model}:predictLongRunning`
//! - poll: `GET {base}/{operation name}`
//! - enhance: `POST {base}/models/{enhance_model}:generateContent`
//!
//! Every failure is classified here, once, from the HTTP status and the
//! symbolic status in the error body.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use shared::{run_debug, ApiFailure, ArtifactRef, JobOperation};
use crate::config::ClientConfig;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::RemoteJobClient;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Symbolic status the service uses for quota and rate-limit errors
const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

const ENHANCE_INSTRUCTION: &str = "Rewrite the following prompt into a vivid, detailed description \
suitable for video generation. Keep the original intent, describe subject, setting, lighting and \
camera movement. Respond with the improved prompt only.\n\nPrompt: ";

/// Real job client backed by reqwest
pub struct RealJobClient {
    http: reqwest::Client,
    config: ClientConfig,
}

#[derive(Debug, Deserialize)]
struct OperationBody {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResponse>,
    error: Option<StatusBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<VideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
    #[serde(default)]
    rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<MediaRef>,
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: StatusBody,
}

#[derive(Debug, Deserialize)]
struct GenerateContentBody {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl OperationBody {
    fn into_operation(self) -> JobOperation {
        let error = self.error.map(|status| {
            status
                .message
                .or(status.status)
                .unwrap_or_else(|| format!("operation error {}", status.code.unwrap_or_default()))
        });

        let (artifacts, filtered) = match self.response.and_then(|r| r.generate_video_response) {
            Some(video) => {
                let artifacts: Vec<ArtifactRef> = video
                    .generated_samples
                    .into_iter()
                    .filter_map(|sample| sample.video.and_then(|media| media.uri))
                    .map(ArtifactRef::from)
                    .collect();
                (artifacts, video.rai_media_filtered_reasons)
            }
            None => (Vec::new(), Vec::new()),
        };

        // Filtered completions carry no samples, only the filter reasons
        let error = error.or_else(|| {
            (self.done && artifacts.is_empty() && !filtered.is_empty())
                .then(|| format!("filtered: {}", filtered.join("; ")))
        });

        JobOperation {
            name: self.name,
            done: self.done,
            artifacts,
            error,
        }
    }
}

/// Classify a non-success HTTP response
pub fn classify_http_failure(status: u16, body: &str) -> ApiFailure {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let symbolic = envelope.as_ref().and_then(|e| e.error.status.clone());
    let message = envelope
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.chars().take(200).collect());
    let message = match &symbolic {
        Some(symbolic) => format!("HTTP {status} {symbolic}: {message}"),
        None => format!("HTTP {status}: {message}"),
    };

    if status == StatusCode::TOO_MANY_REQUESTS.as_u16() || symbolic.as_deref() == Some(RESOURCE_EXHAUSTED) {
        return ApiFailure::rate_limited(message);
    }

    match status {
        408 | 500 | 502 | 503 | 504 => ApiFailure::transient(message),
        _ => ApiFailure::fatal(message),
    }
}

/// Classify a transport-level failure (no HTTP response)
fn classify_transport_failure(error: reqwest::Error) -> ApiFailure {
    if error.is_timeout() || error.is_connect() {
        ApiFailure::transient(error.to_string())
    } else {
        ApiFailure::fatal(error.to_string())
    }
}

impl RealJobClient {
    /// Create new job client
    pub fn new(config: ClientConfig) -> OrchestratorResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| OrchestratorError::config("http_client", e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.config.base_url, model, method)
    }

    fn operation_url(&self, name: &str) -> String {
        format!("{}/{}", self.config.base_url, name.trim_start_matches('/'))
    }

    /// Send a request and decode a JSON success body, classifying any failure
    async fn send_json<T>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiFailure>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(classify_transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiFailure::fatal(format!("malformed response: {e}")))
    }
}

#[async_trait]
impl RemoteJobClient for RealJobClient {
    async fn submit(&self, prompt_text: &str, requested_count: usize) -> Result<JobOperation, ApiFailure> {
        let mut parameters = json!({ "sampleCount": requested_count });
        if let Some(aspect_ratio) = &self.config.aspect_ratio {
            parameters["aspectRatio"] = json!(aspect_ratio);
        }
        let body = json!({
            "instances": [{ "prompt": prompt_text }],
            "parameters": parameters,
        });

        let operation: OperationBody = self
            .send_json(
                self.http
                    .post(self.model_url(&self.config.model, "predictLongRunning"))
                    .json(&body),
            )
            .await?;

        run_debug!("📤 Submitted {} sample(s) as {}", requested_count, operation.name);
        Ok(operation.into_operation())
    }

    async fn poll(&self, operation: &JobOperation) -> Result<JobOperation, ApiFailure> {
        let body: OperationBody = self
            .send_json(self.http.get(self.operation_url(&operation.name)))
            .await?;
        Ok(body.into_operation())
    }

    async fn enhance(&self, prompt_text: &str) -> Result<String, ApiFailure> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": format!("{ENHANCE_INSTRUCTION}{prompt_text}") }]
            }]
        });

        let response: GenerateContentBody = self
            .send_json(
                self.http
                    .post(self.model_url(&self.config.enhance_model, "generateContent"))
                    .json(&body),
            )
            .await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(ApiFailure::fatal("enhancement returned no text"));
        }
        Ok(text.to_string())
    }
}
