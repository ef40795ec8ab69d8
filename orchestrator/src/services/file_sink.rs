//! Result sink that downloads each artifact into the output directory
//!
//! Files are named `{stem}_{position}.{extension}`; an existing file with the
//! same name is replaced. The API key is only sent to the API's own host.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use url::Url;

use shared::{run_info, ArtifactRef};
use crate::config::{ClientConfig, SinkConfig};
use crate::error::{DeliveryError, DeliveryResult, OrchestratorError, OrchestratorResult};
use crate::services::job_client::API_KEY_HEADER;
use crate::traits::ResultSink;

/// Downloads artifacts with reqwest and writes them to disk
pub struct FileSink {
    http: reqwest::Client,
    output_dir: PathBuf,
    file_stem: String,
    extension: String,
    credentials: Option<Credentials>,
}

/// API key together with the only host it may be sent to
struct Credentials {
    api_key: String,
    host: String,
}

impl FileSink {
    /// `credentials` supplies the API key and the API host it belongs to
    pub fn new(config: &SinkConfig, credentials: Option<&ClientConfig>) -> OrchestratorResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| OrchestratorError::config("http_client", e.to_string()))?;

        let credentials = credentials
            .map(|client| {
                let host = Url::parse(&client.base_url)
                    .ok()
                    .and_then(|url| url.host_str().map(str::to_string))
                    .ok_or_else(|| OrchestratorError::config("base_url", "missing host"))?;
                Ok::<_, OrchestratorError>(Credentials {
                    api_key: client.api_key.clone(),
                    host,
                })
            })
            .transpose()?;

        Ok(Self {
            http,
            output_dir: config.output_dir.clone(),
            file_stem: config.file_stem.clone(),
            extension: config.extension.clone(),
            credentials,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path of the artifact at `position`
    pub fn file_path(&self, position: usize) -> PathBuf {
        let file_name = if self.extension.is_empty() {
            format!("{}_{}", self.file_stem, position)
        } else {
            format!("{}_{}.{}", self.file_stem, position, self.extension)
        };
        self.output_dir.join(file_name)
    }

    /// Temporary file the artifact at `position` is written to before the rename
    pub fn partial_path(&self, position: usize) -> PathBuf {
        let mut partial = self.file_path(position).into_os_string();
        partial.push(".part");
        PathBuf::from(partial)
    }

    /// API key for `artifact`, only when it lives on the API host
    fn api_key_for(&self, artifact: &ArtifactRef) -> Option<&str> {
        let credentials = self.credentials.as_ref()?;
        let url = Url::parse(artifact.as_str()).ok()?;
        (url.host_str() == Some(credentials.host.as_str())).then_some(credentials.api_key.as_str())
    }

    async fn fetch(&self, artifact: &ArtifactRef, position: usize) -> DeliveryResult<Vec<u8>> {
        let fetch_error = |message: String| DeliveryError::Fetch { position, message };

        let mut request = self.http.get(artifact.as_str());
        if let Some(api_key) = self.api_key_for(artifact) {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = request.send().await.map_err(|e| fetch_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {status}")));
        }

        let bytes = response.bytes().await.map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn persist(&self, bytes: &[u8], position: usize) -> DeliveryResult<PathBuf> {
        let path = self.file_path(position);
        let persist_error = |source: std::io::Error| DeliveryError::Persist {
            position,
            path: path.display().to_string(),
            source,
        };

        fs::create_dir_all(&self.output_dir).await.map_err(persist_error)?;

        // Written to a sibling .part file, then renamed into place
        let partial = self.partial_path(position);
        let mut file = fs::File::create(&partial).await.map_err(persist_error)?;
        file.write_all(bytes).await.map_err(persist_error)?;
        file.flush().await.map_err(persist_error)?;
        drop(file);
        fs::rename(&partial, &path).await.map_err(persist_error)?;

        Ok(path)
    }
}

#[async_trait]
impl ResultSink for FileSink {
    async fn deliver(&self, artifact: &ArtifactRef, position: usize) -> DeliveryResult<()> {
        let bytes = self.fetch(artifact, position).await?;
        let path = self.persist(&bytes, position).await?;

        run_info!("💾 Saved artifact {} ({} bytes) to {}", position, bytes.len(), path.display());
        Ok(())
    }
}
