use std::time::Duration;

use clone_core::{CloneRequest, CloneResult, JobHandle, JobStatus};
use clone_logging::clone_debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::preview::preview_proxy_url;
use crate::{ApiError, FailureKind};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Reply of the direct-result endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyncCloneReply {
    pub success: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobCreated {
    id: String,
}

/// The clone backend, one method per endpoint.
#[async_trait::async_trait]
pub trait CloneApi: Send + Sync {
    /// `POST /api/agentic-clone`
    async fn clone_now(&self, request: &CloneRequest) -> Result<SyncCloneReply, ApiError>;
    /// `POST /api/clone`
    async fn create_job(&self, request: &CloneRequest) -> Result<JobHandle, ApiError>;
    /// `GET /api/clone/{id}`
    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus, ApiError>;
    /// `GET /api/clone/{id}/result`
    async fn fetch_result(&self, handle: &JobHandle) -> Result<CloneResult, ApiError>;
    /// `DELETE /api/clone/{id}`
    async fn cancel_job(&self, handle: &JobHandle) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestCloneApi {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestCloneApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{base} cannot be used as a base url"),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base, client })
    }

    pub fn preview_proxy_url(&self, target: &str) -> Url {
        preview_proxy_url(&self.base, target)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`: the base always has path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body)
            .map_err(|err| ApiError::new(FailureKind::MalformedResponse, err.to_string()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        clone_debug!("{} {}", status.as_u16(), response.url());
        let body = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| status.to_string());
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl CloneApi for ReqwestCloneApi {
    async fn clone_now(&self, request: &CloneRequest) -> Result<SyncCloneReply, ApiError> {
        let url = self.endpoint(&["api", "agentic-clone"]);
        self.send_json(self.client.post(url).json(request)).await
    }

    async fn create_job(&self, request: &CloneRequest) -> Result<JobHandle, ApiError> {
        let url = self.endpoint(&["api", "clone"]);
        let created: JobCreated = self.send_json(self.client.post(url).json(request)).await?;
        if created.id.trim().is_empty() {
            return Err(ApiError::new(
                FailureKind::MalformedResponse,
                "job id is empty",
            ));
        }
        Ok(JobHandle::new(created.id))
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus, ApiError> {
        let url = self.endpoint(&["api", "clone", handle.as_str()]);
        self.send_json(self.client.get(url)).await
    }

    async fn fetch_result(&self, handle: &JobHandle) -> Result<CloneResult, ApiError> {
        let url = self.endpoint(&["api", "clone", handle.as_str(), "result"]);
        self.send_json(self.client.get(url)).await
    }

    async fn cancel_job(&self, handle: &JobHandle) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "clone", handle.as_str()]);
        self.send(self.client.delete(url)).await.map(|_| ())
    }
}

/// Pulls a readable reason out of an error body: `detail`, then `message`.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|field| match field {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) if text.trim().is_empty() => None,
            serde_json::Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        })
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
