use std::sync::Arc;

use clone_core::{
    CloneFailure, CloneMode, CloneRequest, CloneResult, DispatchOutcome, ValidationError,
};
use clone_logging::{clone_info, clone_warn};

use crate::{ApiError, CloneApi, FailureKind, SyncCloneReply};

const REJECTED_FALLBACK: &str = "Agentic clone failed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] ApiError),
    /// The backend answered `success: false`. Not retried.
    #[error("{message}")]
    Rejected { message: String },
}

impl From<DispatchError> for CloneFailure {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Invalid(err) => CloneFailure::Invalid(err),
            DispatchError::Transport(err) => CloneFailure::Transport(err.to_string()),
            DispatchError::Rejected { message } => CloneFailure::Rejected(message),
        }
    }
}

/// Routes a submission to the endpoint its mode selects and interprets the reply.
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn CloneApi>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn CloneApi>) -> Self {
        Self { api }
    }

    /// Sends exactly one request, or none when `request` is invalid.
    pub async fn submit(&self, request: &CloneRequest) -> Result<DispatchOutcome, DispatchError> {
        request.validate()?;

        match request.mode {
            CloneMode::Sync => {
                clone_info!("POST agentic-clone url={}", request.url);
                let reply = self.api.clone_now(request).await?;
                completed_result(request, reply).map(DispatchOutcome::Immediate)
            }
            CloneMode::Async => {
                clone_info!("POST clone url={}", request.url);
                let handle = self.api.create_job(request).await?;
                clone_info!("Created job {}", handle);
                Ok(DispatchOutcome::Deferred(handle))
            }
        }
    }
}

/// The direct-result reply is the result; only `success: true` counts.
fn completed_result(
    request: &CloneRequest,
    reply: SyncCloneReply,
) -> Result<CloneResult, DispatchError> {
    if !reply.success {
        let message = reply
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| REJECTED_FALLBACK.to_string());
        clone_warn!("Direct clone of {} rejected: {}", request.url, message);
        return Err(DispatchError::Rejected { message });
    }

    let id = reply.id.ok_or_else(|| {
        ApiError::new(
            FailureKind::MalformedResponse,
            "successful clone reply has no id",
        )
    })?;

    let mut result = CloneResult::completed(id, request.url.clone());
    result.generated_html = reply.html;
    result.preview_url = reply.preview_url;
    result.processing_time_seconds = reply.processing_time;
    Ok(result)
}
