use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Which backend path a submission takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloneMode {
    /// Direct-result endpoint: the response is the finished artifact.
    #[default]
    Sync,
    /// Job-creation endpoint: the response is a handle that must be polled.
    Async,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStyle {
    #[default]
    Modern,
    Minimal,
    Corporate,
    Creative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneOptions {
    pub include_images: bool,
    pub include_fonts: bool,
    pub mobile_responsive: bool,
    pub extract_colors: bool,
    /// Upper bound on server-side work, in seconds.
    pub max_wait_time: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub target_style: TargetStyle,
    pub include_animations: bool,
    pub mobile_first: bool,
}

impl CloneOptions {
    pub const MAX_WAIT_RANGE: (u32, u32) = (5, 300);
    pub const VIEWPORT_WIDTH_RANGE: (u32, u32) = (320, 3840);
    pub const VIEWPORT_HEIGHT_RANGE: (u32, u32) = (240, 2160);

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("max_wait_time", self.max_wait_time, Self::MAX_WAIT_RANGE)?;
        check_range("viewport_width", self.viewport_width, Self::VIEWPORT_WIDTH_RANGE)?;
        check_range(
            "viewport_height",
            self.viewport_height,
            Self::VIEWPORT_HEIGHT_RANGE,
        )
    }
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            include_images: true,
            include_fonts: true,
            mobile_responsive: true,
            extract_colors: true,
            max_wait_time: 30,
            viewport_width: 1920,
            viewport_height: 1080,
            target_style: TargetStyle::Modern,
            include_animations: true,
            mobile_first: true,
        }
    }
}

fn check_range(
    field: &'static str,
    value: u32,
    (min, max): (u32, u32),
) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// A single submission. Serializes to the `{url, options}` request body;
/// the mode only selects the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloneRequest {
    pub url: String,
    #[serde(skip)]
    pub mode: CloneMode,
    pub options: CloneOptions,
}

impl CloneRequest {
    /// Builds a validated request; the url is trimmed.
    pub fn new(
        url: &str,
        mode: CloneMode,
        options: CloneOptions,
    ) -> Result<Self, ValidationError> {
        let request = Self {
            url: url.trim().to_string(),
            mode,
            options,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        self.options.validate()
    }
}

/// Opaque job identifier returned by the job-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Scraping,
    Processing,
    Generating,
    Complete,
    Error,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Complete | JobState::Error)
    }

    /// Human-readable progress line for the state.
    pub fn describe(self) -> &'static str {
        match self {
            JobState::Pending => "Initializing...",
            JobState::Scraping => "Analyzing website structure...",
            JobState::Processing => "Processing design elements...",
            JobState::Generating => "Generating HTML with AI...",
            JobState::Complete => "Clone completed successfully!",
            JobState::Error => "Clone failed",
        }
    }
}

/// One poll result. Only the latest is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: String,
    #[serde(rename = "status")]
    pub state: JobState,
    /// Advisory only; never drives transitions.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl JobStatus {
    pub fn new(id: impl Into<String>, state: JobState, progress: u8) -> Self {
        Self {
            id: id.into(),
            state,
            progress,
            message: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneOutcome {
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

/// Backend-computed similarity scores, each in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionMetrics {
    pub overall_precision: f64,
    pub structure_similarity: f64,
    pub content_similarity: f64,
    pub styling_similarity: f64,
    pub semantic_similarity: f64,
    pub layout_similarity: f64,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneResult {
    pub id: String,
    #[serde(rename = "status")]
    pub outcome: CloneOutcome,
    pub original_url: String,
    #[serde(default)]
    pub generated_html: Option<String>,
    #[serde(default)]
    pub generated_css: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, rename = "processing_time")]
    pub processing_time_seconds: Option<f64>,
    #[serde(default)]
    pub similarity_score: Option<f64>,
    #[serde(default)]
    pub precision_metrics: Option<PrecisionMetrics>,
}

impl CloneResult {
    /// A successful result with no artifacts attached yet.
    pub fn completed(id: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: CloneOutcome::Complete,
            original_url: original_url.into(),
            generated_html: None,
            generated_css: None,
            preview_url: None,
            error_message: None,
            processing_time_seconds: None,
            similarity_score: None,
            precision_metrics: None,
        }
    }

    /// Overall precision when present, otherwise the legacy similarity score.
    pub fn score(&self) -> Option<f64> {
        self.precision_metrics
            .as_ref()
            .map(|metrics| metrics.overall_precision)
            .or(self.similarity_score)
    }
}

/// What a submission produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Immediate(CloneResult),
    Deferred(JobHandle),
}
