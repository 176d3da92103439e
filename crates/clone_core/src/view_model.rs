use crate::{CloneMode, CloneResult, JobState, JobStatus, Phase};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    pub mode: CloneMode,
    pub url_input: String,
    pub is_loading: bool,
    pub job_id: Option<String>,
    pub status: Option<StatusView>,
    pub result: Option<CloneResult>,
    pub score: Option<ScoreView>,
    pub failure: Option<String>,
    pub input_error: Option<String>,
    /// Job completed but its result could not be retrieved.
    pub finished_without_artifact: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub state: JobState,
    pub progress: u8,
    pub label: &'static str,
    pub message: Option<String>,
}

impl StatusView {
    pub(crate) fn from_status(status: &JobStatus) -> Self {
        Self {
            state: status.state,
            progress: status.progress.min(100),
            label: status.state.describe(),
            message: status.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreView {
    pub value: f64,
    pub band: ScoreBand,
}

impl ScoreView {
    pub(crate) fn from_score(value: f64) -> Self {
        Self {
            value,
            band: ScoreBand::from_score(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            ScoreBand::Excellent
        } else if score >= 0.8 {
            ScoreBand::VeryGood
        } else if score >= 0.7 {
            ScoreBand::Good
        } else if score >= 0.6 {
            ScoreBand::Fair
        } else if score >= 0.4 {
            ScoreBand::Poor
        } else {
            ScoreBand::VeryPoor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::VeryGood => "Very Good",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Poor => "Poor",
            ScoreBand::VeryPoor => "Very Poor",
        }
    }
}
