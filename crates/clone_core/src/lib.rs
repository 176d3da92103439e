//! Clone core: pure job orchestration state machine and view-model helpers.
mod effect;
mod failure;
mod msg;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use failure::{CloneFailure, ValidationError};
pub use msg::Msg;
pub use state::{AppState, CurrentJob, Phase, SubmissionId};
pub use types::{
    CloneMode, CloneOptions, CloneOutcome, CloneRequest, CloneResult, Confidence,
    DispatchOutcome, JobHandle, JobState, JobStatus, PrecisionMetrics, TargetStyle,
};
pub use update::update;
pub use view_model::{AppViewModel, ScoreBand, ScoreView, StatusView};
