use crate::view_model::{AppViewModel, ScoreView, StatusView};
use crate::{
    CloneFailure, CloneMode, CloneOptions, CloneOutcome, CloneRequest, CloneResult, JobHandle,
    JobState, JobStatus, ValidationError,
};

/// Monotonic tag for submissions; replies carrying an older tag are stale.
pub type SubmissionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// A dispatch request is outstanding.
    Submitting,
    /// The poll timer is running for the current job.
    Polling,
    /// Result retrieved, or the job failed.
    Done,
}

/// The single job slot. Created on submit, mutated on tick/result, dropped on reset.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentJob {
    submission: SubmissionId,
    url: String,
    mode: CloneMode,
    handle: Option<JobHandle>,
    status: Option<JobStatus>,
    result: Option<CloneResult>,
    status_in_flight: bool,
    result_requested: bool,
}

impl CurrentJob {
    fn new(submission: SubmissionId, request: &CloneRequest) -> Self {
        Self {
            submission,
            url: request.url.clone(),
            mode: request.mode,
            handle: None,
            status: None,
            result: None,
            status_in_flight: false,
            result_requested: false,
        }
    }

    pub fn submission(&self) -> SubmissionId {
        self.submission
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn mode(&self) -> CloneMode {
        self.mode
    }

    pub fn handle(&self) -> Option<&JobHandle> {
        self.handle.as_ref()
    }

    pub fn status(&self) -> Option<&JobStatus> {
        self.status.as_ref()
    }

    pub fn result(&self) -> Option<&CloneResult> {
        self.result.as_ref()
    }

    pub fn is_status_in_flight(&self) -> bool {
        self.status_in_flight
    }

    pub fn is_result_requested(&self) -> bool {
        self.result_requested
    }
}

/// What a tick-driven status update asks the reconciler to do next.
pub(crate) enum StatusFollowUp {
    Continue,
    FetchResult,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    phase: Phase,
    url_input: String,
    mode: CloneMode,
    options: CloneOptions,
    last_submission: SubmissionId,
    job: Option<CurrentJob>,
    failure: Option<CloneFailure>,
    input_error: Option<ValidationError>,
    cancel_remote_on_reset: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also ask the backend to abandon the job when the user resets mid-poll.
    pub fn with_remote_cancel(mut self, enabled: bool) -> Self {
        self.cancel_remote_on_reset = enabled;
        self
    }

    pub fn view(&self) -> AppViewModel {
        let status = self.job.as_ref().and_then(CurrentJob::status);
        let result = self.job.as_ref().and_then(CurrentJob::result);
        AppViewModel {
            phase: self.phase,
            mode: self.mode,
            url_input: self.url_input.clone(),
            is_loading: matches!(self.phase, Phase::Submitting | Phase::Polling),
            job_id: self
                .job
                .as_ref()
                .and_then(CurrentJob::handle)
                .map(|handle| handle.as_str().to_string()),
            status: status.map(StatusView::from_status),
            result: result.cloned(),
            score: result.and_then(CloneResult::score).map(ScoreView::from_score),
            failure: self.failure.as_ref().map(ToString::to_string),
            input_error: self.input_error.as_ref().map(ToString::to_string),
            finished_without_artifact: self.finished_without_artifact(),
            dirty: self.dirty,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> CloneMode {
        self.mode
    }

    pub fn options(&self) -> &CloneOptions {
        &self.options
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn job(&self) -> Option<&CurrentJob> {
        self.job.as_ref()
    }

    pub fn failure(&self) -> Option<&CloneFailure> {
        self.failure.as_ref()
    }

    pub fn input_error(&self) -> Option<&ValidationError> {
        self.input_error.as_ref()
    }

    pub fn cancels_remote_on_reset(&self) -> bool {
        self.cancel_remote_on_reset
    }

    /// Nothing outstanding: either never submitted, reset, or finished.
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Done)
    }

    /// Returns whether the state changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_url_input(&mut self, text: String) {
        self.url_input = text;
        self.input_error = None;
        self.mark_dirty();
    }

    pub(crate) fn set_mode(&mut self, mode: CloneMode) {
        self.mode = mode;
        self.mark_dirty();
    }

    pub(crate) fn set_options(&mut self, options: CloneOptions) {
        self.options = options;
        self.mark_dirty();
    }

    pub(crate) fn reject_input(&mut self, err: ValidationError) {
        self.input_error = Some(err);
        self.mark_dirty();
    }

    /// Discards any prior job and opens a new slot for `request`.
    pub(crate) fn begin_submission(&mut self, request: &CloneRequest) -> SubmissionId {
        self.last_submission += 1;
        self.job = Some(CurrentJob::new(self.last_submission, request));
        self.failure = None;
        self.input_error = None;
        self.phase = Phase::Submitting;
        self.mark_dirty();
        self.last_submission
    }

    pub(crate) fn is_awaiting_dispatch(&self, submission: SubmissionId) -> bool {
        self.phase == Phase::Submitting
            && self
                .job
                .as_ref()
                .is_some_and(|job| job.submission == submission)
    }

    pub(crate) fn start_polling(&mut self, handle: JobHandle) {
        if let Some(job) = self.job.as_mut() {
            job.handle = Some(handle);
        }
        self.phase = Phase::Polling;
        self.mark_dirty();
    }

    /// The current job, only while it is being polled under `handle`.
    pub(crate) fn polling_job_mut(&mut self, handle: &JobHandle) -> Option<&mut CurrentJob> {
        if self.phase != Phase::Polling {
            return None;
        }
        self.job
            .as_mut()
            .filter(|job| job.handle.as_ref() == Some(handle))
    }

    pub(crate) fn active_handle(&self) -> Option<&JobHandle> {
        match self.phase {
            Phase::Polling => self.job.as_ref().and_then(CurrentJob::handle),
            _ => None,
        }
    }

    /// Claims the next status fetch. Fails while a fetch is outstanding.
    pub(crate) fn claim_status_fetch(&mut self, handle: &JobHandle) -> bool {
        match self.polling_job_mut(handle) {
            Some(job) if !job.status_in_flight && !job.result_requested => {
                job.status_in_flight = true;
                true
            }
            _ => false,
        }
    }

    /// Marks the outstanding status fetch as answered. False for replies
    /// that do not belong to the job being polled.
    pub(crate) fn release_status_fetch(&mut self, handle: &JobHandle) -> bool {
        match self.polling_job_mut(handle) {
            Some(job) => {
                job.status_in_flight = false;
                true
            }
            None => false,
        }
    }

    /// Stores a fetched status (last write wins) and reports what comes next.
    pub(crate) fn apply_status(&mut self, status: JobStatus) -> StatusFollowUp {
        let Some(job) = self.job.as_mut() else {
            return StatusFollowUp::Continue;
        };
        let state = status.state;
        let message = status.message.clone();
        job.status = Some(status);
        self.dirty = true;

        match state {
            JobState::Complete if job.result_requested => StatusFollowUp::Continue,
            JobState::Complete => {
                job.result_requested = true;
                StatusFollowUp::FetchResult
            }
            JobState::Error => StatusFollowUp::Failed(
                message.unwrap_or_else(|| JobState::Error.describe().to_string()),
            ),
            JobState::Pending
            | JobState::Scraping
            | JobState::Processing
            | JobState::Generating => StatusFollowUp::Continue,
        }
    }

    pub(crate) fn finish_with_result(&mut self, result: CloneResult) {
        if result.outcome == CloneOutcome::Error {
            let message = result
                .error_message
                .clone()
                .unwrap_or_else(|| JobState::Error.describe().to_string());
            self.failure = Some(CloneFailure::JobFailed(message));
        }
        if let Some(job) = self.job.as_mut() {
            job.status_in_flight = false;
            job.result = Some(result);
        }
        self.phase = Phase::Done;
        self.mark_dirty();
    }

    pub(crate) fn finish_without_result(&mut self) {
        if let Some(job) = self.job.as_mut() {
            job.status_in_flight = false;
        }
        self.phase = Phase::Done;
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, failure: CloneFailure) {
        if let Some(job) = self.job.as_mut() {
            job.status_in_flight = false;
        }
        self.failure = Some(failure);
        self.phase = Phase::Done;
        self.mark_dirty();
    }

    /// Back to idle with the slot, failure and input cleared.
    pub(crate) fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.url_input.clear();
        self.job = None;
        self.failure = None;
        self.input_error = None;
        self.mark_dirty();
    }

    fn finished_without_artifact(&self) -> bool {
        self.phase == Phase::Done
            && self.failure.is_none()
            && self
                .job
                .as_ref()
                .is_some_and(|job| job.result_requested && job.result.is_none())
    }
}
