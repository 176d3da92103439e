use crate::{
    CloneFailure, CloneMode, CloneOptions, CloneResult, DispatchOutcome, JobHandle, JobStatus,
    SubmissionId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the URL input box.
    InputChanged(String),
    /// User toggled between the direct-result and job modes.
    ModeSelected(CloneMode),
    /// User changed the clone options.
    OptionsChanged(CloneOptions),
    /// User submitted the current URL.
    SubmitClicked,
    /// The dispatcher answered for a submission.
    DispatchFinished {
        submission: SubmissionId,
        result: Result<DispatchOutcome, CloneFailure>,
    },
    /// Poll timer fired for a job.
    PollTick { handle: JobHandle },
    /// A status fetch finished. Errors are transient.
    StatusFetched {
        handle: JobHandle,
        result: Result<JobStatus, String>,
    },
    /// The one result fetch after completion finished.
    ResultFetched {
        handle: JobHandle,
        result: Result<CloneResult, String>,
    },
    /// User clicked Reset.
    ResetClicked,
    /// Fallback for placeholder wiring.
    NoOp,
}
