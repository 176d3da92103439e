use crate::{CloneRequest, JobHandle, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send exactly one submission request.
    Dispatch {
        submission: SubmissionId,
        request: CloneRequest,
    },
    /// Start the fixed-period poll timer, replacing any active one.
    StartPolling { handle: JobHandle },
    FetchStatus { handle: JobHandle },
    FetchResult { handle: JobHandle },
    /// Cancel the poll timer. Idempotent.
    StopPolling,
    /// Ask the backend to abandon a job.
    CancelJob { handle: JobHandle },
}
