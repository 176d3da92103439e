#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use clone_core::{CloneRequest, CloneResult, JobHandle, JobState, JobStatus};
use clone_engine::{ApiError, CloneApi, FailureKind, SyncCloneReply};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub clone_now: usize,
    pub create_job: usize,
    pub fetch_status: usize,
    pub fetch_result: usize,
    pub cancel_job: usize,
}

/// In-memory backend answering from a script and counting calls.
pub struct ScriptedApi {
    sync_reply: Mutex<Option<Result<SyncCloneReply, ApiError>>>,
    job: Mutex<Option<Result<JobHandle, ApiError>>>,
    statuses: Mutex<VecDeque<Result<JobStatus, ApiError>>>,
    result: Mutex<Option<Result<CloneResult, ApiError>>>,
    calls: Mutex<Calls>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            sync_reply: Mutex::new(None),
            job: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            result: Mutex::new(None),
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn with_sync_reply(self, reply: SyncCloneReply) -> Self {
        *self.sync_reply.lock().unwrap() = Some(Ok(reply));
        self
    }

    pub fn with_job(self, id: &str) -> Self {
        *self.job.lock().unwrap() = Some(Ok(JobHandle::new(id)));
        self
    }

    pub fn with_job_error(self, err: ApiError) -> Self {
        *self.job.lock().unwrap() = Some(Err(err));
        self
    }

    pub fn with_statuses(self, statuses: Vec<Result<JobStatus, ApiError>>) -> Self {
        self.statuses.lock().unwrap().extend(statuses);
        self
    }

    pub fn with_result(self, result: Result<CloneResult, ApiError>) -> Self {
        *self.result.lock().unwrap() = Some(result);
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Calls {
        *self.calls.lock().unwrap()
    }
}

pub fn network_error() -> ApiError {
    ApiError {
        kind: FailureKind::Network,
        message: "connection reset".to_string(),
    }
}

pub fn status(id: &str, state: JobState, progress: u8) -> Result<JobStatus, ApiError> {
    Ok(JobStatus::new(id, state, progress))
}

fn unscripted(what: &str) -> ApiError {
    ApiError {
        kind: FailureKind::HttpStatus(404),
        message: format!("no scripted {what}"),
    }
}

#[async_trait::async_trait]
impl CloneApi for ScriptedApi {
    async fn clone_now(&self, _request: &CloneRequest) -> Result<SyncCloneReply, ApiError> {
        self.calls.lock().unwrap().clone_now += 1;
        self.sync_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(unscripted("sync reply")))
    }

    async fn create_job(&self, _request: &CloneRequest) -> Result<JobHandle, ApiError> {
        self.calls.lock().unwrap().create_job += 1;
        self.job
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(unscripted("job")))
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus, ApiError> {
        self.calls.lock().unwrap().fetch_status += 1;
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(JobStatus::new(handle.as_str(), JobState::Pending, 0)))
    }

    async fn fetch_result(&self, _handle: &JobHandle) -> Result<CloneResult, ApiError> {
        self.calls.lock().unwrap().fetch_result += 1;
        self.result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(unscripted("result")))
    }

    async fn cancel_job(&self, _handle: &JobHandle) -> Result<(), ApiError> {
        self.calls.lock().unwrap().cancel_job += 1;
        Ok(())
    }
}
