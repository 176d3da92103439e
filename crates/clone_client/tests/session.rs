mod common;

use std::time::Duration;

use clone_client::CloneSession;
use clone_core::{CloneMode, CloneOutcome, CloneResult, JobState, Phase};
use clone_engine::{SyncCloneReply, DEFAULT_POLL_INTERVAL};
use common::{network_error, status, Calls, ScriptedApi};
use pretty_assertions::assert_eq;
use tokio::time::{sleep, Instant};

const SLACK: Duration = Duration::from_millis(100);

fn init_logging() {
    clone_logging::initialize_for_tests();
}

/// Runs the loop until the first status has been reconciled.
async fn until_first_status(session: &mut CloneSession) {
    while session.view().status.is_none() {
        session.process_next().await;
    }
}

#[tokio::test(start_paused = true)]
async fn async_job_completes_after_three_ticks() {
    init_logging();
    let api = ScriptedApi::new()
        .with_job("job-1")
        .with_statuses(vec![
            status("job-1", JobState::Pending, 0),
            status("job-1", JobState::Generating, 60),
            status("job-1", JobState::Complete, 100),
        ])
        .with_result(Ok(CloneResult::completed("job-1", "https://a.com")))
        .build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    let started = Instant::now();
    session.submit("https://a.com", CloneMode::Async);
    let view = session.run_until_settled().await;

    assert_eq!(view.phase, Phase::Done);
    assert_eq!(view.job_id.as_deref(), Some("job-1"));
    assert_eq!(
        view.result.map(|result| result.outcome),
        Some(CloneOutcome::Complete)
    );
    assert_eq!(view.status.map(|status| status.progress), Some(100));
    assert_eq!(
        api.calls(),
        Calls {
            create_job: 1,
            fetch_status: 3,
            fetch_result: 1,
            ..Calls::default()
        }
    );
    assert!(!session.is_polling());
    let elapsed = started.elapsed();
    assert!(elapsed >= DEFAULT_POLL_INTERVAL * 3, "elapsed {elapsed:?}");
    assert!(elapsed < DEFAULT_POLL_INTERVAL * 4, "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn async_job_error_surfaces_message_without_result_fetch() {
    init_logging();
    let api = ScriptedApi::new()
        .with_job("job-1")
        .with_statuses(vec![
            status("job-1", JobState::Pending, 0),
            status("job-1", JobState::Generating, 60),
            Ok(clone_core::JobStatus::new("job-1", JobState::Error, 0).with_message("timeout")),
        ])
        .build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    session.submit("https://a.com", CloneMode::Async);
    let view = session.run_until_settled().await;

    assert_eq!(view.phase, Phase::Done);
    assert_eq!(view.failure.as_deref(), Some("timeout"));
    assert_eq!(view.result, None);
    assert_eq!(api.calls().fetch_result, 0);
    assert!(!session.is_polling());

    // The stopped timer stays silent.
    sleep(DEFAULT_POLL_INTERVAL * 2 + SLACK).await;
    session.process_pending();
    assert_eq!(api.calls().fetch_status, 3);
}

#[tokio::test(start_paused = true)]
async fn sync_success_never_polls() {
    init_logging();
    let api = ScriptedApi::new()
        .with_sync_reply(SyncCloneReply {
            success: true,
            id: Some("abc".to_string()),
            html: Some("<html></html>".to_string()),
            preview_url: None,
            processing_time: Some(3.0),
            message: None,
        })
        .build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    session.submit("https://a.com", CloneMode::Sync);
    let view = session.run_until_settled().await;

    assert_eq!(view.phase, Phase::Done);
    let result = view.result.expect("result");
    assert_eq!(result.outcome, CloneOutcome::Complete);
    assert_eq!(result.processing_time_seconds, Some(3.0));
    assert_eq!(
        api.calls(),
        Calls {
            clone_now: 1,
            ..Calls::default()
        }
    );
    assert!(!session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn sync_rejection_is_reported() {
    init_logging();
    let api = ScriptedApi::new()
        .with_sync_reply(SyncCloneReply {
            success: false,
            id: None,
            html: None,
            preview_url: None,
            processing_time: None,
            message: Some("scrape failed".to_string()),
        })
        .build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    session.submit("https://a.com", CloneMode::Sync);
    let view = session.run_until_settled().await;

    assert_eq!(view.failure.as_deref(), Some("scrape failed"));
    assert!(!session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn async_submission_failure_starts_no_poll() {
    init_logging();
    let api = ScriptedApi::new().with_job_error(network_error()).build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    session.submit("https://a.com", CloneMode::Async);
    let view = session.run_until_settled().await;

    assert_eq!(view.phase, Phase::Done);
    assert!(view.failure.expect("failure").starts_with("request failed"));
    assert!(!session.is_polling());
    assert_eq!(api.calls().fetch_status, 0);
}

#[tokio::test(start_paused = true)]
async fn blank_url_makes_no_call() {
    init_logging();
    let api = ScriptedApi::new().with_job("job-1").build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    session.submit("   ", CloneMode::Async);
    sleep(SLACK).await;
    session.process_pending();

    assert_eq!(session.view().phase, Phase::Idle);
    assert!(session.view().input_error.is_some());
    assert_eq!(api.calls(), Calls::default());
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_timer_and_clears_job() {
    init_logging();
    let api = ScriptedApi::new().with_job("job-1").build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    session.submit("https://a.com", CloneMode::Async);
    until_first_status(&mut session).await;
    assert!(session.is_polling());
    let polls_before_reset = api.calls().fetch_status;

    session.reset();
    assert!(!session.is_polling());
    let view = session.view();
    assert_eq!(view.phase, Phase::Idle);
    assert_eq!(view.job_id, None);
    assert_eq!(view.status, None);
    assert_eq!(view.result, None);

    sleep(DEFAULT_POLL_INTERVAL * 2 + SLACK).await;
    session.process_pending();
    assert_eq!(api.calls().fetch_status, polls_before_reset);
    assert_eq!(api.calls().cancel_job, 0);
    assert!(session.state().job().is_none());
}

#[tokio::test(start_paused = true)]
async fn reset_twice_is_harmless() {
    init_logging();
    let api = ScriptedApi::new().with_job("job-1").build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    session.submit("https://a.com", CloneMode::Async);
    until_first_status(&mut session).await;
    session.reset();
    session.reset();

    sleep(DEFAULT_POLL_INTERVAL * 2 + SLACK).await;
    session.process_pending();
    assert_eq!(session.view().phase, Phase::Idle);
    assert!(!session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn reset_with_remote_cancel_deletes_job() {
    init_logging();
    let api = ScriptedApi::new().with_job("job-1").build();
    let mut session =
        CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL).with_remote_cancel(true);

    session.submit("https://a.com", CloneMode::Async);
    until_first_status(&mut session).await;
    session.reset();
    sleep(SLACK).await;

    assert_eq!(api.calls().cancel_job, 1);
}

#[tokio::test(start_paused = true)]
async fn reset_before_job_is_created_still_cancels_it_remotely() {
    init_logging();
    let api = ScriptedApi::new().with_job("job-1").build();
    let mut session =
        CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL).with_remote_cancel(true);

    session.submit("https://a.com", CloneMode::Async);
    session.reset();
    sleep(SLACK).await;
    assert_eq!(session.process_pending(), 1);
    sleep(SLACK).await;

    assert_eq!(api.calls().create_job, 1);
    assert_eq!(api.calls().cancel_job, 1);
    assert!(!session.is_polling());
    assert_eq!(session.view().phase, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn transient_poll_failure_is_retried_on_next_tick() {
    init_logging();
    let api = ScriptedApi::new()
        .with_job("job-1")
        .with_statuses(vec![
            Err(network_error()),
            status("job-1", JobState::Complete, 100),
        ])
        .with_result(Ok(CloneResult::completed("job-1", "https://a.com")))
        .build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    session.submit("https://a.com", CloneMode::Async);
    let view = session.run_until_settled().await;

    assert_eq!(view.failure, None);
    assert!(view.result.is_some());
    assert_eq!(api.calls().fetch_status, 2);
    assert_eq!(api.calls().fetch_result, 1);
}

#[tokio::test(start_paused = true)]
async fn failed_result_fetch_finishes_without_artifact() {
    init_logging();
    let api = ScriptedApi::new()
        .with_job("job-1")
        .with_statuses(vec![status("job-1", JobState::Complete, 100)])
        .with_result(Err(network_error()))
        .build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    session.submit("https://a.com", CloneMode::Async);
    let view = session.run_until_settled().await;

    assert_eq!(view.phase, Phase::Done);
    assert_eq!(view.result, None);
    assert_eq!(view.failure, None);
    assert!(view.finished_without_artifact);
    assert!(!session.is_polling());
    assert_eq!(api.calls().fetch_result, 1);
}

#[tokio::test(start_paused = true)]
async fn new_submission_replaces_active_poll() {
    init_logging();
    let api = ScriptedApi::new().with_job("job-1").build();
    let mut session = CloneSession::new(api.clone(), DEFAULT_POLL_INTERVAL);

    session.submit("https://a.com", CloneMode::Async);
    until_first_status(&mut session).await;

    session.submit("https://b.com", CloneMode::Async);
    assert!(!session.is_polling());
    assert_eq!(session.view().status, None);

    while session.view().phase != Phase::Polling {
        session.process_next().await;
    }
    assert!(session.is_polling());
    assert_eq!(api.calls().create_job, 2);
    assert_eq!(
        session.state().job().map(|job| job.url().to_string()),
        Some("https://b.com".to_string())
    );
}
