use clone_logging::{clone_debug, clone_info, clone_warn};

use crate::state::StatusFollowUp;
use crate::{AppState, CloneFailure, CloneRequest, DispatchOutcome, Effect, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
///
/// Replies tagged with a submission or job handle other than the current
/// one are dropped, so nothing that was in flight before a reset or a new
/// submission can touch the fresh slot.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_url_input(text);
            Vec::new()
        }
        Msg::ModeSelected(mode) => {
            state.set_mode(mode);
            Vec::new()
        }
        Msg::OptionsChanged(options) => {
            state.set_options(options);
            Vec::new()
        }
        Msg::SubmitClicked => {
            let request =
                match CloneRequest::new(state.url_input(), state.mode(), state.options().clone()) {
                    Ok(request) => request,
                    Err(err) => {
                        clone_debug!("Submission rejected: {}", err);
                        state.reject_input(err);
                        return (state, Vec::new());
                    }
                };

            // Single-job invariant: a running poll goes away with its slot.
            let was_polling = state.phase() == Phase::Polling;
            let submission = state.begin_submission(&request);
            clone_info!(
                "Submitting #{} mode={:?} url={}",
                submission,
                request.mode,
                request.url
            );

            let mut effects = Vec::with_capacity(2);
            if was_polling {
                effects.push(Effect::StopPolling);
            }
            effects.push(Effect::Dispatch {
                submission,
                request,
            });
            effects
        }
        Msg::DispatchFinished { submission, result } => {
            if !state.is_awaiting_dispatch(submission) {
                clone_debug!("Ignoring stale dispatch reply for submission #{}", submission);
                // A job created after its submission was dropped is orphaned.
                let effects = match result {
                    Ok(DispatchOutcome::Deferred(handle)) if state.cancels_remote_on_reset() => {
                        clone_info!("Cancelling orphaned job {}", handle);
                        vec![Effect::CancelJob { handle }]
                    }
                    _ => Vec::new(),
                };
                return (state, effects);
            }
            match result {
                Ok(DispatchOutcome::Immediate(result)) => {
                    state.finish_with_result(result);
                    Vec::new()
                }
                Ok(DispatchOutcome::Deferred(handle)) => {
                    clone_info!("Polling job {}", handle);
                    state.start_polling(handle.clone());
                    vec![Effect::StartPolling { handle }]
                }
                Err(failure) => {
                    clone_warn!("Submission #{} failed: {}", submission, failure);
                    state.fail(failure);
                    Vec::new()
                }
            }
        }
        Msg::PollTick { handle } => {
            if state.claim_status_fetch(&handle) {
                vec![Effect::FetchStatus { handle }]
            } else {
                clone_debug!("Skipping poll tick for job {}", handle);
                Vec::new()
            }
        }
        Msg::StatusFetched { handle, result } => {
            if !state.release_status_fetch(&handle) {
                clone_debug!("Ignoring status for inactive job {}", handle);
                return (state, Vec::new());
            }
            let status = match result {
                Ok(status) => status,
                Err(message) => {
                    // Transient: the next tick tries again.
                    clone_warn!("Status poll for job {} failed: {}", handle, message);
                    return (state, Vec::new());
                }
            };

            match state.apply_status(status) {
                StatusFollowUp::Continue => Vec::new(),
                StatusFollowUp::FetchResult => vec![Effect::FetchResult { handle }],
                StatusFollowUp::Failed(message) => {
                    clone_warn!("Job {} failed: {}", handle, message);
                    state.fail(CloneFailure::JobFailed(message));
                    vec![Effect::StopPolling]
                }
            }
        }
        Msg::ResultFetched { handle, result } => {
            let awaiting = state
                .polling_job_mut(&handle)
                .is_some_and(|job| job.is_result_requested());
            if !awaiting {
                clone_debug!("Ignoring result for inactive job {}", handle);
                return (state, Vec::new());
            }
            match result {
                Ok(result) => {
                    clone_info!("Job {} finished", handle);
                    state.finish_with_result(result);
                }
                Err(message) => {
                    clone_warn!("Result fetch for job {} failed: {}", handle, message);
                    state.finish_without_result();
                }
            }
            vec![Effect::StopPolling]
        }
        Msg::ResetClicked => {
            let active = state.active_handle().cloned();
            state.reset();
            match active {
                Some(handle) if state.cancels_remote_on_reset() => {
                    vec![Effect::StopPolling, Effect::CancelJob { handle }]
                }
                Some(_) => vec![Effect::StopPolling],
                None => Vec::new(),
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
