use std::sync::Arc;
use std::time::Duration;

use clone_core::{CloneFailure, Effect, Msg};
use clone_engine::{CloneApi, Dispatcher, PollTimer};
use clone_logging::{clone_info, clone_warn};
use tokio::sync::mpsc::UnboundedSender;

/// Executes effects against the engine and reports back as messages.
///
/// Network effects each run on their own task; must be used from within a
/// tokio runtime.
pub(crate) struct EffectRunner {
    api: Arc<dyn CloneApi>,
    dispatcher: Dispatcher,
    timer: PollTimer,
    msg_tx: UnboundedSender<Msg>,
}

impl EffectRunner {
    pub(crate) fn new(
        api: Arc<dyn CloneApi>,
        poll_interval: Duration,
        msg_tx: UnboundedSender<Msg>,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(api.clone()),
            api,
            timer: PollTimer::new(poll_interval),
            msg_tx,
        }
    }

    pub(crate) fn is_polling(&self) -> bool {
        self.timer.is_active()
    }

    pub(crate) fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Dispatch {
                    submission,
                    request,
                } => {
                    let dispatcher = self.dispatcher.clone();
                    let msg_tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        let result = dispatcher
                            .submit(&request)
                            .await
                            .map_err(CloneFailure::from);
                        let _ = msg_tx.send(Msg::DispatchFinished { submission, result });
                    });
                }
                Effect::StartPolling { handle } => {
                    let msg_tx = self.msg_tx.clone();
                    self.timer.start(handle, move |handle| {
                        let _ = msg_tx.send(Msg::PollTick {
                            handle: handle.clone(),
                        });
                    });
                }
                Effect::FetchStatus { handle } => {
                    let api = self.api.clone();
                    let msg_tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        let result = api
                            .fetch_status(&handle)
                            .await
                            .map_err(|err| err.to_string());
                        let _ = msg_tx.send(Msg::StatusFetched { handle, result });
                    });
                }
                Effect::FetchResult { handle } => {
                    let api = self.api.clone();
                    let msg_tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        let result = api
                            .fetch_result(&handle)
                            .await
                            .map_err(|err| err.to_string());
                        let _ = msg_tx.send(Msg::ResultFetched { handle, result });
                    });
                }
                Effect::StopPolling => {
                    self.timer.stop();
                }
                Effect::CancelJob { handle } => {
                    let api = self.api.clone();
                    tokio::spawn(async move {
                        match api.cancel_job(&handle).await {
                            Ok(()) => clone_info!("Cancelled job {} on the backend", handle),
                            Err(err) => clone_warn!("Cancelling job {} failed: {}", handle, err),
                        }
                    });
                }
            }
        }
    }
}
