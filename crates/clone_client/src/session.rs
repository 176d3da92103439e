use std::sync::Arc;
use std::time::Duration;

use clone_core::{update, AppState, AppViewModel, CloneMode, CloneOptions, Msg};
use clone_engine::{ApiError, CloneApi, ReqwestCloneApi};
use clone_logging::clone_debug;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::effects::EffectRunner;
use crate::{ClientConfig, ConfigError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build backend client: {0}")]
    Api(#[from] ApiError),
}

/// Owns the job state and runs the update loop for one user.
///
/// Must be created and driven from within a tokio runtime.
pub struct CloneSession {
    state: AppState,
    runner: EffectRunner,
    msg_rx: UnboundedReceiver<Msg>,
}

impl CloneSession {
    pub fn from_config(config: &ClientConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let api = ReqwestCloneApi::new(config.api_settings())?;
        Ok(Self::new(Arc::new(api), config.poll_interval())
            .with_remote_cancel(config.cancel_remote_on_reset))
    }

    pub fn new(api: Arc<dyn CloneApi>, poll_interval: Duration) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(),
            runner: EffectRunner::new(api, poll_interval, msg_tx),
            msg_rx,
        }
    }

    pub fn with_remote_cancel(mut self, enabled: bool) -> Self {
        self.state = std::mem::take(&mut self.state).with_remote_cancel(enabled);
        self
    }

    /// Applies one message and runs its effects. Returns whether the view changed.
    pub fn dispatch(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let changed = state.consume_dirty();
        self.state = state;
        if !effects.is_empty() {
            clone_debug!("Running effects {:?}", effects);
        }
        self.runner.enqueue(effects);
        changed
    }

    /// Replaces the input, selects `mode` and submits.
    pub fn submit(&mut self, url: &str, mode: CloneMode) {
        self.dispatch(Msg::InputChanged(url.to_string()));
        self.dispatch(Msg::ModeSelected(mode));
        self.dispatch(Msg::SubmitClicked);
    }

    pub fn set_options(&mut self, options: CloneOptions) {
        self.dispatch(Msg::OptionsChanged(options));
    }

    pub fn reset(&mut self) {
        self.dispatch(Msg::ResetClicked);
    }

    /// Applies every message that has already arrived, without waiting.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch(msg);
            processed += 1;
        }
        processed
    }

    /// Waits for the next engine message and applies it.
    pub async fn process_next(&mut self) -> bool {
        match self.msg_rx.recv().await {
            Some(msg) => self.dispatch(msg),
            None => false,
        }
    }

    /// Drives the loop until the job is finished, failed or reset.
    ///
    /// Polls indefinitely while the backend reports non-terminal states.
    pub async fn run_until_settled(&mut self) -> AppViewModel {
        while !self.state.is_settled() {
            self.process_next().await;
        }
        self.view()
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_polling(&self) -> bool {
        self.runner.is_polling()
    }
}
