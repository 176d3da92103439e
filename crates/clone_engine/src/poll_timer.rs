use std::time::Duration;

use clone_core::JobHandle;
use clone_logging::clone_debug;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

const MIN_PERIOD: Duration = Duration::from_millis(1);

struct ActivePoll {
    handle: JobHandle,
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Fixed-period timer driving status polls for at most one job.
///
/// The first tick fires one period after `start`. Once `stop` returns no new
/// tick begins; on a multi-threaded runtime a tick already running on
/// another worker may still finish, and the reconciler discards it because
/// the job is no longer being polled.
pub struct PollTimer {
    period: Duration,
    active: Option<ActivePoll>,
}

impl PollTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            active: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts ticking for `handle`, stopping any previous poll first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, handle: JobHandle, on_tick: F)
    where
        F: Fn(&JobHandle) + Send + 'static,
    {
        self.stop();
        clone_debug!("Poll timer started for job {} every {:?}", handle, self.period);
        let token = CancellationToken::new();
        let task = tokio::spawn(run_ticks(
            handle.clone(),
            self.period,
            token.clone(),
            on_tick,
        ));
        self.active = Some(ActivePoll {
            handle,
            token,
            task,
        });
    }

    /// Cancels the active poll. Returns false when nothing was running.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.token.cancel();
                active.task.abort();
                clone_debug!("Poll timer stopped for job {}", active.handle);
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_handle(&self) -> Option<&JobHandle> {
        self.active.as_ref().map(|active| &active.handle)
    }
}

impl Default for PollTimer {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticks<F>(handle: JobHandle, period: Duration, token: CancellationToken, on_tick: F)
where
    F: Fn(&JobHandle) + Send + 'static,
{
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                if token.is_cancelled() {
                    break;
                }
                on_tick(&handle);
            }
        }
    }
}
