//! Clone engine: backend IO, request dispatch and the poll timer.
mod api;
mod dispatch;
mod poll_timer;
mod preview;
mod types;

pub use api::{ApiSettings, CloneApi, ReqwestCloneApi, SyncCloneReply};
pub use dispatch::{DispatchError, Dispatcher};
pub use poll_timer::{PollTimer, DEFAULT_POLL_INTERVAL};
pub use preview::preview_proxy_url;
pub use types::{ApiError, FailureKind};
