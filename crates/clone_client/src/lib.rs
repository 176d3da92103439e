//! Clone client: drives the clone state machine against the backend.
mod config;
mod effects;
mod session;

pub use config::{ClientConfig, ConfigError, LogTarget, LoggingConfig};
pub use session::{CloneSession, SessionError};
