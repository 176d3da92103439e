/// A submission rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("url must not be empty")]
    EmptyUrl,
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Failure of the current job, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CloneFailure {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// Network error or non-2xx reply on submission.
    #[error("request failed: {0}")]
    Transport(String),
    /// The direct-result endpoint answered `success: false`.
    #[error("{0}")]
    Rejected(String),
    /// The job reached the error state.
    #[error("{0}")]
    JobFailed(String),
}
