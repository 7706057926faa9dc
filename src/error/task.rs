use thiserror::Error;

/// Failure of a single probe attempt.
///
/// These never reach the caller as errors: the runner folds each one into a
/// status-0 result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("{message}")]
    Transport { message: String },
    #[error("Failed to read response body: {message}")]
    Body { message: String },
    #[error("Invalid JSON response body: {message}")]
    InvalidJson { message: String },
}

impl TaskError {
    /// Short error class name, used as the prefix of the stringified error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "TimeoutError",
            TaskError::Transport { .. } => "TransportError",
            TaskError::Body { .. } => "BodyError",
            TaskError::InvalidJson { .. } => "SyntaxError",
        }
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }

    /// Flattens a reqwest error and its source chain into one message.
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        TaskError::Transport { message }
    }
}
