//! Error taxonomy for the notifier.
//!
//! Configuration problems are raised before any network call; API failures
//! carry enough context to decide at the call site whether they are fatal,
//! tolerated (`already_reacted`) or best-effort.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NotifyError>;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// A required input is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// GitHub returned a non-success status.
    #[error("github api {endpoint} returned status {status}")]
    GithubStatus { endpoint: String, status: u16 },

    /// Slack answered with `ok: false`.
    #[error("slack {method} failed: {code}")]
    Slack { method: String, code: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    pub fn config(message: impl Into<String>) -> Self {
        NotifyError::Config(message.into())
    }

    /// True when a reactions.add call failed only because the reaction is
    /// already on the message.
    pub fn is_already_reacted(&self) -> bool {
        matches!(self, NotifyError::Slack { code, .. } if code == "already_reacted")
    }
}
