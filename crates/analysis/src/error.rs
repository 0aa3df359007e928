//! Error types for a single upstream attempt
//!
//! These never escape `ResilientClient::classify`; they decide whether the next
//! step is a key rotation or the fallback result, and they are logged.

use credential_pool::{FailureClass, classify_status};

/// Why one upstream attempt did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// Timeout, connection failure, or unreadable body. The URL is stripped
    /// before this is built so the key never reaches the logs.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(String),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("no candidates in upstream response")]
    NoCandidates,

    #[error("generated text is not a valid analysis: {0}")]
    Parse(#[from] serde_json::Error),
}

impl AttemptError {
    /// Whether switching to another key could help.
    pub fn class(&self) -> FailureClass {
        match self {
            AttemptError::Status { status, .. } => classify_status(*status),
            _ => FailureClass::Unrecoverable,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::Transport(e) if e.is_timeout() => "timeout",
            AttemptError::Transport(_) => "transport",
            AttemptError::InvalidEndpoint(_) => "invalid_endpoint",
            AttemptError::Status { .. } => "status",
            AttemptError::MalformedResponse(_) => "malformed_response",
            AttemptError::NoCandidates => "no_candidates",
            AttemptError::Parse(_) => "parse",
        }
    }
}
