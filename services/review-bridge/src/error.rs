//! Service-specific error types

use thiserror::Error;

/// Failures of a single bridge invocation that are reported to the caller as
/// `{"error": ...}` on stdout. Analysis failures never show up here; they
/// degrade to the fallback result instead.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("No input data provided")]
    NoInput,

    #[error("invalid input JSON: {0}")]
    InvalidInput(#[from] serde_json::Error),
}
