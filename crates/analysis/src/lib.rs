//! Review analysis against an external LLM service
//!
//! Turns a batch of scraped review records into a fixed-shape analysis result
//! (categories, a software opportunity, marketing copy). The `ResilientClient`
//! talks to the upstream generate endpoint using keys from a `CredentialPool`,
//! rotates keys on 401/429, and degrades to a clearly marked mock result on any
//! other failure. Callers never see an error from `classify`.
//!
//! Request flow:
//! 1. `prompt::build_payload()` renders the records into the request body
//! 2. The client picks the first eligible key and POSTs with `?key=...`
//! 3. `response::extract_text()` pulls the generated text out of the reply
//! 4. `response::strip_code_fence()` removes a surrounding ``` block
//! 5. The remaining text is parsed as an `AnalysisResult`

pub mod client;
pub mod constants;
pub mod error;
pub mod prompt;
pub mod response;
pub mod review;

pub use client::{ClientConfig, ResilientClient};
pub use constants::*;
pub use error::AttemptError;
pub use review::{AnalysisResult, Categories, Marketing, ReviewRecord, SoftwareOpportunity};

use std::future::Future;
use std::pin::Pin;

/// Anything that can turn review records into an analysis result.
///
/// Implementations must not fail: a degraded run returns the fallback result.
/// Uses `Pin<Box<dyn Future>>` so callers can hold an `Arc<dyn Analyzer>`.
pub trait Analyzer: Send + Sync {
    /// Identifier for logging (e.g. the upstream service name)
    fn id(&self) -> &str;

    fn classify<'a>(
        &'a self,
        records: &'a [ReviewRecord],
    ) -> Pin<Box<dyn Future<Output = AnalysisResult> + Send + 'a>>;
}
