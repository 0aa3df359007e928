//! Resilient client for the generate endpoint
//!
//! One `classify` call makes sequential attempts, each with the pool's current
//! first eligible key. A 401/429 puts that key into cooldown and moves on to the
//! next one; anything else that goes wrong ends the call with the fallback
//! result. The number of attempts is capped at the number of configured keys.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use credential_pool::{CredentialPool, FailureClass, SelectedKey};
use reqwest::StatusCode;
use tracing::{debug, error, info, instrument, warn};

use crate::constants::{DEFAULT_ENDPOINT_URL, DEFAULT_SERVICE, DEFAULT_TIMEOUT_SECS, KEY_QUERY_PARAM};
use crate::error::AttemptError;
use crate::prompt::{GenerateRequest, build_payload};
use crate::response::{extract_text, parse_analysis};
use crate::review::{AnalysisResult, ReviewRecord};
use crate::Analyzer;

/// Upper bound on how much of an error body is kept for logging.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Preview length for the debug log of generated text.
const PREVIEW_CHARS: usize = 100;

/// Where and how to reach the analysis service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint_url: String,
    /// Pool service name whose keys are used.
    pub service: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Analysis client with key failover and a guaranteed result.
pub struct ResilientClient {
    http: reqwest::Client,
    pool: Arc<CredentialPool>,
    config: ClientConfig,
}

impl ResilientClient {
    pub fn new(http: reqwest::Client, pool: Arc<CredentialPool>, config: ClientConfig) -> Self {
        Self { http, pool, config }
    }

    /// The pool this client draws keys from.
    pub fn pool(&self) -> &Arc<CredentialPool> {
        &self.pool
    }

    /// Analyze `records`. Always returns a structurally valid result; failures
    /// are logged and yield `AnalysisResult::fallback()`.
    #[instrument(skip_all, fields(service = %self.config.service, records = records.len()))]
    pub async fn classify(&self, records: &[ReviewRecord]) -> AnalysisResult {
        let service = self.config.service.as_str();
        let payload = build_payload(records);
        let budget = self.pool.len(service).await;

        for attempt in 1..=budget {
            let Some(selected) = self.pool.get_key(service).await else {
                break;
            };

            match self.attempt(&selected, &payload).await {
                Ok(result) => {
                    record_outcome("success");
                    info!(attempt, key_index = selected.index, "analysis complete");
                    return result;
                }
                Err(e) => match e.class() {
                    FailureClass::CredentialRejected => {
                        record_outcome("rotated");
                        warn!(
                            attempt,
                            key_index = selected.index,
                            error = %e,
                            "key rejected by upstream, rotating"
                        );
                        self.pool.mark_failed(service, selected.key.expose()).await;
                    }
                    FailureClass::Unrecoverable => {
                        record_outcome("fallback");
                        error!(
                            attempt,
                            key_index = selected.index,
                            kind = e.kind(),
                            error = %e,
                            "analysis failed, falling back to mock result"
                        );
                        return AnalysisResult::fallback();
                    }
                },
            }
        }

        record_outcome("no_credential");
        info!(keys = budget, "no usable key, falling back to mock result");
        AnalysisResult::fallback()
    }

    /// One POST with one key.
    async fn attempt(
        &self,
        selected: &SelectedKey,
        payload: &GenerateRequest,
    ) -> Result<AnalysisResult, AttemptError> {
        debug!(key_index = selected.index, url = %self.config.endpoint_url, "sending analysis request");

        let url = reqwest::Url::parse_with_params(
            &self.config.endpoint_url,
            &[(KEY_QUERY_PARAM, selected.key.expose().as_str())],
        )
        .map_err(|e| AttemptError::InvalidEndpoint(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .timeout(self.config.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| AttemptError::Transport(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::Transport(e.without_url()))?;

        if status != StatusCode::OK {
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let text = extract_text(&body)?;
        debug!(preview = %truncate(&text, PREVIEW_CHARS), "generated content");
        parse_analysis(&text)
    }
}

impl Analyzer for ResilientClient {
    fn id(&self) -> &str {
        &self.config.service
    }

    fn classify<'a>(
        &'a self,
        records: &'a [ReviewRecord],
    ) -> Pin<Box<dyn Future<Output = AnalysisResult> + Send + 'a>> {
        Box::pin(ResilientClient::classify(self, records))
    }
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("analysis_requests_total", "outcome" => outcome).increment(1);
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
