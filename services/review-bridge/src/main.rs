//! Review analysis bridge
//!
//! Batch-mode process that:
//! 1. Loads API keys from the environment (and an optional env file)
//! 2. Reads one JSON line of reviews from stdin
//! 3. Runs the analysis with key failover and mock fallback
//! 4. Writes exactly one JSON line to stdout: the result or `{"error": ...}`
//!
//! All diagnostics go to stderr as JSON log lines.

mod bridge;
mod config;
mod error;
mod metrics;

use std::io::Write;
use std::sync::Arc;

use analysis::ResilientClient;
use anyhow::{Context, Result};
use common::EnvSource;
use credential_pool::CredentialPool;
use tokio::io::AsyncBufReadExt;
use tracing::{Instrument, debug, error, info, info_span, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() {
    // Initialize tracing with JSON output on stderr and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let run_id = uuid::Uuid::new_v4();
    let span = info_span!("review_bridge", %run_id);

    let outcome = run().instrument(span.clone()).await;

    let _entered = span.enter();
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = write_output(&mut stdout, outcome) {
        error!(error = %e, "failed to write result to stdout");
    }
}

/// Write the run's outcome as exactly one JSON line: the result, or
/// `{"error": ...}` carrying the full error chain.
fn write_output<W: Write>(out: &mut W, outcome: Result<serde_json::Value>) -> std::io::Result<()> {
    let value = match outcome {
        Ok(value) => value,
        Err(e) => {
            error!(error = format!("{e:#}"), "run failed");
            serde_json::json!({ "error": format!("{e:#}") })
        }
    };
    writeln!(out, "{value}")?;
    out.flush()
}

/// Everything that can fail before the result is printed.
async fn run() -> Result<serde_json::Value> {
    info!("starting review-bridge");

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let (config, config_path) =
        Config::resolve(cli_config_path).context("failed to load configuration")?;

    info!(
        config = ?config_path.as_ref().map(|p| p.display().to_string()),
        endpoint_url = %config.analysis.endpoint_url,
        service = %config.analysis.service,
        timeout_secs = config.analysis.timeout_secs,
        cooldown_secs = config.credentials.cooldown_secs,
        "configuration loaded"
    );

    let prometheus = match &config.metrics.textfile {
        Some(_) => Some(metrics::install_recorder()?),
        None => None,
    };

    let mut source = EnvSource::from_process();
    if let Some(env_file) = &config.credentials.env_file {
        source = source
            .with_env_file(env_file)
            .with_context(|| format!("failed to read env file {}", env_file.display()))?;
    }

    let pool = CredentialPool::from_source(&config.credentials.services, &source, config.cooldown());
    let client = ResilientClient::new(reqwest::Client::new(), Arc::new(pool), config.client_config());

    let mut line = String::new();
    tokio::io::BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read stdin")?;

    let result = bridge::handle_line(&line, &client).await?;
    debug!(pool = %client.pool().health().await, "credential pool state after run");

    if let (Some(handle), Some(path)) = (&prometheus, &config.metrics.textfile) {
        if let Err(e) = metrics::write_textfile(handle, path) {
            warn!(path = %path.display(), error = %e, "failed to write metrics textfile");
        }
    }

    info!(fallback = result.is_fallback(), "run complete");
    Ok(serde_json::to_value(&result)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(outcome: Result<serde_json::Value>) -> String {
        let mut buf = Vec::new();
        write_output(&mut buf, outcome).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn failed_run_prints_single_error_line() {
        let outcome = Err(anyhow::anyhow!("bad toml\nat line 3")).context("failed to load configuration");
        let out = written(outcome);

        assert_eq!(out.lines().count(), 1, "got: {out:?}");
        assert!(out.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "error": "failed to load configuration: bad toml\nat line 3" })
        );
    }

    #[test]
    fn successful_run_prints_result_line() {
        let result = analysis::AnalysisResult::fallback();
        let out = written(Ok(serde_json::to_value(&result).unwrap()));

        assert_eq!(out.lines().count(), 1);
        let parsed: analysis::AnalysisResult = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(parsed, result);
    }
}
