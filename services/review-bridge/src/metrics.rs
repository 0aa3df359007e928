//! Prometheus textfile exposition
//!
//! The bridge is a short-lived batch process, so nothing scrapes it. When
//! `[metrics] textfile` is set, the recorder is installed at startup and the
//! rendered exposition is written to that path when the run finishes, for a
//! node_exporter textfile collector to pick up.
//!
//! Counters recorded by the libraries:
//! - `analysis_requests_total` (counter): label `outcome`
//! - `credential_failures_total` (counter): label `service`

use std::path::Path;

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Write the rendered metrics to `path` atomically (temp file + rename).
pub fn write_textfile(handle: &PrometheusHandle, path: &Path) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "metrics.prom".into());
    let tmp_path = dir.join(format!(".{file_name}.tmp.{}", std::process::id()));

    std::fs::write(&tmp_path, handle.render())?;
    std::fs::rename(&tmp_path, path)?;
    debug!(path = %path.display(), "wrote metrics textfile");
    Ok(())
}
