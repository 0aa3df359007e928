//! One-shot stdin → analysis → stdout bridge
//!
//! Input is a single JSON line `{"reviews": [...], "url"?: ..., "platform"?: ...}`.
//! Scraping happens in front of this process; when a URL is passed without
//! reviews, the sample reviews stand in so the caller still gets an analysis.

use analysis::{AnalysisResult, Analyzer, ReviewRecord};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::BridgeError;

/// Parsed bridge input line.
#[derive(Debug, Deserialize)]
pub struct BridgeRequest {
    #[serde(default)]
    pub reviews: Option<Vec<ReviewRecord>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Reviews analyzed when the input carries none.
pub fn sample_reviews() -> Vec<ReviewRecord> {
    vec![
        ReviewRecord::new("", "This app is okay but the UX is confusing.", "3"),
        ReviewRecord::new("", "Too many ads. Unusable.", "1"),
    ]
}

/// Handle one input line and produce the analysis to print.
pub async fn handle_line(line: &str, analyzer: &dyn Analyzer) -> Result<AnalysisResult, BridgeError> {
    if line.trim().is_empty() {
        return Err(BridgeError::NoInput);
    }
    let request: BridgeRequest = serde_json::from_str(line)?;

    if let (Some(url), Some(platform)) = (&request.url, &request.platform) {
        info!(%platform, %url, "no scraper wired into the bridge, analyzing supplied reviews");
    }

    let reviews = match request.reviews {
        Some(reviews) if !reviews.is_empty() => reviews,
        _ => {
            info!("no reviews provided, using sample reviews");
            sample_reviews()
        }
    };

    info!(analyzer = analyzer.id(), reviews = reviews.len(), "analyzing reviews");
    let result = analyzer.classify(&reviews).await;
    if result.is_fallback() {
        warn!("analysis degraded, returning mock result");
    }
    Ok(result)
}
