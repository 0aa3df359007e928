//! Review records in, analysis results out

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::MOCK_MARKER;

/// One scraped review, as supplied by a scraper or the bridge input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
    /// Free-form rating ("3", "2 stars", ...). Numeric JSON ratings are kept as
    /// their decimal text.
    #[serde(default, deserialize_with = "rating_as_string")]
    pub rating: String,
}

impl ReviewRecord {
    pub fn new(platform: &str, body: &str, rating: &str) -> Self {
        Self {
            platform: platform.to_string(),
            title: None,
            body: body.to_string(),
            rating: rating.to_string(),
        }
    }
}

fn rating_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// Fixed-shape analysis result. Both real and fallback results serialize every
/// field, so consumers never branch on structure.
///
/// The three sections are required when parsing upstream output; fields inside
/// a section default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub categories: Categories,
    pub software_opportunity: SoftwareOpportunity,
    pub marketing: Marketing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Categories {
    pub pain_points: Vec<String>,
    pub missing_features: Vec<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftwareOpportunity {
    pub concept: String,
    pub target_users: String,
    pub value_prop: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marketing {
    pub ad_copy: String,
    pub image_prompt: String,
    pub video_script: String,
}

impl AnalysisResult {
    /// The deterministic stand-in returned whenever the upstream call cannot
    /// complete. Every human-readable field carries the mock marker.
    pub fn fallback() -> Self {
        let mock = |text: &str| format!("{MOCK_MARKER}: {text}");
        Self {
            categories: Categories {
                pain_points: vec![mock("complicated setup"), mock("price is too high")],
                missing_features: vec![mock("offline mode"), mock("data export")],
                highlights: vec![mock("fast response")],
            },
            software_opportunity: SoftwareOpportunity {
                concept: mock("minimalist productivity assistant"),
                target_users: mock("students and office workers"),
                value_prop: mock(
                    "this analysis was generated from mock data; it demonstrates the full pipeline",
                ),
            },
            marketing: Marketing {
                ad_copy: mock("boost your productivity by 200%!"),
                image_prompt: mock("modern desk with a clock and a notebook"),
                video_script: mock("the camera moves from a cluttered desk to an organized one"),
            },
        }
    }

    /// Whether this is the fallback result rather than a real analysis.
    pub fn is_fallback(&self) -> bool {
        self.software_opportunity
            .concept
            .strip_prefix(MOCK_MARKER)
            .is_some_and(|rest| rest.starts_with(':'))
    }
}
