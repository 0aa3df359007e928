//! Request payload for the generate endpoint
//!
//! The prompt embeds the records as compact JSON followed by the result schema,
//! so the same input always produces the same request body.

use serde::Serialize;

use crate::review::ReviewRecord;

const PROMPT_HEADER: &str = "You are a senior market analyst and product manager. \
Analyze the following user reviews:";

const PROMPT_SCHEMA: &str = r#"Respond with JSON in exactly this shape:
{
  "categories": {
    "pain_points": ["core pain point 1", "pain point 2"],
    "missing_features": ["feature users want but lack 1", "feature 2"],
    "highlights": ["what users praise 1", "praise 2"]
  },
  "software_opportunity": {
    "concept": "a catchy name for software that could win this market",
    "target_users": "who the target users are",
    "value_prop": "one-sentence value proposition"
  },
  "marketing": {
    "ad_copy": "a short, compelling ad copy",
    "image_prompt": "an English text-to-image prompt showing the core usage scene",
    "video_script": "outline of a 15-second short video script"
  }
}
Output only the JSON, with no extra explanation."#;

#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub struct Part {
    pub text: String,
}

/// Render the prompt text for a batch of reviews.
pub fn build_prompt(records: &[ReviewRecord]) -> String {
    // Serializing plain strings into a Vec cannot fail.
    let reviews = serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string());
    format!("{PROMPT_HEADER}\n{reviews}\n\n{PROMPT_SCHEMA}")
}

/// Build the request body with a single free-text prompt part.
pub fn build_payload(records: &[ReviewRecord]) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: build_prompt(records),
            }],
        }],
    }
}
