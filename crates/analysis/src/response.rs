//! Decoding the generate endpoint's reply

use serde::Deserialize;

use crate::error::AttemptError;
use crate::review::AnalysisResult;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Pull the first candidate's generated text out of a raw response body.
pub fn extract_text(body: &str) -> Result<String, AttemptError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AttemptError::MalformedResponse(e.to_string()))?;

    let first = response
        .candidates
        .into_iter()
        .next()
        .ok_or(AttemptError::NoCandidates)?;

    first
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .map(|t| t.trim().to_string())
        .ok_or_else(|| AttemptError::MalformedResponse("first candidate has no text part".into()))
}

/// Remove a fenced code block wrapper: a leading line starting with ``` (an
/// optional language hint such as `json` may follow) and a trailing ``` line.
/// Text that does not start with a fence is returned trimmed and otherwise untouched.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }

    let inner = match text.find('\n') {
        Some(newline) => &text[newline + 1..],
        None => "",
    };
    let inner = inner.trim_end();
    let inner = match inner.rfind('\n') {
        Some(newline) if inner[newline + 1..].starts_with("```") => &inner[..newline],
        None if inner.starts_with("```") => "",
        _ => inner,
    };
    inner.trim()
}

/// Parse generated text (fenced or not) into an analysis result.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AttemptError> {
    Ok(serde_json::from_str(strip_code_fence(text))?)
}
