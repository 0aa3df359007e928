//! Upstream defaults
//!
//! These are overridable from the bridge config; the defaults point at the
//! public Gemini generate endpoint.

/// Generate endpoint for the default model.
pub const DEFAULT_ENDPOINT_URL: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-2.5-flash:generateContent";

/// Pool service whose keys authenticate analysis requests.
pub const DEFAULT_SERVICE: &str = "GEMINI";

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Query parameter carrying the API key.
pub const KEY_QUERY_PARAM: &str = "key";

/// Prefix placed on every human-readable field of the fallback result.
pub const MOCK_MARKER: &str = "Mock";
