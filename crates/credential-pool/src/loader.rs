//! Loading service keys from an environment-style source

use common::EnvSource;
use serde::Deserialize;

/// Highest numbered suffix probed after the base key (`PREFIX_1` .. `PREFIX_10`).
pub const MAX_NUMBERED_KEYS: usize = 10;

/// A named service and the env prefix its keys live under.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceKeys {
    pub name: String,
    pub env_prefix: String,
}

impl ServiceKeys {
    pub fn new(name: impl Into<String>, env_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            env_prefix: env_prefix.into(),
        }
    }

    /// Services the analyzer knows about out of the box.
    pub fn defaults() -> Vec<ServiceKeys> {
        vec![
            ServiceKeys::new("GEMINI", "GEMINI_API_KEY"),
            ServiceKeys::new("CANOPY", "CANOPY_API_KEY"),
            ServiceKeys::new("OUTSCRAPER", "OUTSCRAPER_API_KEY"),
        ]
    }
}

/// Collect the keys for one prefix in preference order: the bare prefix first,
/// then each numbered suffix. Gaps in the numbering are allowed.
pub fn collect_keys(source: &EnvSource, env_prefix: &str) -> Vec<String> {
    std::iter::once(env_prefix.to_string())
        .chain((1..=MAX_NUMBERED_KEYS).map(|i| format!("{env_prefix}_{i}")))
        .filter_map(|name| source.get(&name))
        .collect()
}
