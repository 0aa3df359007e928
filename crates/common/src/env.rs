//! Environment-style key/value lookup
//!
//! Credentials are read from the process environment, optionally overlaid with
//! a `.env`-style file (`KEY=VALUE` per line, `#` comments ignored). The file is
//! parsed with `dotenvy`'s iterator so the process environment is never mutated;
//! values from the file shadow process variables of the same name.
//!
//! The file follows dotenv quoting rules: unquoted and double-quoted values
//! expand `$VAR` / `${VAR}` and drop a trailing ` #comment`. Keys containing `$`
//! or ` #` must be single-quoted (`GEMINI_API_KEY='ab$cd'`) to be read literally.
//! Lines that do not parse are skipped with a warning.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Read-only key/value source for configuration lookups.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    overlay: HashMap<String, String>,
    include_process: bool,
}

impl EnvSource {
    /// Lookups fall through to the process environment.
    pub fn from_process() -> Self {
        Self {
            overlay: HashMap::new(),
            include_process: true,
        }
    }

    /// A fixed set of pairs with no process fallback. Used by tests and callers
    /// that already hold their configuration in memory.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            overlay: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            include_process: false,
        }
    }

    /// Overlay the pairs from an env file. A missing file leaves the source
    /// unchanged; an unreadable file is an error. Individual malformed lines are
    /// skipped.
    pub fn with_env_file(mut self, path: &Path) -> Result<Self> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                debug!(path = %path.display(), "env file not found, skipping");
                return Ok(self);
            }
            Err(e) => {
                return Err(Error::EnvFile(format!("{}: {e}", path.display())));
            }
        };

        let mut loaded = 0usize;
        let mut skipped = 0usize;
        for item in iter {
            match item {
                Ok((key, value)) => {
                    self.overlay.insert(key, value);
                    loaded += 1;
                }
                // The parse error echoes the raw line, which may hold a key.
                Err(dotenvy::Error::LineParse(_, pos)) => {
                    skipped += 1;
                    warn!(path = %path.display(), pos, "skipping unparseable env file line");
                }
                Err(e) => return Err(Error::EnvFile(format!("{}: {e}", path.display()))),
            }
        }
        info!(path = %path.display(), entries = loaded, skipped, "loaded env file");
        Ok(self)
    }

    /// Look up a key. Empty values are treated as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match self.overlay.get(key) {
            Some(v) => Some(v.clone()),
            None if self.include_process => std::env::var(key).ok(),
            None => None,
        };
        value.filter(|v| !v.is_empty())
    }
}
