//! Configuration types and loading
//!
//! Config source precedence: `--config` > `CONFIG_PATH` env var >
//! `review-bridge.toml` in the working directory > built-in defaults.
//! API keys never live in the TOML; they come from the environment or the
//! configured env file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use analysis::{ClientConfig, DEFAULT_ENDPOINT_URL, DEFAULT_SERVICE, DEFAULT_TIMEOUT_SECS};
use credential_pool::ServiceKeys;
use serde::Deserialize;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "review-bridge.toml";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Upstream analysis service settings
#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    /// Credential service whose keys authenticate analysis requests
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Key loading and cooldown settings
#[derive(Debug, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
    /// `.env`-style file overlaid on the process environment. Missing is fine.
    #[serde(default = "default_env_file")]
    pub env_file: Option<PathBuf>,
    #[serde(default = "ServiceKeys::defaults")]
    pub services: Vec<ServiceKeys>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus textfile written when the run finishes
    #[serde(default)]
    pub textfile: Option<PathBuf>,
}

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

fn default_service() -> String {
    DEFAULT_SERVICE.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_cooldown() -> u64 {
    3600
}

fn default_env_file() -> Option<PathBuf> {
    Some(PathBuf::from(".env"))
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            service: default_service(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown(),
            env_file: default_env_file(),
            services: ServiceKeys::defaults(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve and load the configuration.
    ///
    /// An explicitly named file must exist. Without one, the default file is
    /// used if present, otherwise the built-in defaults.
    pub fn resolve(cli_path: Option<&str>) -> common::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = Self::resolve_path(cli_path) {
            let config = Self::load(&path)?;
            return Ok((config, Some(path)));
        }

        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            let config = Self::load(&default_path)?;
            return Ok((config, Some(default_path)));
        }

        let config = Config::default();
        config.validate()?;
        Ok((config, None))
    }

    /// Explicit config path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> Option<PathBuf> {
        if let Some(p) = cli_path {
            return Some(PathBuf::from(p));
        }
        std::env::var("CONFIG_PATH").ok().map(PathBuf::from)
    }

    fn validate(&self) -> common::Result<()> {
        if !self.analysis.endpoint_url.starts_with("http://")
            && !self.analysis.endpoint_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "endpoint_url must start with http:// or https://, got: {}",
                self.analysis.endpoint_url
            )));
        }

        if self.analysis.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.credentials.cooldown_secs == 0 {
            return Err(common::Error::Config(
                "cooldown_secs must be greater than 0".into(),
            ));
        }

        let mut names: Vec<&str> = self
            .credentials
            .services
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(common::Error::Config(format!(
                "credential service {} is configured more than once",
                pair[0]
            )));
        }

        if !names.contains(&self.analysis.service.as_str()) {
            return Err(common::Error::Config(format!(
                "analysis service {} has no [[credentials.services]] entry",
                self.analysis.service
            )));
        }

        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint_url: self.analysis.endpoint_url.clone(),
            service: self.analysis.service.clone(),
            timeout: Duration::from_secs(self.analysis.timeout_secs),
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.credentials.cooldown_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("review-bridge.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[analysis]
endpoint_url = "http://127.0.0.1:9000/generate"
service = "CANOPY"
timeout_secs = 5

[credentials]
cooldown_secs = 60
env_file = "/etc/review-bridge/keys.env"

[[credentials.services]]
name = "CANOPY"
env_prefix = "CANOPY_API_KEY"

[metrics]
textfile = "/var/lib/node_exporter/review_bridge.prom"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.analysis.endpoint_url, "http://127.0.0.1:9000/generate");
        assert_eq!(config.analysis.service, "CANOPY");
        assert_eq!(config.cooldown(), Duration::from_secs(60));
        assert_eq!(
            config.credentials.env_file,
            Some(PathBuf::from("/etc/review-bridge/keys.env"))
        );
        assert_eq!(
            config.credentials.services,
            vec![ServiceKeys::new("CANOPY", "CANOPY_API_KEY")]
        );
        assert!(config.metrics.textfile.is_some());

        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.service, "CANOPY");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.analysis.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.analysis.service, "GEMINI");
        assert_eq!(config.analysis.timeout_secs, 30);
        assert_eq!(config.cooldown(), Duration::from_secs(3600));
        assert_eq!(config.credentials.env_file, Some(PathBuf::from(".env")));
        assert_eq!(config.credentials.services.len(), 3);
        assert!(config.metrics.textfile.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/path/review-bridge.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[analysis]
endpoint_url = "generativelanguage.googleapis.com/v1/models"
"#,
        );

        let err = Config::load(&path).unwrap_err().to_string();
        assert!(
            err.contains("endpoint_url must start with http"),
            "error message should explain the issue, got: {err}"
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[analysis]\ntimeout_secs = 0\n");
        assert!(Config::load(&path).is_err(), "timeout_secs = 0 must be rejected");
    }

    #[test]
    fn test_zero_cooldown_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[credentials]\ncooldown_secs = 0\n");
        assert!(Config::load(&path).is_err(), "cooldown_secs = 0 must be rejected");
    }

    #[test]
    fn test_analysis_service_must_be_configured() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[[credentials.services]]
name = "CANOPY"
env_prefix = "CANOPY_API_KEY"
"#,
        );

        let err = Config::load(&path).unwrap_err().to_string();
        assert!(err.contains("GEMINI"), "got: {err}");
    }

    #[test]
    fn test_duplicate_service_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[[credentials.services]]
name = "GEMINI"
env_prefix = "GEMINI_API_KEY"

[[credentials.services]]
name = "GEMINI"
env_prefix = "GOOGLE_API_KEY"
"#,
        );

        let err = Config::load(&path).unwrap_err().to_string();
        assert!(err.contains("more than once"), "got: {err}");
    }

    #[test]
    fn test_resolve_explicit_path_must_exist() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        assert!(Config::resolve(Some("/nonexistent/review-bridge.toml")).is_err());
    }

    #[test]
    fn test_resolve_explicit_path_loads() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[analysis]\ntimeout_secs = 7\n");

        let (config, used) = Config::resolve(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.analysis.timeout_secs, 7);
        assert_eq!(used, Some(path));
    }

    #[test]
    fn test_resolve_path_cli_arg() {
        let path = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, Some(PathBuf::from("/custom/path.toml")));
    }

    #[test]
    fn test_resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = Config::resolve_path(None);
        assert_eq!(path, Some(PathBuf::from("/env/path.toml")));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn test_resolve_path_none_without_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(Config::resolve_path(None), None);
    }

    #[test]
    fn test_resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let path = Config::resolve_path(Some("/cli/wins.toml"));
        assert_eq!(
            path,
            Some(PathBuf::from("/cli/wins.toml")),
            "CLI arg must take precedence over CONFIG_PATH env var"
        );
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }
}
