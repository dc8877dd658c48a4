//! Endpoint resolution and the optional `~/.aishe/config.yaml` file.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment override for the server base URL.
pub const API_URL_ENV: &str = "AISHE_API_URL";

/// Environment override for the config file path.
pub const CONFIG_PATH_ENV: &str = "AISHE_CONFIG";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Must cover answer generation on the server, not just network latency.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Where and how long to wait. Fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    timeout: Duration,
}

impl Endpoint {
    /// Explicit `base_url`, else `AISHE_API_URL`, else the local default.
    pub fn resolve(base_url: Option<&str>, timeout: Duration) -> Self {
        let env = std::env::var(API_URL_ENV).ok();
        Self::new(pick_base_url(base_url, env.as_deref(), None), timeout)
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }
}

fn pick_base_url<'a>(
    explicit: Option<&'a str>,
    env: Option<&'a str>,
    file: Option<&'a str>,
) -> &'a str {
    let set = |s: &&str| !s.trim().is_empty();
    explicit
        .filter(set)
        .or(env.filter(set))
        .or(file.filter(set))
        .unwrap_or(DEFAULT_BASE_URL)
}

/// API section (base_url, timeout_secs).
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
}

impl Config {
    /// Endpoint for this config. `AISHE_API_URL` still wins over the file.
    pub fn endpoint(&self) -> Endpoint {
        let env = std::env::var(API_URL_ENV).ok();
        self.endpoint_with_env(env.as_deref())
    }

    fn endpoint_with_env(&self, env: Option<&str>) -> Endpoint {
        let timeout = self
            .api
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Endpoint::new(
            pick_base_url(None, env, self.api.base_url.as_deref()),
            timeout,
        )
    }
}

/// Returns the default config file path: `~/.aishe/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".aishe").join("config.yaml"))
}

/// `AISHE_CONFIG` if set, else [`default_config_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(val) => Some(PathBuf::from(val)),
        None => default_config_path(),
    }
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Load config if the file exists; a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    load(path)
}

/// Config load error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
