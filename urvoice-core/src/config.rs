//! Client configuration
//!
//! Defaults can be overridden from the environment and then with builder
//! methods.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_BASE_URL: &str = "URVOICE_BASE_URL";
pub const ENV_CONNECT_TIMEOUT: &str = "URVOICE_CONNECT_TIMEOUT_SECS";
pub const ENV_READ_TIMEOUT: &str = "URVOICE_READ_TIMEOUT_SECS";
pub const ENV_DATA_DIR: &str = "URVOICE_DATA_DIR";

const DATABASE_FILE: &str = "urvoice.db";

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend root; endpoint paths and media uploads resolve against it
    pub base_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Directory holding the local settings database
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Defaults overlaid with any `URVOICE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(url)?;
        }
        if let Some(secs) = lookup(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout = parse_secs(ENV_CONNECT_TIMEOUT, &secs)?;
        }
        if let Some(secs) = lookup(ENV_READ_TIMEOUT) {
            config.read_timeout = parse_secs(ENV_READ_TIMEOUT, &secs)?;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }

        debug!("Loaded config: base_url={}", config.base_url);
        Ok(config)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let trimmed = url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Error::Config(format!(
                "base URL must start with http:// or https://, got {trimmed:?}"
            )));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Base URL without a trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Join an endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base(), path.trim_start_matches('/'))
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("urvoice")
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| Error::Config(format!("{key}: {e}")))
}
