use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::domain::{Result, TraderError};

pub const DEFAULT_BASE_URL: &str = "https://api.steam-trader.com/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Load a TOML configuration file. A missing file is created with defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        confy::load_path(path).map_err(|e| {
            TraderError::InvalidConfiguration(format!("cannot load {}: {}", path.display(), e))
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings and return the parsed base address.
    pub fn validate(&self) -> Result<Url> {
        if self.api_key.is_empty() {
            return Err(TraderError::InvalidConfiguration("API key must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(TraderError::InvalidConfiguration("timeout must be positive".to_string()));
        }

        let mut base_url = Url::parse(&self.base_url).map_err(|e| {
            TraderError::InvalidConfiguration(format!("invalid base URL {:?}: {}", self.base_url, e))
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(TraderError::InvalidConfiguration(format!(
                "base URL {:?} must use http or https",
                self.base_url
            )));
        }

        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(base_url)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
