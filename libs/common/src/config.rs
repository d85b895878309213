//! Client configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `TASKDECK_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use crate::error::{ConfigError, ConfigResult};

/// Backend the client talks to when nothing else is configured
pub const DEFAULT_BASE_URL: &str =
    "https://task-management-sys-backend-ef3eff66e369.herokuapp.com/api/";

/// Location of the persisted key/value storage file
pub const DEFAULT_STORAGE_PATH: &str = ".taskdeck/storage.json";

/// Key the credential is stored under
pub const DEFAULT_STORAGE_KEY: &str = "token";

const ENV_PREFIX: &str = "TASKDECK";

/// Configuration shared by the session and project clients
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Base URL every request path is resolved against
    pub base_url: String,
    /// Path of the JSON file holding persisted client state
    pub storage_path: PathBuf,
    /// Key of the credential inside the storage file
    pub storage_key: String,
    /// Per-request timeout; unset means the transport default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig from defaults and environment variables
    ///
    /// # Environment Variables
    /// - `TASKDECK_BASE_URL`: backend base URL (default: the hosted API)
    /// - `TASKDECK_STORAGE_PATH`: storage file (default: ".taskdeck/storage.json")
    /// - `TASKDECK_STORAGE_KEY`: credential key (default: "token")
    /// - `TASKDECK_REQUEST_TIMEOUT_SECS`: request timeout in seconds (default: none)
    pub fn from_env() -> ConfigResult<Self> {
        Self::build(None)
    }

    /// Create a new ClientConfig from a TOML file, with environment
    /// variables taking precedence over the file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        Self::build(Some(path))
    }

    fn build(file: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("storage_path", DEFAULT_STORAGE_PATH)?
            .set_default("storage_key", DEFAULT_STORAGE_KEY)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: ClientConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        // The base URL must parse as http(s)
        config.base_url()?;

        info!(
            base_url = %config.base_url,
            storage_path = %config.storage_path.display(),
            "Client configuration loaded"
        );
        Ok(config)
    }

    /// Parsed base URL, normalised to end with a slash so relative paths
    /// join underneath it
    pub fn base_url(&self) -> ConfigResult<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }

        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        Ok(url)
    }

    /// Request timeout, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
