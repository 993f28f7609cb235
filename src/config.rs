//! Client configuration.
//!
//! Loaded from a YAML document such as:
//!
//! ```yaml
//! baseurl: https://dtrack.example.com/api/v1
//! token: odt_xxxxxxxx
//! verify: true
//! ```
//!
//! or from the `DT_API_KEY` / `DT_API_URL` environment variables.

use std::env;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DtError, Result};

/// Base URL used when `DT_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8081/api/v1";

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Constructor arguments for [`crate::DtClient`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. `https://dtrack.example.com/api/v1`.
    #[serde(alias = "base_url")]
    pub baseurl: String,

    /// API key sent as `X-Api-Key`.
    pub token: String,

    /// Verify TLS certificates.
    #[serde(default = "default_verify")]
    pub verify: bool,

    /// Leave paging to the server. When false every collection GET asks for
    /// a single large page.
    #[serde(default)]
    pub paginated: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_verify() -> bool {
    true
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    /// Configuration with defaults for everything but URL and token.
    pub fn new(baseurl: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            baseurl: baseurl.into(),
            token: token.into(),
            verify: default_verify(),
            paginated: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from a YAML file.
    ///
    /// A leading `~/` is expanded against `HOME`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let path = expand_home(path);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DtError::ConfigMissing(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from environment variables.
    ///
    /// Uses `DT_API_KEY` for authentication and optionally `DT_API_URL`
    /// for the base URL (defaults to [`DEFAULT_API_URL`]).
    ///
    /// # Errors
    ///
    /// Returns an error if `DT_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let token = env::var("DT_API_KEY").map_err(|_| {
            DtError::ConfigMissing("DT_API_KEY environment variable not set".to_string())
        })?;
        let baseurl = env::var("DT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let config = Self::new(baseurl, token);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.baseurl.trim().is_empty() {
            return Err(DtError::InvalidConfig("baseurl must not be empty".to_string()));
        }
        if self.token.trim().is_empty() {
            return Err(DtError::InvalidConfig("token must not be empty".to_string()));
        }
        Ok(())
    }
}

fn expand_home(path: &Path) -> std::path::PathBuf {
    match (path.strip_prefix("~"), env::var_os("HOME")) {
        (Ok(rest), Some(home)) => Path::new(&home).join(rest),
        _ => path.to_path_buf(),
    }
}
