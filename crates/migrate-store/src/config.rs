//! Tool configuration
//!
//! ```json
//! {
//!   "credentials": {
//!     "1234": {"apiKey": "...", "appKey": "..."}
//!   },
//!   "site": "datadoghq.eu"
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Site used when the config does not name one
pub const DEFAULT_SITE: &str = "datadoghq.com";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("unable to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No credentials for an organisation
    #[error("no credential from orgID: {0}")]
    NoCredential(i64),
}

/// API credentials of one organisation
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// API key
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// Application key
    #[serde(rename = "appKey")]
    pub app_key: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"<redacted>")
            .field("app_key", &"<redacted>")
            .finish()
    }
}

/// Tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Credentials keyed by organisation ID
    #[serde(default)]
    pub credentials: HashMap<String, Credential>,

    /// API site, e.g. `datadoghq.com`
    #[serde(default = "default_site")]
    pub site: String,
}

fn default_site() -> String {
    DEFAULT_SITE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: HashMap::new(),
            site: default_site(),
        }
    }
}

impl Config {
    /// Parse from JSON text
    ///
    /// # Errors
    /// Returns error if the text is not a valid config
    pub fn from_json(content: &str, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })
    }

    /// Load from a JSON file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&content, path)
    }

    /// Add credentials for an organisation
    #[must_use]
    pub fn with_credential(mut self, org_id: i64, api_key: &str, app_key: &str) -> Self {
        self.credentials.insert(
            org_id.to_string(),
            Credential {
                api_key: api_key.to_string(),
                app_key: app_key.to_string(),
            },
        );
        self
    }

    /// Credentials for an organisation
    ///
    /// # Errors
    /// Returns [`ConfigError::NoCredential`] if the organisation is unknown
    pub fn credentials_for(&self, org_id: i64) -> Result<&Credential, ConfigError> {
        self.credentials
            .get(&org_id.to_string())
            .ok_or(ConfigError::NoCredential(org_id))
    }

    /// Base URL of the API for the configured site
    #[must_use]
    pub fn api_base_url(&self) -> String {
        format!("https://api.{}", self.site)
    }
}
