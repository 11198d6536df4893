use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_WEBDAV_URL: &str = "DAVPAD_WEBDAV_URL";
pub const ENV_ROOT_LABEL: &str = "DAVPAD_ROOT_LABEL";
pub const DEFAULT_ROOT_LABEL: &str = "Files";

/// Startup configuration, handed to the orchestrator once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Base URL of the WebDAV share, e.g. `https://cloud.example.org/remote.php/webdav`
    pub webdav_url: String,
    /// Label shown for `/` in the breadcrumb trail
    #[serde(default = "default_root_label")]
    pub root_label: String,
}

fn default_root_label() -> String {
    DEFAULT_ROOT_LABEL.to_string()
}

impl AppConfig {
    pub fn new(webdav_url: impl Into<String>, root_label: impl Into<String>) -> Self {
        Self {
            webdav_url: webdav_url.into(),
            root_label: root_label.into(),
        }
    }

    /// Parse the `config.json` bundled with the web front end.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the process environment, after applying a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a dotenv-style file without touching the process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for item in dotenvy::from_path_iter(path.as_ref())? {
            let (key, value) = item?;
            values.insert(key, value);
        }
        Self::from_lookup(|key| values.get(key).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let webdav_url = lookup(ENV_WEBDAV_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_WEBDAV_URL))?;
        let root_label = lookup(ENV_ROOT_LABEL).unwrap_or_else(default_root_label);

        let config = Self {
            webdav_url: webdav_url.trim().to_string(),
            root_label,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.webdav_url).map_err(|e| ConfigError::Invalid {
            key: "webdavUrl",
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "webdavUrl",
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.root_label.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "rootLabel",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
