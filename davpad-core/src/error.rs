//! Error types shared by the store, the views and configuration loading.

/// Failure talking to the remote store
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("HTTP error: {status} ({path})")]
    Http { status: u16, path: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, StoreError::Unauthorized)
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        StoreError::Transport(value.to_string())
    }
}

impl From<quick_xml::Error> for StoreError {
    fn from(value: quick_xml::Error) -> Self {
        StoreError::InvalidResponse(value.to_string())
    }
}

/// Result type for remote store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure loading or validating [`crate::config::AppConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Failed to parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}
