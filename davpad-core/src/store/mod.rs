//! Remote store capability
//!
//! The views never speak HTTP themselves. They hold a [`SharedStore`]
//! handle created by a [`StoreConnector`] at login time and call the
//! five operations below. The handle is shared by reference between the
//! file list and any editor opened from it; consistency between them is
//! left entirely to the server.

pub mod memory;
pub mod webdav;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use shared_types::Entry;

use crate::error::{StoreError, StoreResult};

pub use memory::{MemoryConnector, MemoryStore, StoreOperation};
pub use webdav::{WebDavConnector, WebDavStore};

/// Shared handle to an authenticated remote store
pub type SharedStore = Arc<dyn RemoteStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Text,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContents {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContents {
    pub fn into_text(self) -> String {
        match self {
            FileContents::Text(text) => text,
            FileContents::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            FileContents::Text(text) => text.into_bytes(),
            FileContents::Binary(bytes) => bytes,
        }
    }
}

/// Username and password, held in memory for the session only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl From<shared_types::LoginAttempt> for Credentials {
    fn from(value: shared_types::LoginAttempt) -> Self {
        Self {
            username: value.username,
            password: value.password,
        }
    }
}

/// Operations the views need from a remote file store.
///
/// Futures are not `Send`: the browser runs everything on one thread.
#[async_trait(?Send)]
pub trait RemoteStore {
    /// Metadata for a single path.
    async fn stat(&self, path: &str) -> StoreResult<Entry>;

    /// Existence check on the root, used purely as a credential test.
    async fn probe(&self) -> StoreResult<()> {
        self.stat("/").await.map(|_| ())
    }

    /// Entries directly inside `path`, excluding `path` itself.
    async fn list_directory(&self, path: &str) -> StoreResult<Vec<Entry>>;

    async fn read_file(&self, path: &str, mode: ReadMode) -> StoreResult<FileContents>;

    /// Create or replace the file at `path`.
    async fn write_file(&self, path: &str, contents: &[u8]) -> StoreResult<()>;
}

/// Builds a store handle from the configured base URL and user credentials.
pub trait StoreConnector {
    fn connect(&self, base_url: &str, credentials: Credentials) -> StoreResult<SharedStore>;
}

pub(crate) fn ensure_absolute(path: &str) -> StoreResult<String> {
    if path.contains('\0') {
        return Err(StoreError::InvalidPath("path contains null bytes".to_string()));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(StoreError::InvalidPath(format!(
            "path escapes the store root: {path}"
        )));
    }
    Ok(shared_types::normalize_path(path))
}
