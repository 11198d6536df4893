//! davpad core: headless view state machines for a WebDAV file editor.
//!
//! Runs natively (tests, demos) and in the browser via `davpad-web`.

pub mod config;
pub mod error;
pub mod markdown;
pub mod orchestrator;
pub mod store;
pub mod views;

pub use config::AppConfig;
pub use error::{ConfigError, StoreError, StoreResult};
pub use orchestrator::{Orchestrator, Screen, Session, UNLOAD_WARNING};
pub use store::{
    Credentials, FileContents, MemoryConnector, MemoryStore, ReadMode, RemoteStore,
    SharedStore, StoreConnector, WebDavConnector, WebDavStore,
};
pub use views::{FileEditorView, FileListView, LoginView, Notice, NoticeLevel};
