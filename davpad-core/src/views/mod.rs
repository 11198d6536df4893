//! View state machines.
//!
//! Each view owns its transient UI state and exposes:
//! - synchronous `begin_*` transitions returning the request to perform,
//! - synchronous `finish_*` transitions settling the outcome,
//! - `async` conveniences composing both around the store call,
//! - a pure `view_model()` the front end renders from.

pub mod editor;
pub mod file_editor;
pub mod file_list;
pub mod login;

pub use editor::{
    editor_kind_for, CodeEditor, Editor, EditorInstance, EditorKind, LanguageMode,
    MarkdownEditor,
};
pub use file_editor::{
    EditorStatus, EditorToolbar, FileEditorView, FileEditorViewModel, SaveRequest, SAVED_MESSAGE,
};
pub use file_list::{
    validate_new_name, Activation, CreateControls, CreateFileState, CreateRequest, Download,
    EntryRow, FileListView, FileListViewModel, ListingStatus, NameValidity,
};
pub use login::{LoginState, LoginView, LoginViewModel};

pub const WRITE_FAILED_MESSAGE: &str = "Error while writing the file. Please see browser console for details and contact the administrator.";
pub const READ_FAILED_MESSAGE: &str = "Error while reading the file. Please see browser console for details and contact the administrator.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message the user must see once (rendered as an alert or banner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Identifies one in-flight request so late results can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default, Clone)]
pub(crate) struct Sequencer {
    latest: u64,
}

impl Sequencer {
    pub(crate) fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    /// The most recently issued ticket.
    pub(crate) fn current(&self) -> Ticket {
        Ticket(self.latest)
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Invalidate every outstanding ticket.
    pub(crate) fn bump(&mut self) {
        self.latest += 1;
    }
}
