//! Shared types between the core and the web front end
//!
//! These types are used by both:
//! - the view state machines in `davpad-core` (native and WASM)
//! - the Dioxus components in `davpad-web` (WASM)
//!
//! Serializable with serde so messages can cross any boundary unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Directory entries
// ============================================================================

/// Kind of a remote directory entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One item of a directory listing, as reported by the remote store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    /// Absolute path relative to the store root, e.g. `/notes/todo.md`
    pub path: String,
    /// Last path segment
    pub basename: String,
    pub kind: EntryKind,
    /// Size in bytes (files only)
    pub size: Option<u64>,
    /// Last-modified timestamp exactly as the server sent it
    pub last_modified: Option<String>,
    pub content_type: Option<String>,
}

impl Entry {
    pub fn file(path: &str, size: u64) -> Self {
        let path = normalize_path(path);
        Self {
            basename: basename(&path).to_string(),
            path,
            kind: EntryKind::File,
            size: Some(size),
            last_modified: None,
            content_type: None,
        }
    }

    pub fn directory(path: &str) -> Self {
        let path = normalize_path(path);
        Self {
            basename: basename(&path).to_string(),
            path,
            kind: EntryKind::Directory,
            size: None,
            last_modified: None,
            content_type: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn extension(&self) -> String {
        file_extension(&self.basename)
    }

    pub fn icon(&self) -> EntryIcon {
        match self.action() {
            EntryAction::Navigate => EntryIcon::Folder,
            EntryAction::Edit => EntryIcon::Editable,
            EntryAction::Download => EntryIcon::Download,
        }
    }

    /// What activating this entry in a listing does.
    pub fn action(&self) -> EntryAction {
        if self.is_directory() {
            EntryAction::Navigate
        } else if is_editable(&self.basename) {
            EntryAction::Edit
        } else {
            EntryAction::Download
        }
    }
}

/// Icon marker shown in the type column of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryIcon {
    Folder,
    Editable,
    Download,
}

impl EntryIcon {
    pub fn marker(&self) -> &'static str {
        match self {
            EntryIcon::Folder => "folder",
            EntryIcon::Editable => "editable",
            EntryIcon::Download => "download",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            EntryIcon::Folder => "📁",
            EntryIcon::Editable => "✎",
            EntryIcon::Download => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryAction {
    Navigate,
    Edit,
    Download,
}

// ============================================================================
// File classification
// ============================================================================

/// Extensions opened in the editor; `""` means "no extension".
pub const EDITABLE_EXTENSIONS: [&str; 13] = [
    "", "md", "txt", "tex", "html", "yml", "py", "ts", "css", "scss", "less", "r", "xml",
];

/// Lower-cased text after the last `.` of `filename`, or `""` if there is none.
pub fn file_extension(filename: &str) -> String {
    let name = basename(filename);
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

pub fn is_editable(filename: &str) -> bool {
    let extension = file_extension(filename);
    EDITABLE_EXTENSIONS.contains(&extension.as_str())
}

/// Human readable size using base-1024 units and one decimal place.
///
/// `2048` renders as `"2 KiB"`, `1572864` as `"1.5 MiB"`.
pub fn humanize_size(bytes: u64) -> String {
    const UNITS: [(u32, &str); 3] = [(3, "GiB"), (2, "MiB"), (1, "KiB")];

    for (power, unit) in UNITS {
        let scale = 1024u64.pow(power);
        if bytes >= scale {
            let rounded = (bytes as f64 / scale as f64 * 10.0).round() / 10.0;
            return format!("{rounded} {unit}");
        }
    }
    format!("{bytes} B")
}

// ============================================================================
// Remote paths
// ============================================================================

/// Collapse empty segments and force a leading `/`; the root is `/`.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Join a directory and a child name without doubling the separator.
pub fn join_path(directory: &str, name: &str) -> String {
    let directory = normalize_path(directory);
    let name = name.trim_matches('/');
    if directory == "/" {
        format!("/{name}")
    } else {
        format!("{directory}/{name}")
    }
}

pub fn basename(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

pub fn parent_path(path: &str) -> String {
    let path = normalize_path(path);
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
    }
}

/// One clickable segment of the breadcrumb trail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    /// Directory this crumb navigates to
    pub path: String,
    pub is_root: bool,
}

/// Build the breadcrumb trail for `directory`.
///
/// The first crumb is always `root_label` targeting `/`; every further
/// segment targets the cumulative path up to and including itself.
pub fn breadcrumbs(directory: &str, root_label: &str) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        label: root_label.to_string(),
        path: "/".to_string(),
        is_root: true,
    }];

    let mut cumulative = String::new();
    for segment in directory.split('/').filter(|s| !s.is_empty()) {
        cumulative.push('/');
        cumulative.push_str(segment);
        crumbs.push(Breadcrumb {
            label: segment.to_string(),
            path: cumulative.clone(),
            is_root: false,
        });
    }
    crumbs
}

// ============================================================================
// Cross-view messages
// ============================================================================

/// Emitted by the login form on submit
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginAttempt {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginAttempt")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Emitted by the file list when an editable file is clicked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditFile {
    pub filename: String,
}

/// Emitted by the editor toolbar's close button
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloseFile {}

/// The only channel between views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "detail", rename_all = "camelCase")]
pub enum ViewEvent {
    Login(LoginAttempt),
    EditFile(EditFile),
    CloseFile(CloseFile),
}

impl From<LoginAttempt> for ViewEvent {
    fn from(value: LoginAttempt) -> Self {
        ViewEvent::Login(value)
    }
}

impl From<EditFile> for ViewEvent {
    fn from(value: EditFile) -> Self {
        ViewEvent::EditFile(value)
    }
}

impl From<CloseFile> for ViewEvent {
    fn from(value: CloseFile) -> Self {
        ViewEvent::CloseFile(value)
    }
}

// ============================================================================
// Tests
// ============================================================================
