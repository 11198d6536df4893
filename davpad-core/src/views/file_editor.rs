//! Load, edit, reload and save a single remote file.

use std::fmt;
use std::sync::Arc;

use shared_types::{basename, CloseFile};

use super::editor::{Editor, EditorInstance, EditorKind};
use super::{Notice, Sequencer, Ticket, READ_FAILED_MESSAGE, WRITE_FAILED_MESSAGE};
use crate::error::StoreResult;
use crate::store::{FileContents, ReadMode, SharedStore};

pub const SAVED_MESSAGE: &str = "Successfully written";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorStatus {
    Loading,
    Ready,
    /// The initial load failed. Reload retries; save stays disabled so an
    /// empty buffer never replaces the remote file.
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Busy {
    Reloading,
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub path: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorToolbar {
    pub filename: String,
    /// Full path, shown on hover
    pub title: String,
    pub close_enabled: bool,
    pub reload_enabled: bool,
    pub save_enabled: bool,
    pub reloading: bool,
    pub saving: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEditorViewModel {
    pub path: String,
    pub status: EditorStatus,
    pub toolbar: EditorToolbar,
    pub kind: EditorKind,
    pub value: String,
    pub preview_html: Option<String>,
    pub notice: Option<Notice>,
}

pub struct FileEditorView {
    store: SharedStore,
    path: String,
    status: EditorStatus,
    editor: EditorInstance,
    busy: Option<Busy>,
    notice: Option<Notice>,
    requests: Sequencer,
}

impl fmt::Debug for FileEditorView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileEditorView")
            .field("path", &self.path)
            .field("status", &self.status)
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

impl FileEditorView {
    /// Mount the editor for `path` in `Loading`; the editor kind is picked
    /// from the extension right away.
    pub fn new(store: SharedStore, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            store,
            editor: EditorInstance::for_path(&path),
            path,
            status: EditorStatus::Loading,
            busy: None,
            notice: None,
            requests: Sequencer::default(),
        }
    }

    pub async fn open(store: SharedStore, path: impl Into<String>) -> Self {
        let mut view = Self::new(store, path);
        if let Some(ticket) = view.begin_load() {
            let store = Arc::clone(&view.store);
            let result = store.read_file(&view.path, ReadMode::Text).await;
            view.finish_load(ticket, result);
        }
        view
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status(&self) -> &EditorStatus {
        &self.status
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn editor(&self) -> &EditorInstance {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorInstance {
        &mut self.editor
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Start the initial fetch. Only valid while `Loading`.
    pub fn begin_load(&mut self) -> Option<Ticket> {
        (self.status == EditorStatus::Loading).then(|| self.requests.issue())
    }

    pub fn finish_load(&mut self, ticket: Ticket, result: StoreResult<FileContents>) -> bool {
        if !self.requests.is_current(ticket) || self.status != EditorStatus::Loading {
            return false;
        }

        match result {
            Ok(contents) => {
                self.editor.set_value(&contents.into_text());
                self.status = EditorStatus::Ready;
                tracing::debug!(path = %self.path, "File loaded");
            }
            Err(error) => {
                tracing::warn!(path = %self.path, error = %error, "Error while reading the file");
                self.notice = Some(Notice::error(READ_FAILED_MESSAGE));
                self.status = EditorStatus::Unavailable(error.to_string());
            }
        }
        true
    }

    /// Re-fetch the file. Allowed when ready or after a failed initial
    /// load, never while another save or reload is running.
    pub fn begin_reload(&mut self) -> Option<Ticket> {
        if self.busy.is_some() || self.status == EditorStatus::Loading {
            return None;
        }
        self.busy = Some(Busy::Reloading);
        Some(self.requests.issue())
    }

    /// Overwrites the buffer with the remote contents. Local edits are
    /// discarded without asking.
    pub fn finish_reload(&mut self, ticket: Ticket, result: StoreResult<FileContents>) -> bool {
        if !self.requests.is_current(ticket) || self.busy != Some(Busy::Reloading) {
            return false;
        }
        self.busy = None;

        match result {
            Ok(contents) => {
                self.editor.set_value(&contents.into_text());
                self.status = EditorStatus::Ready;
                tracing::debug!(path = %self.path, "File reloaded");
            }
            Err(error) => {
                tracing::warn!(path = %self.path, error = %error, "Error while reloading the file");
                self.notice = Some(Notice::error(READ_FAILED_MESSAGE));
            }
        }
        true
    }

    pub async fn reload(&mut self) -> Option<StoreResult<()>> {
        let ticket = self.begin_reload()?;
        let store = Arc::clone(&self.store);
        let result = store.read_file(&self.path, ReadMode::Text).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.finish_reload(ticket, result);
        Some(outcome)
    }

    /// Snapshot the buffer for writing. Only while ready and idle.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        if self.busy.is_some() || self.status != EditorStatus::Ready {
            return None;
        }
        self.busy = Some(Busy::Saving);
        Some(SaveRequest {
            path: self.path.clone(),
            contents: self.editor.value(),
        })
    }

    /// The buffer is left untouched whatever the outcome.
    pub fn finish_save(&mut self, request: &SaveRequest, result: StoreResult<()>) {
        if self.busy != Some(Busy::Saving) {
            return;
        }
        self.busy = None;

        match result {
            Ok(()) => {
                tracing::info!(path = %request.path, bytes = request.contents.len(), "File written");
                self.notice = Some(Notice::info(SAVED_MESSAGE));
            }
            Err(error) => {
                tracing::warn!(path = %request.path, error = %error, "Error while writing the file");
                self.notice = Some(Notice::error(WRITE_FAILED_MESSAGE));
            }
        }
    }

    pub async fn save(&mut self) -> Option<StoreResult<()>> {
        let request = self.begin_save()?;
        let store = Arc::clone(&self.store);
        let result = store
            .write_file(&request.path, request.contents.as_bytes())
            .await;
        self.finish_save(&request, result.clone());
        Some(result)
    }

    /// No unsaved-changes check; the orchestrator tears the view down.
    pub fn close(&self) -> CloseFile {
        tracing::debug!(path = %self.path, "Closing editor");
        CloseFile {}
    }

    pub fn view_model(&self) -> FileEditorViewModel {
        let idle = self.busy.is_none();
        let toolbar = EditorToolbar {
            filename: basename(&self.path).to_string(),
            title: self.path.clone(),
            close_enabled: true,
            reload_enabled: idle && self.status != EditorStatus::Loading,
            save_enabled: idle && self.status == EditorStatus::Ready,
            reloading: self.busy == Some(Busy::Reloading),
            saving: self.busy == Some(Busy::Saving),
        };

        let preview_html = match &self.editor {
            EditorInstance::Markdown(markdown) if markdown.is_previewing() => {
                Some(markdown.preview_html())
            }
            _ => None,
        };

        FileEditorViewModel {
            path: self.path.clone(),
            status: self.status.clone(),
            toolbar,
            kind: self.editor.kind(),
            value: self.editor.value(),
            preview_html,
            notice: self.notice.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{MemoryStore, StoreOperation};
    use crate::views::editor::LanguageMode;
    use crate::views::NoticeLevel;

    fn store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::new()
                .with_file("/docs/readme.md", "# Hello")
                .with_file("/src/main.py", "print('hi')\n"),
        )
    }

    #[tokio::test]
    async fn open_loads_contents_and_picks_editor() {
        let view = FileEditorView::open(store(), "/src/main.py").await;
        assert_eq!(view.status(), &EditorStatus::Ready);
        assert_eq!(view.editor().value(), "print('hi')\n");

        let vm = view.view_model();
        assert_eq!(vm.kind, EditorKind::Code(LanguageMode::Python));
        assert_eq!(vm.toolbar.filename, "main.py");
        assert_eq!(vm.toolbar.title, "/src/main.py");
        assert!(vm.toolbar.save_enabled && vm.toolbar.reload_enabled);
    }

    #[tokio::test]
    async fn markdown_preview_in_view_model() {
        let mut view = FileEditorView::open(store(), "/docs/readme.md").await;
        assert_eq!(view.view_model().preview_html, None);
        if let EditorInstance::Markdown(markdown) = view.editor_mut() {
            markdown.toggle_preview();
        }
        let html = view.view_model().preview_html.unwrap();
        assert!(html.contains("<h1>Hello</h1>"));
    }

    #[tokio::test]
    async fn save_writes_buffer_and_confirms() {
        let store = store();
        let mut view = FileEditorView::open(store.clone(), "/src/main.py").await;
        view.editor_mut().set_value("print('bye')\n");

        view.save().await.unwrap().unwrap();
        assert_eq!(
            store.file_contents("/src/main.py").unwrap(),
            b"print('bye')\n".to_vec()
        );
        assert_eq!(view.take_notice(), Some(Notice::info(SAVED_MESSAGE)));
        assert!(!view.is_busy());
    }

    #[tokio::test]
    async fn failed_save_keeps_buffer_and_controls() {
        let store = store();
        let mut view = FileEditorView::open(store.clone(), "/src/main.py").await;
        view.editor_mut().set_value("draft");
        store.fail(StoreOperation::Write);

        assert!(view.save().await.unwrap().is_err());
        assert_eq!(view.editor().value(), "draft");
        assert_eq!(view.status(), &EditorStatus::Ready);
        assert!(view.view_model().toolbar.save_enabled);
        let notice = view.take_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, WRITE_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn reload_discards_unsaved_edits() {
        let mut view = FileEditorView::open(store(), "/src/main.py").await;
        view.editor_mut().set_value("unsaved work");

        view.reload().await.unwrap().unwrap();
        assert_eq!(view.editor().value(), "print('hi')\n");
    }

    #[tokio::test]
    async fn one_mutating_request_at_a_time() {
        let mut view = FileEditorView::open(store(), "/src/main.py").await;
        let request = view.begin_save().unwrap();
        assert!(view.begin_save().is_none());
        assert!(view.begin_reload().is_none());
        let toolbar = view.view_model().toolbar;
        assert!(toolbar.saving && !toolbar.save_enabled && !toolbar.reload_enabled);
        assert!(toolbar.close_enabled);

        view.finish_save(&request, Ok(()));
        let ticket = view.begin_reload().unwrap();
        assert!(view.begin_save().is_none());
        view.finish_reload(ticket, Ok(FileContents::Text("x".into())));
        assert!(view.begin_save().is_some());
    }

    #[tokio::test]
    async fn failed_load_disables_save_until_reload_succeeds() {
        let store = store();
        store.fail(StoreOperation::Read);
        let mut view = FileEditorView::open(store.clone(), "/src/main.py").await;

        assert!(matches!(view.status(), EditorStatus::Unavailable(_)));
        assert_eq!(view.take_notice().unwrap().message, READ_FAILED_MESSAGE);
        assert!(view.begin_save().is_none());
        assert!(view.view_model().toolbar.reload_enabled);

        store.recover(StoreOperation::Read);
        view.reload().await.unwrap().unwrap();
        assert_eq!(view.status(), &EditorStatus::Ready);
        assert!(view.save().await.unwrap().is_ok());
        assert_eq!(
            store.file_contents("/src/main.py").unwrap(),
            b"print('hi')\n".to_vec()
        );
    }

    #[test]
    fn nothing_runs_before_load_settles() {
        let mut view = FileEditorView::new(store(), "/src/main.py");
        assert!(view.begin_save().is_none());
        assert!(view.begin_reload().is_none());

        let ticket = view.begin_load().unwrap();
        assert!(view.finish_load(
            ticket,
            Err(StoreError::NotFound("/src/main.py".into()))
        ));
        assert!(view.begin_load().is_none());
    }

    #[tokio::test]
    async fn failed_reload_keeps_buffer() {
        let store = store();
        let mut view = FileEditorView::open(store.clone(), "/src/main.py").await;
        view.editor_mut().set_value("local");
        store.fail(StoreOperation::Read);

        assert!(view.reload().await.unwrap().is_err());
        assert_eq!(view.editor().value(), "local");
        assert_eq!(view.status(), &EditorStatus::Ready);
    }
}
