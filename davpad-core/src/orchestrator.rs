//! Top-level control flow: Login -> FileList <-> FileEditor.
//!
//! The orchestrator owns the session and the mounted views. Views talk to
//! it only through the typed [`ViewEvent`] messages; it never reaches into
//! view internals beyond their public transitions.

use std::sync::Arc;

use shared_types::{CloseFile, EditFile, LoginAttempt, ViewEvent};

use crate::config::AppConfig;
use crate::error::StoreResult;
use crate::store::{Credentials, FileContents, SharedStore, StoreConnector};
use crate::views::{FileEditorView, FileListView, LoginView, Sequencer, Ticket};

/// Blanket warning shown by the browser when leaving an authenticated session.
pub const UNLOAD_WARNING: &str = "Changes you made may not be saved.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    FileList,
    /// Editor mounted over the still-live file list
    Editor,
}

/// An authenticated store handle and the label of its root.
#[derive(Clone)]
pub struct Session {
    pub store: SharedStore,
    pub root_label: String,
}

/// A store handle waiting for its credential probe.
pub struct PendingLogin {
    store: SharedStore,
    username: String,
}

impl PendingLogin {
    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}

/// A listing refresh the caller should perform.
pub struct ListRefresh {
    pub ticket: Ticket,
    pub directory: String,
    pub store: SharedStore,
}

/// A file load the caller should perform for the mounted editor.
pub struct EditorLoad {
    /// Identifies the editor instance the load was started for
    pub mount: Ticket,
    pub ticket: Ticket,
    pub path: String,
    pub store: SharedStore,
}

enum Mounted {
    Login(LoginView),
    Workspace {
        session: Session,
        list: FileListView,
        editor: Option<FileEditorView>,
        refresh_pending: bool,
    },
}

pub struct Orchestrator<C: StoreConnector> {
    config: AppConfig,
    connector: C,
    mounted: Mounted,
    editor_mounts: Sequencer,
}

impl<C: StoreConnector> Orchestrator<C> {
    pub fn new(config: AppConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            mounted: Mounted::Login(LoginView::new()),
            editor_mounts: Sequencer::default(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        match &self.mounted {
            Mounted::Login(_) => Screen::Login,
            Mounted::Workspace { editor: None, .. } => Screen::FileList,
            Mounted::Workspace {
                editor: Some(_), ..
            } => Screen::Editor,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.mounted {
            Mounted::Workspace { session, .. } => Some(session),
            Mounted::Login(_) => None,
        }
    }

    pub fn login(&self) -> Option<&LoginView> {
        match &self.mounted {
            Mounted::Login(view) => Some(view),
            Mounted::Workspace { .. } => None,
        }
    }

    pub fn login_mut(&mut self) -> Option<&mut LoginView> {
        match &mut self.mounted {
            Mounted::Login(view) => Some(view),
            Mounted::Workspace { .. } => None,
        }
    }

    pub fn file_list(&self) -> Option<&FileListView> {
        match &self.mounted {
            Mounted::Workspace { list, .. } => Some(list),
            Mounted::Login(_) => None,
        }
    }

    pub fn file_list_mut(&mut self) -> Option<&mut FileListView> {
        match &mut self.mounted {
            Mounted::Workspace { list, .. } => Some(list),
            Mounted::Login(_) => None,
        }
    }

    pub fn editor(&self) -> Option<&FileEditorView> {
        match &self.mounted {
            Mounted::Workspace { editor, .. } => editor.as_ref(),
            Mounted::Login(_) => None,
        }
    }

    pub fn editor_mut(&mut self) -> Option<&mut FileEditorView> {
        match &mut self.mounted {
            Mounted::Workspace { editor, .. } => editor.as_mut(),
            Mounted::Login(_) => None,
        }
    }

    // ------------------------------------------------------------------
    // Login
    // ------------------------------------------------------------------

    /// Build a store handle for the attempt. Returns `None` when not on
    /// the login screen or when no handle could be built (the login view
    /// is then marked failed).
    pub fn begin_login(&mut self, attempt: LoginAttempt) -> Option<PendingLogin> {
        let Mounted::Login(login) = &mut self.mounted else {
            return None;
        };

        let username = attempt.username.clone();
        match self
            .connector
            .connect(&self.config.webdav_url, Credentials::from(attempt))
        {
            Ok(store) => Some(PendingLogin { store, username }),
            Err(error) => {
                tracing::warn!(error = %error, "Could not create remote store handle");
                login.login_failed();
                None
            }
        }
    }

    /// Settle the credential probe. On success the login view is torn
    /// down and a file list is mounted with its first refresh pending.
    pub fn finish_login(&mut self, pending: PendingLogin, probe: StoreResult<()>) -> bool {
        let Mounted::Login(login) = &mut self.mounted else {
            return false;
        };

        if let Err(error) = probe {
            tracing::warn!(username = %pending.username, error = %error, "Login failed");
            login.login_failed();
            return false;
        }

        tracing::info!(username = %pending.username, "Logged in");
        let session = Session {
            store: pending.store,
            root_label: self.config.root_label.clone(),
        };
        self.mounted = Mounted::Workspace {
            list: FileListView::new(Arc::clone(&session.store), session.root_label.clone()),
            session,
            editor: None,
            refresh_pending: true,
        };
        true
    }

    /// Drop the session and go back to an empty login form.
    pub fn logout(&mut self) {
        if matches!(self.mounted, Mounted::Workspace { .. }) {
            tracing::info!("Logged out");
        }
        self.editor_mounts.bump();
        self.mounted = Mounted::Login(LoginView::new());
    }

    // ------------------------------------------------------------------
    // Editor lifecycle
    // ------------------------------------------------------------------

    /// Mount an editor for the file over the list, replacing any editor
    /// already open.
    pub fn open_file(&mut self, event: EditFile) -> bool {
        let Mounted::Workspace {
            session, editor, ..
        } = &mut self.mounted
        else {
            return false;
        };

        tracing::info!(path = %event.filename, "Opening file");
        self.editor_mounts.issue();
        *editor = Some(FileEditorView::new(
            Arc::clone(&session.store),
            event.filename,
        ));
        true
    }

    /// Start the initial load of the mounted editor.
    pub fn begin_editor_load(&mut self) -> Option<EditorLoad> {
        let Mounted::Workspace {
            session,
            editor: Some(editor),
            ..
        } = &mut self.mounted
        else {
            return None;
        };

        let ticket = editor.begin_load()?;
        Some(EditorLoad {
            mount: self.editor_mounts.current(),
            ticket,
            path: editor.path().to_string(),
            store: Arc::clone(&session.store),
        })
    }

    /// Apply a load result; ignored if that editor was closed or replaced.
    pub fn finish_editor_load(&mut self, load: &EditorLoad, result: StoreResult<FileContents>) -> bool {
        if !self.editor_mounts.is_current(load.mount) {
            tracing::debug!(path = %load.path, "Dropping load for a closed editor");
            return false;
        }
        match self.editor_mut() {
            Some(editor) => editor.finish_load(load.ticket, result),
            None => false,
        }
    }

    /// Tear down the editor and mark the list for exactly one refresh.
    pub fn close_file(&mut self, _event: CloseFile) -> bool {
        let Mounted::Workspace {
            editor,
            refresh_pending,
            ..
        } = &mut self.mounted
        else {
            return false;
        };

        match editor.take() {
            Some(closed) => {
                tracing::info!(path = %closed.path(), "Closed file");
                self.editor_mounts.bump();
                *refresh_pending = true;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // List refresh
    // ------------------------------------------------------------------

    pub fn needs_list_refresh(&self) -> bool {
        matches!(
            self.mounted,
            Mounted::Workspace {
                refresh_pending: true,
                ..
            }
        )
    }

    /// Take the pending refresh, if any.
    pub fn begin_list_refresh(&mut self) -> Option<ListRefresh> {
        let Mounted::Workspace {
            session,
            list,
            refresh_pending,
            ..
        } = &mut self.mounted
        else {
            return None;
        };
        if !*refresh_pending {
            return None;
        }
        *refresh_pending = false;

        let (ticket, directory) = list.begin_update();
        Some(ListRefresh {
            ticket,
            directory,
            store: Arc::clone(&session.store),
        })
    }

    pub fn finish_list_refresh(
        &mut self,
        refresh: &ListRefresh,
        result: StoreResult<Vec<shared_types::Entry>>,
    ) -> bool {
        match self.file_list_mut() {
            Some(list) => list.finish_update(refresh.ticket, result),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Event loop
    // ------------------------------------------------------------------

    /// Run every follow-up store call an event implies.
    pub async fn handle(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Login(attempt) => {
                if let Some(pending) = self.begin_login(attempt) {
                    let store = Arc::clone(pending.store());
                    let probe = store.probe().await;
                    self.finish_login(pending, probe);
                }
            }
            ViewEvent::EditFile(event) => {
                if self.open_file(event) {
                    if let Some(load) = self.begin_editor_load() {
                        let result = load
                            .store
                            .read_file(&load.path, crate::store::ReadMode::Text)
                            .await;
                        self.finish_editor_load(&load, result);
                    }
                }
            }
            ViewEvent::CloseFile(event) => {
                self.close_file(event);
            }
        }
        self.refresh_list().await;
    }

    /// Perform the pending list refresh, if there is one.
    pub async fn refresh_list(&mut self) -> bool {
        let Some(refresh) = self.begin_list_refresh() else {
            return false;
        };
        let result = refresh.store.list_directory(&refresh.directory).await;
        self.finish_list_refresh(&refresh, result)
    }

    /// Text for the browser's leave-page prompt while a session is open.
    pub fn unload_warning(&self) -> Option<&'static str> {
        self.session().map(|_| UNLOAD_WARNING)
    }
}
