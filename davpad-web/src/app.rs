//! Root component and the glue between view events and store calls.
//!
//! The orchestrator lives in one signal. Store calls never run while the
//! signal is borrowed: every flow is `begin_*` under a short write, an
//! awaited store call, then `finish_*` under another short write.

use std::sync::Arc;

use davpad_core::orchestrator::Screen;
use davpad_core::store::ReadMode;
use davpad_core::views::{Notice, NoticeLevel};
use davpad_core::{AppConfig, ConfigError, Orchestrator, WebDavConnector};
use dioxus::prelude::*;
use dioxus_logger::tracing;
use shared_types::ViewEvent;

use crate::components::styles::APP_STYLES;
use crate::components::{EditorScreen, FileListScreen, LoginScreen};
use crate::interop::{alert, UnloadGuard};

const CONFIG_JSON: &str = include_str!("../config.json");

pub type AppHandle = Signal<Orchestrator<WebDavConnector>>;

/// Parse and validate the bundled `config.json`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_json(CONFIG_JSON)
}

#[component]
pub fn App() -> Element {
    match load_config() {
        Ok(config) => rsx! {
            Workspace { config }
        },
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            rsx! {
                style { {APP_STYLES} }
                div { class: "config-error", "Invalid configuration: {e}" }
            }
        }
    }
}

#[component]
fn Workspace(config: AppConfig) -> Element {
    let app: AppHandle =
        use_context_provider(|| Signal::new(Orchestrator::new(config, WebDavConnector::default())));
    let mut unload_guard = use_signal(|| None::<UnloadGuard>);

    // Warn before leaving the page for as long as a session exists
    use_effect(move || {
        let warning = app.read().unload_warning();
        let installed = unload_guard.peek().is_some();
        match warning {
            Some(message) if !installed => unload_guard.set(UnloadGuard::install(message)),
            None if installed => unload_guard.set(None),
            _ => {}
        }
    });

    let screen = app.read().screen();
    rsx! {
        style { {APP_STYLES} }
        div { id: "container",
            match screen {
                Screen::Login => rsx! { LoginScreen {} },
                Screen::FileList => rsx! { FileListScreen {} },
                Screen::Editor => rsx! {
                    FileListScreen {}
                    EditorScreen {}
                },
            }
        }
    }
}

/// Route a view event to the orchestrator and run the store calls it implies.
pub fn dispatch(mut app: AppHandle, event: ViewEvent) {
    match event {
        ViewEvent::Login(attempt) => {
            let Some(pending) = app.write().begin_login(attempt) else {
                return;
            };
            spawn(async move {
                let store = Arc::clone(pending.store());
                let probe = store.probe().await;
                if app.write().finish_login(pending, probe) {
                    refresh_list(app);
                }
            });
        }
        ViewEvent::EditFile(edit) => {
            if app.write().open_file(edit) {
                load_editor(app);
            }
        }
        ViewEvent::CloseFile(close) => {
            if app.write().close_file(close) {
                refresh_list(app);
            }
        }
    }
}

/// Run the orchestrator's pending list refresh, if any.
pub fn refresh_list(mut app: AppHandle) {
    let Some(refresh) = app.write().begin_list_refresh() else {
        return;
    };
    spawn(async move {
        let result = refresh.store.list_directory(&refresh.directory).await;
        app.write().finish_list_refresh(&refresh, result);
    });
}

fn load_editor(mut app: AppHandle) {
    let Some(load) = app.write().begin_editor_load() else {
        return;
    };
    spawn(async move {
        let result = load.store.read_file(&load.path, ReadMode::Text).await;
        app.write().finish_editor_load(&load, result);
        show_notices(app);
    });
}

/// Alert every pending notice from the mounted views.
pub fn show_notices(mut app: AppHandle) {
    let notices: Vec<Notice> = {
        let mut app = app.write();
        let from_list = app.file_list_mut().and_then(|list| list.take_notice());
        let from_editor = app.editor_mut().and_then(|editor| editor.take_notice());
        from_list.into_iter().chain(from_editor).collect()
    };

    for notice in notices {
        if notice.level == NoticeLevel::Error {
            tracing::warn!("{}", notice.message);
        }
        alert(&notice.message);
    }
}
