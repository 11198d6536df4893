use davpad_core::store::ReadMode;
use davpad_core::views::{Editor, EditorInstance, EditorKind, EditorStatus};
use dioxus::prelude::*;
use std::sync::Arc;

use crate::app::{dispatch, show_notices, AppHandle};

fn reload(mut app: AppHandle) {
    let request = app.write().editor_mut().and_then(|editor| {
        let ticket = editor.begin_reload()?;
        Some((ticket, editor.path().to_string(), Arc::clone(editor.store())))
    });
    let Some((ticket, path, store)) = request else {
        return;
    };

    spawn(async move {
        let result = store.read_file(&path, ReadMode::Text).await;
        // The editor may have been closed or replaced meanwhile
        if let Some(editor) = app.write().editor_mut().filter(|e| e.path() == path) {
            editor.finish_reload(ticket, result);
        }
        show_notices(app);
    });
}

fn save(mut app: AppHandle) {
    let request = app.write().editor_mut().and_then(|editor| {
        let save = editor.begin_save()?;
        Some((save, Arc::clone(editor.store())))
    });
    let Some((request, store)) = request else {
        return;
    };

    spawn(async move {
        let result = store
            .write_file(&request.path, request.contents.as_bytes())
            .await;
        if let Some(editor) = app.write().editor_mut().filter(|e| e.path() == request.path) {
            editor.finish_save(&request, result);
        }
        show_notices(app);
    });
}

fn close(app: AppHandle) {
    let event = app.read().editor().map(|editor| editor.close());
    if let Some(event) = event {
        dispatch(app, event.into());
    }
}

#[component]
pub fn EditorScreen() -> Element {
    let mut app = use_context::<AppHandle>();
    let Some(vm) = app.read().editor().map(|editor| editor.view_model()) else {
        return rsx! {};
    };
    let toolbar = vm.toolbar.clone();

    let on_input = move |e: FormEvent| {
        if let Some(editor) = app.write().editor_mut() {
            editor.editor_mut().set_value(&e.value());
        }
    };

    let surface = match vm.status {
        EditorStatus::Loading => rsx! {
            p { class: "loading", "Loading…" }
        },
        EditorStatus::Unavailable(message) => rsx! {
            div { class: "editor-unavailable",
                "This file could not be loaded: {message}"
            }
        },
        EditorStatus::Ready => match vm.kind {
            EditorKind::Code(mode) => rsx! {
                textarea {
                    class: "code-editor",
                    "data-language": mode.as_str(),
                    spellcheck: false,
                    wrap: "soft",
                    value: "{vm.value}",
                    oninput: on_input,
                }
            },
            EditorKind::Markdown => rsx! {
                div { class: "markdown-editor",
                    button {
                        class: "preview-toggle",
                        onclick: move |_| {
                            if let Some(editor) = app.write().editor_mut() {
                                if let EditorInstance::Markdown(markdown) = editor.editor_mut() {
                                    markdown.toggle_preview();
                                }
                            }
                        },
                        if vm.preview_html.is_some() { "Edit" } else { "Preview" }
                    }
                    if let Some(html) = vm.preview_html.clone() {
                        div { class: "markdown-preview", dangerous_inner_html: "{html}" }
                    } else {
                        textarea {
                            class: "markdown-source",
                            spellcheck: false,
                            value: "{vm.value}",
                            oninput: on_input,
                        }
                    }
                }
            },
        },
    };

    rsx! {
        div { class: "file-editor",
            div { class: "toolbar",
                button {
                    class: "close",
                    disabled: !toolbar.close_enabled,
                    onclick: move |_| close(app),
                    "Close"
                }
                button {
                    class: "reload",
                    disabled: !toolbar.reload_enabled,
                    onclick: move |_| reload(app),
                    if toolbar.reloading { "Reloading…" } else { "Reload" }
                }
                button {
                    class: "save",
                    disabled: !toolbar.save_enabled,
                    onclick: move |_| save(app),
                    if toolbar.saving { "Saving…" } else { "Save" }
                }
                span { class: "filename", title: "{toolbar.title}", "{toolbar.filename}" }
            }
            div { class: "editor-surface", {surface} }
        }
    }
}
