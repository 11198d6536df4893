use std::sync::Arc;

use davpad_core::store::ReadMode;
use davpad_core::views::{Activation, CreateFileState, EntryRow};
use dioxus::prelude::*;
use dioxus_logger::tracing;

use crate::app::{dispatch, show_notices, AppHandle};
use crate::interop::{download_blob, focus_element};

const NEW_FILE_INPUT_ID: &str = "new-file-name";

/// Re-list the current directory, optionally after changing to `path`.
fn load_directory(mut app: AppHandle, path: Option<String>) {
    let request = {
        let mut app = app.write();
        app.file_list_mut().map(|list| {
            if let Some(path) = &path {
                list.navigate(path);
            }
            let (ticket, directory) = list.begin_update();
            (ticket, directory, Arc::clone(list.store()))
        })
    };
    let Some((ticket, directory, store)) = request else {
        return;
    };

    spawn(async move {
        let result = store.list_directory(&directory).await;
        if let Some(list) = app.write().file_list_mut() {
            list.finish_update(ticket, result);
        }
    });
}

fn download(mut app: AppHandle, path: String) {
    let Some(store) = app.read().file_list().map(|list| Arc::clone(list.store())) else {
        return;
    };
    spawn(async move {
        let result = store.read_file(&path, ReadMode::Binary).await;
        let file = app
            .write()
            .file_list_mut()
            .and_then(|list| list.finish_download(&path, result));
        if let Some(file) = file {
            if let Err(e) = download_blob(&file.filename, &file.bytes) {
                tracing::error!("Failed to hand download to the browser: {:?}", e);
            }
        }
        show_notices(app);
    });
}

/// The single create button: open the name input, or submit the name.
fn press_create(mut app: AppHandle) {
    let request = app
        .write()
        .file_list_mut()
        .and_then(|list| list.press_create_action());
    let Some(request) = request else {
        return;
    };
    let Some(store) = app.read().session().map(|s| Arc::clone(&s.store)) else {
        return;
    };

    spawn(async move {
        let result = store.write_file(&request.path, b"").await;
        let refresh = app
            .write()
            .file_list_mut()
            .map(|list| list.finish_create(&request, result))
            .unwrap_or(false);
        show_notices(app);
        if refresh {
            load_directory(app, None);
        }
    });
}

fn activate(app: AppHandle, row: &EntryRow) {
    let Some(activation) = app.read().file_list().map(|list| list.activate(&row.entry)) else {
        return;
    };
    match activation {
        Activation::Navigate(path) => load_directory(app, Some(path)),
        Activation::Open(edit) => dispatch(app, edit.into()),
        Activation::Download(path) => download(app, path),
    }
}

#[component]
pub fn FileListScreen() -> Element {
    let mut app = use_context::<AppHandle>();
    let mut was_naming = use_signal(|| false);

    // Focus the name input when it opens
    use_effect(move || {
        let naming = app.read().file_list().is_some_and(|list| {
            matches!(list.create_state(), CreateFileState::Naming { .. })
        });
        if naming && !*was_naming.peek() {
            focus_element(NEW_FILE_INPUT_ID);
        }
        if naming != *was_naming.peek() {
            was_naming.set(naming);
        }
    });

    let Some(vm) = app.read().file_list().map(|list| list.view_model()) else {
        return rsx! {};
    };

    let create = vm.create.clone();
    let listing_error = vm.listing_error.clone();

    rsx! {
        div { class: "file-list",
            header { class: "file-list-header",
                nav { class: "breadcrumbs",
                    for (i, crumb) in vm.breadcrumbs.iter().cloned().enumerate() {
                        span { key: "{crumb.path}", class: "crumb-item",
                            if i > 0 {
                                span { class: "separator", "/" }
                            }
                            a {
                                class: if crumb.is_root { "crumb root" } else { "crumb" },
                                href: "#",
                                onclick: {
                                    let path = crumb.path.clone();
                                    move |evt: MouseEvent| {
                                        evt.prevent_default();
                                        load_directory(app, Some(path.clone()));
                                    }
                                },
                                "{crumb.label}"
                            }
                        }
                    }
                }
                button {
                    class: "logout",
                    onclick: move |_| app.write().logout(),
                    "Logout"
                }
            }

            if let Some(message) = listing_error {
                div { class: "listing-error",
                    "Could not load this directory: {message} "
                    button { onclick: move |_| load_directory(app, None), "Retry" }
                }
            }

            table { class: "entries",
                thead {
                    tr {
                        th { "" }
                        th { "Name" }
                        th { "Size" }
                        th { "Last modified" }
                    }
                }
                tbody {
                    for row in vm.rows.iter().cloned() {
                        tr { key: "{row.entry.path}", class: "entry {row.icon.marker()}",
                            td { class: "icon", "{row.icon.glyph()}" }
                            td {
                                a {
                                    href: "#",
                                    onclick: {
                                        let row = row.clone();
                                        move |evt: MouseEvent| {
                                            evt.prevent_default();
                                            activate(app, &row);
                                        }
                                    },
                                    "{row.entry.basename}"
                                }
                            }
                            td {
                                class: "size",
                                title: row.size_title.clone().unwrap_or_default(),
                                {row.size_label.clone().unwrap_or_default()}
                            }
                            td { class: "modified", "{row.last_modified}" }
                        }
                    }
                }
            }

            if vm.loading {
                p { class: "loading", "Loading…" }
            }

            div { class: "create-file",
                if create.input_visible {
                    input {
                        id: NEW_FILE_INPUT_ID,
                        r#type: "text",
                        placeholder: "new-file.txt",
                        value: "{create.input_value}",
                        disabled: !create.input_enabled,
                        oninput: move |e| {
                            if let Some(list) = app.write().file_list_mut() {
                                list.set_new_name(&e.value());
                            }
                        },
                        onkeydown: move |e| {
                            if e.key() == Key::Enter {
                                press_create(app);
                            } else if e.key() == Key::Escape {
                                if let Some(list) = app.write().file_list_mut() {
                                    list.cancel_create();
                                }
                            }
                        },
                    }
                }
                button {
                    class: "create-action",
                    disabled: !create.action_enabled,
                    onclick: move |_| press_create(app),
                    if create.in_progress {
                        span { class: "spinner" }
                    }
                    "{create.action_label}"
                }
                if let Some(message) = create.validation_message {
                    p { class: "validation", "{message}" }
                }
            }
        }
    }
}
