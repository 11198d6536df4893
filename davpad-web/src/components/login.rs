use dioxus::prelude::*;

use crate::app::{dispatch, AppHandle};

#[component]
pub fn LoginScreen() -> Element {
    let mut app = use_context::<AppHandle>();
    let Some(vm) = app.read().login().map(|login| login.view_model()) else {
        return rsx! {};
    };

    let submit = move |evt: FormEvent| {
        evt.prevent_default();
        let attempt = app.write().login_mut().and_then(|login| login.submit());
        if let Some(attempt) = attempt {
            dispatch(app, attempt.into());
        }
    };

    rsx! {
        form { class: "login", onsubmit: submit,
            h1 { "Login" }
            input {
                r#type: "text",
                name: "username",
                placeholder: "Username",
                autocomplete: "username",
                value: "{vm.username}",
                oninput: move |e| {
                    if let Some(login) = app.write().login_mut() {
                        login.set_username(e.value());
                    }
                },
            }
            input {
                r#type: "password",
                name: "password",
                placeholder: "Password",
                autocomplete: "current-password",
                value: "{vm.password}",
                oninput: move |e| {
                    if let Some(login) = app.write().login_mut() {
                        login.set_password(e.value());
                    }
                },
            }
            button {
                r#type: "submit",
                disabled: !vm.submit_enabled,
                if vm.in_progress { "Logging in…" } else { "Login" }
            }
            if vm.failed {
                p { class: "login-failed", "Login failed" }
            }
        }
    }
}
