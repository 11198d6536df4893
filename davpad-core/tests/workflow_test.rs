//! Login -> list -> edit -> close, driven through the orchestrator

use std::sync::Arc;

use davpad_core::orchestrator::Screen;
use davpad_core::store::StoreOperation;
use davpad_core::views::{
    Activation, CreateFileState, Editor, EditorKind, EditorStatus, LanguageMode, NameValidity,
    NoticeLevel,
};
use davpad_core::{
    AppConfig, Credentials, MemoryConnector, MemoryStore, Orchestrator, RemoteStore,
};
use shared_types::{CloseFile, EditFile, LoginAttempt};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("davpad_core=debug")
        .with_test_writer()
        .try_init();
}

fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new()
            .with_file("/notes.txt", "first draft")
            .with_file("/a/b/c/REPORT.MD", "# Report")
            .with_file("/a/b/c/data.bin", vec![1u8, 2, 3])
            .with_directory("/empty"),
    )
}

async fn logged_in(store: &Arc<MemoryStore>) -> Orchestrator<MemoryConnector> {
    init_tracing();
    let connector = MemoryConnector::new(Arc::clone(store), Credentials::new("ada", "pw"));
    let mut app = Orchestrator::new(
        AppConfig::new("https://dav.example.com/webdav", "Storage"),
        connector,
    );
    let attempt = {
        let login = app.login_mut().unwrap();
        login.set_username("ada");
        login.set_password("pw");
        login.submit().unwrap()
    };
    app.handle(attempt.into()).await;
    assert_eq!(app.screen(), Screen::FileList);
    app
}

#[tokio::test]
async fn failed_login_then_success() {
    init_tracing();
    let store = seeded_store();
    let connector = MemoryConnector::new(Arc::clone(&store), Credentials::new("ada", "pw"));
    let mut app = Orchestrator::new(AppConfig::new("https://dav.example.com", "Storage"), connector);

    let attempt = {
        let login = app.login_mut().unwrap();
        login.set_username("ada");
        login.set_password("guess");
        login.submit().unwrap()
    };
    assert!(app.login_mut().unwrap().submit().is_none());
    app.handle(attempt.into()).await;
    assert_eq!(app.screen(), Screen::Login);
    assert!(app.login().unwrap().view_model().failed);
    assert_eq!(store.calls(StoreOperation::List), 0);

    app.handle(
        LoginAttempt {
            username: "ada".into(),
            password: "pw".into(),
        }
        .into(),
    )
    .await;
    assert_eq!(app.screen(), Screen::FileList);
}

#[tokio::test]
async fn breadcrumbs_follow_navigation() {
    let store = seeded_store();
    let mut app = logged_in(&store).await;
    let list = app.file_list_mut().unwrap();

    list.navigate_to("/a/b/c").await.unwrap();
    let crumbs = list.view_model().breadcrumbs;
    let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
    let targets: Vec<&str> = crumbs.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(labels, vec!["Storage", "a", "b", "c"]);
    assert_eq!(targets, vec!["/", "/a", "/a/b", "/a/b/c"]);

    list.navigate_to(&crumbs[1].path).await.unwrap();
    assert_eq!(list.directory(), "/a");
    assert_eq!(list.entries().len(), 1);
}

#[tokio::test]
async fn uppercase_markdown_is_editable() {
    let store = seeded_store();
    let mut app = logged_in(&store).await;
    let list = app.file_list_mut().unwrap();
    list.navigate_to("/a/b/c").await.unwrap();

    let report = list
        .entries()
        .iter()
        .find(|e| e.basename == "REPORT.MD")
        .cloned()
        .unwrap();
    let Activation::Open(edit) = list.activate(&report) else {
        panic!("REPORT.MD should open in the editor");
    };
    let data = list
        .entries()
        .iter()
        .find(|e| e.basename == "data.bin")
        .cloned()
        .unwrap();
    assert!(matches!(list.activate(&data), Activation::Download(_)));

    app.handle(edit.into()).await;
    let editor = app.editor().unwrap();
    assert_eq!(editor.view_model().kind, EditorKind::Markdown);
    assert_eq!(editor.editor().value(), "# Report");
}

#[tokio::test]
async fn create_file_validates_and_refreshes() {
    let store = seeded_store();
    let mut app = logged_in(&store).await;
    let lists_before = store.calls(StoreOperation::List);
    let list = app.file_list_mut().unwrap();

    list.begin_create();
    assert_eq!(list.set_new_name("notes txt"), Some(NameValidity::InvalidCharacters));
    assert!(!list.view_model().create.action_enabled);
    assert_eq!(list.set_new_name("notes.txt"), Some(NameValidity::Duplicate));
    assert!(!list.view_model().create.action_enabled);
    assert_eq!(list.set_new_name("todo.md"), Some(NameValidity::Valid));
    assert!(list.view_model().create.action_enabled);

    list.create_file().await.unwrap().unwrap();
    assert_eq!(list.create_state(), &CreateFileState::Idle);
    assert!(list.entries().iter().any(|e| e.path == "/todo.md"));
    assert_eq!(store.file_contents("/todo.md"), Some(Vec::new()));
    assert_eq!(store.calls(StoreOperation::List), lists_before + 1);
}

#[tokio::test]
async fn save_then_reload_round_trip() {
    let store = seeded_store();
    let mut app = logged_in(&store).await;
    app.handle(
        EditFile {
            filename: "/notes.txt".into(),
        }
        .into(),
    )
    .await;

    let editor = app.editor_mut().unwrap();
    assert_eq!(editor.status(), &EditorStatus::Ready);
    assert_eq!(
        editor.view_model().kind,
        EditorKind::Code(LanguageMode::PlainText)
    );

    editor.editor_mut().set_value("second draft");
    editor.save().await.unwrap().unwrap();
    assert_eq!(editor.take_notice().unwrap().level, NoticeLevel::Info);

    editor.editor_mut().set_value("scratch");
    editor.reload().await.unwrap().unwrap();
    assert_eq!(editor.editor().value(), "second draft");
    assert_eq!(store.file_contents("/notes.txt").unwrap(), b"second draft");
}

#[tokio::test]
async fn closing_editor_refreshes_list_exactly_once() {
    let store = seeded_store();
    let mut app = logged_in(&store).await;
    app.handle(
        EditFile {
            filename: "/notes.txt".into(),
        }
        .into(),
    )
    .await;
    assert_eq!(app.screen(), Screen::Editor);

    // The file changes behind the list's back while the editor is open.
    store.insert_file("/added-elsewhere.txt", "hi");
    let lists_before = store.calls(StoreOperation::List);

    let close = app.editor().unwrap().close();
    app.handle(close.into()).await;

    assert_eq!(app.screen(), Screen::FileList);
    assert!(app.editor().is_none());
    assert_eq!(store.calls(StoreOperation::List), lists_before + 1);
    assert!(app
        .file_list()
        .unwrap()
        .entries()
        .iter()
        .any(|e| e.basename == "added-elsewhere.txt"));

    app.handle(CloseFile {}.into()).await;
    assert_eq!(store.calls(StoreOperation::List), lists_before + 1);
}

#[tokio::test]
async fn close_discards_unsaved_edits() {
    let store = seeded_store();
    let mut app = logged_in(&store).await;
    app.handle(
        EditFile {
            filename: "/notes.txt".into(),
        }
        .into(),
    )
    .await;
    app.editor_mut()
        .unwrap()
        .editor_mut()
        .set_value("never saved");
    app.handle(CloseFile {}.into()).await;

    assert_eq!(store.file_contents("/notes.txt").unwrap(), b"first draft");
}

#[tokio::test]
async fn listing_failure_is_recoverable() {
    let store = seeded_store();
    let mut app = logged_in(&store).await;
    store.fail(StoreOperation::List);

    let list = app.file_list_mut().unwrap();
    assert!(list.navigate_to("/a").await.is_err());
    assert!(list.view_model().listing_error.is_some());

    store.recover(StoreOperation::List);
    list.update().await.unwrap();
    assert!(list.view_model().listing_error.is_none());
    assert_eq!(list.entries().len(), 1);
}

#[tokio::test]
async fn rapid_navigation_keeps_latest_listing() {
    let store = seeded_store();
    let mut app = logged_in(&store).await;
    let list = app.file_list_mut().unwrap();
    let shared = Arc::clone(list.store());

    list.navigate("/a");
    let (first, first_dir) = list.begin_update();
    list.navigate("/a/b/c");
    let (second, second_dir) = list.begin_update();

    let (first_result, second_result) = futures::future::join(
        shared.list_directory(&first_dir),
        shared.list_directory(&second_dir),
    )
    .await;

    assert!(list.finish_update(second, second_result));
    assert!(!list.finish_update(first, first_result));
    assert_eq!(list.directory(), "/a/b/c");
    assert_eq!(list.entries().len(), 2);
}
