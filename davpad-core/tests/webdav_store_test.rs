//! WebDavStore against an in-process fake WebDAV server

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use tokio::net::TcpListener;

use davpad_core::orchestrator::Screen;
use davpad_core::views::Editor;
use davpad_core::{
    AppConfig, Credentials, FileContents, Orchestrator, ReadMode, RemoteStore, StoreError,
    WebDavConnector, WebDavStore,
};
use shared_types::{join_path, parent_path, EditFile, LoginAttempt};

const MOUNT: &str = "/remote.php/dav";

#[derive(Clone)]
enum Node {
    Directory,
    File(Vec<u8>),
}

#[derive(Clone)]
struct FakeDav {
    nodes: Arc<Mutex<BTreeMap<String, Node>>>,
    authorization: String,
}

struct TestServer {
    addr: SocketAddr,
    dav: FakeDav,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    fn base_url(&self) -> String {
        format!("http://{}{MOUNT}", self.addr)
    }

    fn store(&self, password: &str) -> WebDavStore {
        WebDavStore::new(&self.base_url(), Credentials::new("ada", password))
            .expect("valid base url")
    }

    fn file(&self, path: &str) -> Option<Vec<u8>> {
        match self.dav.nodes.lock().unwrap().get(path) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }
}

async fn start_test_server() -> TestServer {
    let mut nodes = BTreeMap::new();
    nodes.insert("/".to_string(), Node::Directory);
    nodes.insert("/Meeting Notes".to_string(), Node::Directory);
    nodes.insert(
        "/Meeting Notes/2026-01-12.md".to_string(),
        Node::File(b"# Standup".to_vec()),
    );
    nodes.insert("/paper.tex".to_string(), Node::File(vec![b'x'; 1536]));
    nodes.insert("/photo.jpg".to_string(), Node::File(vec![0xff, 0xd8, 0x00, 0x10]));

    let credentials = base64::engine::general_purpose::STANDARD.encode("ada:pw");
    let dav = FakeDav {
        nodes: Arc::new(Mutex::new(nodes)),
        authorization: format!("Basic {credentials}"),
    };

    let app = Router::new().fallback(handle_dav).with_state(dav.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to get addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("Server failed");
    });

    TestServer { addr, dav, handle }
}

fn store_path(uri: &Uri) -> Option<String> {
    let rest = uri.path().strip_prefix(MOUNT)?;
    let decoded = percent_decode_str(rest).decode_utf8_lossy();
    let trimmed = decoded.trim_end_matches('/');
    Some(if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    })
}

fn href(path: &str, directory: bool) -> String {
    let mut href = MOUNT.to_string();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        href.push('/');
        href.push_str(&utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string());
    }
    if directory || href == MOUNT {
        href.push('/');
    }
    href
}

fn response_xml(path: &str, node: &Node) -> String {
    let props = match node {
        Node::Directory => "<d:resourcetype><d:collection/></d:resourcetype>".to_string(),
        Node::File(bytes) => format!(
            "<d:resourcetype/><d:getcontentlength>{}</d:getcontentlength>\
             <d:getlastmodified>Mon, 12 Jan 2026 10:00:00 GMT</d:getlastmodified>",
            bytes.len()
        ),
    };
    format!(
        "<d:response><d:href>{}</d:href><d:propstat><d:prop>{props}</d:prop>\
         <d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>",
        href(path, matches!(node, Node::Directory))
    )
}

async fn handle_dav(
    State(dav): State<FakeDav>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == dav.authorization);
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let Some(path) = store_path(&uri) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let mut nodes = dav.nodes.lock().unwrap();

    match method.as_str() {
        "PROPFIND" => {
            let Some(node) = nodes.get(&path) else {
                return StatusCode::NOT_FOUND.into_response();
            };
            let mut body = String::from(r#"<?xml version="1.0"?><d:multistatus xmlns:d="DAV:">"#);
            body.push_str(&response_xml(&path, node));

            let depth = headers
                .get("Depth")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("1");
            if depth == "1" && matches!(node, Node::Directory) {
                for (child, child_node) in nodes.iter() {
                    if child != &path && parent_path(child) == path {
                        body.push_str(&response_xml(child, child_node));
                    }
                }
            }
            body.push_str("</d:multistatus>");
            (
                StatusCode::MULTI_STATUS,
                [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
                body,
            )
                .into_response()
        }
        "GET" => match nodes.get(&path) {
            Some(Node::File(bytes)) => bytes.clone().into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        },
        "PUT" => {
            if !matches!(nodes.get(&parent_path(&path)), Some(Node::Directory)) {
                return StatusCode::CONFLICT.into_response();
            }
            let existed = nodes.insert(path, Node::File(body.to_vec())).is_some();
            if existed {
                StatusCode::NO_CONTENT.into_response()
            } else {
                StatusCode::CREATED.into_response()
            }
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

#[tokio::test]
async fn probe_checks_credentials() {
    let server = start_test_server().await;

    assert!(server.store("pw").probe().await.is_ok());
    assert_eq!(
        server.store("wrong").probe().await,
        Err(StoreError::Unauthorized)
    );
}

#[tokio::test]
async fn listing_paths_match_joined_basenames() {
    let server = start_test_server().await;
    let store = server.store("pw");

    for directory in ["/", "/Meeting Notes"] {
        let entries = store.list_directory(directory).await.unwrap();
        assert!(!entries.is_empty(), "{directory} should have entries");
        for entry in &entries {
            assert_eq!(join_path(directory, &entry.basename), entry.path);
            assert_ne!(entry.path, directory);
        }
    }

    let root = store.list_directory("/").await.unwrap();
    let notes = root.iter().find(|e| e.basename == "Meeting Notes").unwrap();
    assert!(notes.is_directory());
    let paper = root.iter().find(|e| e.basename == "paper.tex").unwrap();
    assert_eq!(paper.size, Some(1536));
    assert_eq!(
        paper.last_modified.as_deref(),
        Some("Mon, 12 Jan 2026 10:00:00 GMT")
    );
}

#[tokio::test]
async fn stat_reports_single_entry() {
    let server = start_test_server().await;
    let entry = server.store("pw").stat("/paper.tex").await.unwrap();
    assert_eq!(entry.path, "/paper.tex");
    assert!(entry.is_file());

    let missing = server.store("pw").stat("/nope.txt").await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn write_then_read_round_trip() {
    let server = start_test_server().await;
    let store = server.store("pw");

    store
        .write_file("/Meeting Notes/todo.txt", "buy milk\n".as_bytes())
        .await
        .unwrap();
    assert_eq!(
        server.file("/Meeting Notes/todo.txt").as_deref(),
        Some("buy milk\n".as_bytes())
    );

    let text = store
        .read_file("/Meeting Notes/todo.txt", ReadMode::Text)
        .await
        .unwrap();
    assert_eq!(text, FileContents::Text("buy milk\n".to_string()));

    let bytes = store.read_file("/photo.jpg", ReadMode::Binary).await.unwrap();
    assert_eq!(bytes, FileContents::Binary(vec![0xff, 0xd8, 0x00, 0x10]));
}

#[tokio::test]
async fn status_codes_map_to_errors() {
    let server = start_test_server().await;
    let store = server.store("pw");

    assert!(matches!(
        store.read_file("/missing.md", ReadMode::Text).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.write_file("/no/such/dir.txt", b"x").await,
        Err(StoreError::Conflict(_))
    ));
    assert!(matches!(
        store.read_file("/../etc/passwd", ReadMode::Text).await,
        Err(StoreError::InvalidPath(_))
    ));
}

#[tokio::test]
async fn orchestrator_runs_over_webdav() {
    let server = start_test_server().await;
    let config = AppConfig::new(server.base_url(), "Cloud");
    let mut app = Orchestrator::new(config, WebDavConnector::default());

    app.handle(
        LoginAttempt {
            username: "ada".to_string(),
            password: "pw".to_string(),
        }
        .into(),
    )
    .await;
    assert_eq!(app.screen(), Screen::FileList);
    assert_eq!(app.file_list().unwrap().entries().len(), 3);

    app.handle(
        EditFile {
            filename: "/Meeting Notes/2026-01-12.md".to_string(),
        }
        .into(),
    )
    .await;
    let editor = app.editor_mut().unwrap();
    assert_eq!(editor.editor().value(), "# Standup");
    editor.editor_mut().set_value("# Standup\n\n- shipped");
    editor.save().await.unwrap().unwrap();

    assert_eq!(
        server.file("/Meeting Notes/2026-01-12.md").as_deref(),
        Some("# Standup\n\n- shipped".as_bytes())
    );
}
