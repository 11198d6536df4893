//! In-memory remote store for tests and offline demos.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use shared_types::{join_path, normalize_path, parent_path, Entry};

use super::{
    ensure_absolute, Credentials, FileContents, ReadMode, RemoteStore, SharedStore,
    StoreConnector,
};
use crate::error::{StoreError, StoreResult};

/// Store operations that can be counted or made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Stat,
    List,
    Read,
    Write,
}

#[derive(Debug, Clone)]
enum Node {
    Directory,
    File { bytes: Vec<u8>, modified: String },
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: Mutex<BTreeMap<String, Node>>,
    failing: Mutex<HashSet<StoreOperation>>,
    calls: Mutex<HashMap<StoreOperation, usize>>,
    clock: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        lock(&store.nodes).insert("/".to_string(), Node::Directory);
        store
    }

    pub fn with_directory(self, path: &str) -> Self {
        self.insert_directory(path);
        self
    }

    pub fn with_file(self, path: &str, contents: impl AsRef<[u8]>) -> Self {
        self.insert_file(path, contents);
        self
    }

    /// Create `path` and any missing ancestors as directories.
    pub fn insert_directory(&self, path: &str) {
        let path = normalize_path(path);
        let mut nodes = lock(&self.nodes);
        let mut current = String::from("/");
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = join_path(&current, segment);
            nodes.entry(current.clone()).or_insert(Node::Directory);
        }
    }

    /// Write a file directly, creating missing ancestors.
    pub fn insert_file(&self, path: &str, contents: impl AsRef<[u8]>) {
        let path = normalize_path(path);
        self.insert_directory(&parent_path(&path));
        let modified = self.tick();
        lock(&self.nodes).insert(
            path,
            Node::File {
                bytes: contents.as_ref().to_vec(),
                modified,
            },
        );
    }

    pub fn file_contents(&self, path: &str) -> Option<Vec<u8>> {
        match lock(&self.nodes).get(&normalize_path(path)) {
            Some(Node::File { bytes, .. }) => Some(bytes.clone()),
            _ => None,
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        lock(&self.nodes).contains_key(&normalize_path(path))
    }

    /// Make every subsequent call of `operation` fail until [`Self::recover`].
    pub fn fail(&self, operation: StoreOperation) {
        lock(&self.failing).insert(operation);
    }

    pub fn recover(&self, operation: StoreOperation) {
        lock(&self.failing).remove(&operation);
    }

    pub fn calls(&self, operation: StoreOperation) -> usize {
        lock(&self.calls).get(&operation).copied().unwrap_or(0)
    }

    fn begin(&self, operation: StoreOperation) -> StoreResult<()> {
        *lock(&self.calls).entry(operation).or_insert(0) += 1;
        if lock(&self.failing).contains(&operation) {
            return Err(StoreError::Transport(format!(
                "simulated {operation:?} failure"
            )));
        }
        Ok(())
    }

    fn tick(&self) -> String {
        let n = self.clock.fetch_add(1, Ordering::Relaxed);
        format!(
            "Thu, 01 Jan 2026 {:02}:{:02}:{:02} GMT",
            (n / 3600) % 24,
            (n / 60) % 60,
            n % 60
        )
    }

    fn entry_for(path: &str, node: &Node) -> Entry {
        match node {
            Node::Directory => Entry::directory(path),
            Node::File { bytes, modified } => {
                Entry::file(path, bytes.len() as u64).with_last_modified(modified.clone())
            }
        }
    }
}

#[async_trait(?Send)]
impl RemoteStore for MemoryStore {
    async fn stat(&self, path: &str) -> StoreResult<Entry> {
        self.begin(StoreOperation::Stat)?;
        let path = ensure_absolute(path)?;
        let nodes = lock(&self.nodes);
        nodes
            .get(&path)
            .map(|node| Self::entry_for(&path, node))
            .ok_or(StoreError::NotFound(path))
    }

    async fn list_directory(&self, path: &str) -> StoreResult<Vec<Entry>> {
        self.begin(StoreOperation::List)?;
        let path = ensure_absolute(path)?;
        let nodes = lock(&self.nodes);
        match nodes.get(&path) {
            Some(Node::Directory) => {}
            Some(Node::File { .. }) => {
                return Err(StoreError::Conflict(format!("not a directory: {path}")))
            }
            None => return Err(StoreError::NotFound(path)),
        }

        Ok(nodes
            .iter()
            .filter(|(child, _)| child.as_str() != path && parent_path(child) == path)
            .map(|(child, node)| Self::entry_for(child, node))
            .collect())
    }

    async fn read_file(&self, path: &str, mode: ReadMode) -> StoreResult<FileContents> {
        self.begin(StoreOperation::Read)?;
        let path = ensure_absolute(path)?;
        let nodes = lock(&self.nodes);
        match nodes.get(&path) {
            Some(Node::File { bytes, .. }) => Ok(match mode {
                ReadMode::Text => FileContents::Text(String::from_utf8_lossy(bytes).into_owned()),
                ReadMode::Binary => FileContents::Binary(bytes.clone()),
            }),
            Some(Node::Directory) => Err(StoreError::Conflict(format!("not a file: {path}"))),
            None => Err(StoreError::NotFound(path)),
        }
    }

    async fn write_file(&self, path: &str, contents: &[u8]) -> StoreResult<()> {
        self.begin(StoreOperation::Write)?;
        let path = ensure_absolute(path)?;
        let modified = self.tick();
        let mut nodes = lock(&self.nodes);
        if !matches!(nodes.get(&parent_path(&path)), Some(Node::Directory)) {
            return Err(StoreError::Conflict(format!("missing parent for {path}")));
        }
        if matches!(nodes.get(&path), Some(Node::Directory)) {
            return Err(StoreError::Conflict(format!("is a directory: {path}")));
        }
        nodes.insert(
            path,
            Node::File {
                bytes: contents.to_vec(),
                modified,
            },
        );
        Ok(())
    }
}

/// Hands out [`MemoryStore`] sessions that only work with the expected credentials.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    expected: Credentials,
}

impl MemoryConnector {
    pub fn new(store: Arc<MemoryStore>, expected: Credentials) -> Self {
        Self { store, expected }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }
}

impl StoreConnector for MemoryConnector {
    fn connect(&self, _base_url: &str, credentials: Credentials) -> StoreResult<SharedStore> {
        Ok(Arc::new(MemorySession {
            store: Arc::clone(&self.store),
            authorized: credentials == self.expected,
        }))
    }
}

struct MemorySession {
    store: Arc<MemoryStore>,
    authorized: bool,
}

impl MemorySession {
    fn check(&self) -> StoreResult<()> {
        if self.authorized {
            Ok(())
        } else {
            Err(StoreError::Unauthorized)
        }
    }
}

#[async_trait(?Send)]
impl RemoteStore for MemorySession {
    async fn stat(&self, path: &str) -> StoreResult<Entry> {
        self.check()?;
        self.store.stat(path).await
    }

    async fn list_directory(&self, path: &str) -> StoreResult<Vec<Entry>> {
        self.check()?;
        self.store.list_directory(path).await
    }

    async fn read_file(&self, path: &str, mode: ReadMode) -> StoreResult<FileContents> {
        self.check()?;
        self.store.read_file(path, mode).await
    }

    async fn write_file(&self, path: &str, contents: &[u8]) -> StoreResult<()> {
        self.check()?;
        self.store.write_file(path, contents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_direct_children_only() {
        let store = MemoryStore::new()
            .with_file("/a/b/deep.txt", "x")
            .with_file("/a/top.md", "y")
            .with_file("/root.txt", "z");

        let root = store.list_directory("/").await.unwrap();
        let names: Vec<&str> = root.iter().map(|e| e.basename.as_str()).collect();
        assert_eq!(names, vec!["a", "root.txt"]);

        let a = store.list_directory("/a").await.unwrap();
        assert_eq!(a.len(), 2);
        assert!(a.iter().any(|e| e.is_directory() && e.path == "/a/b"));
    }

    #[tokio::test]
    async fn write_requires_parent() {
        let store = MemoryStore::new();
        let err = store.write_file("/missing/file.txt", b"x").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn injected_failures_are_counted() {
        let store = MemoryStore::new();
        store.fail(StoreOperation::List);
        assert!(store.list_directory("/").await.is_err());
        store.recover(StoreOperation::List);
        assert!(store.list_directory("/").await.is_ok());
        assert_eq!(store.calls(StoreOperation::List), 2);
    }

    #[tokio::test]
    async fn sessions_check_credentials() {
        let connector = MemoryConnector::new(
            Arc::new(MemoryStore::new()),
            Credentials::new("ada", "pw"),
        );
        let good = connector
            .connect("memory://", Credentials::new("ada", "pw"))
            .unwrap();
        assert!(good.probe().await.is_ok());

        let bad = connector
            .connect("memory://", Credentials::new("ada", "nope"))
            .unwrap();
        assert_eq!(bad.probe().await, Err(StoreError::Unauthorized));
    }
}
