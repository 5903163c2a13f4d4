#![allow(dead_code)]

//! Shared fixtures: an in-memory store with a settable clock and injectable
//! failures, plus archive helpers.

use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::{
    error::Result as BridgeResult, ArchiveCodec, ArchiveEntries, BridgeError, DirEntryLike,
    HandleLike, StoreAccess,
};
use bytes::Bytes;
use core_fs::Opfs;
use core_runtime::config::FsConfig;

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File { data: Bytes, modified: i64 },
}

/// In-memory store keyed by absolute path.
///
/// Mutations under a path registered with [`MemoryStore::fail_under`] fail
/// with `OperationFailed`. Every call is recorded as `"<op> <path>"`.
#[derive(Default)]
pub struct MemoryStore {
    nodes: Mutex<BTreeMap<String, Node>>,
    clock: AtomicI64,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    read_delay: Mutex<Option<Duration>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        let store = Self::default();
        store.nodes.lock().unwrap().insert("/".to_string(), Node::Dir);
        store.clock.store(1_000, Ordering::SeqCst);
        Arc::new(store)
    }

    /// Set the modification time stamped on later writes.
    pub fn set_clock(&self, millis: i64) {
        self.clock.store(millis, Ordering::SeqCst);
    }

    pub fn fail_under(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    /// Seed a file at the current clock.
    pub fn seed(&self, path: &str, contents: &[u8]) {
        let mut nodes = self.nodes.lock().unwrap();
        Self::ensure_parents(&mut nodes, path);
        nodes.insert(
            path.to_string(),
            Node::File {
                data: Bytes::copy_from_slice(contents),
                modified: self.clock.load(Ordering::SeqCst),
            },
        );
    }

    pub fn contents(&self, path: &str) -> Option<Bytes> {
        match self.nodes.lock().unwrap().get(path) {
            Some(Node::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn is_dir(&self, path: &str) -> bool {
        matches!(self.nodes.lock().unwrap().get(path), Some(Node::Dir))
    }

    pub fn has(&self, path: &str) -> bool {
        self.nodes.lock().unwrap().contains_key(path)
    }

    /// All paths currently in the store, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.nodes.lock().unwrap().keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, op: &str) -> Vec<String> {
        let prefix = format!("{} ", op);
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    fn record(&self, op: &str, path: &str) {
        self.calls.lock().unwrap().push(format!("{} {}", op, path));
    }

    fn check_failure(&self, path: &str) -> BridgeResult<()> {
        let failing = self.failing.lock().unwrap();
        let hit = failing
            .iter()
            .any(|f| path == f || path.starts_with(&format!("{}/", f)));
        if hit {
            return Err(BridgeError::OperationFailed(format!("injected failure at {}", path)));
        }
        Ok(())
    }

    fn ensure_parents(nodes: &mut BTreeMap<String, Node>, path: &str) {
        let mut current = String::new();
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        for part in parts.iter().take(parts.len().saturating_sub(1)) {
            current.push('/');
            current.push_str(part);
            nodes.entry(current.clone()).or_insert(Node::Dir);
        }
    }

    fn name_of(path: &str) -> String {
        path.rsplit('/').next().unwrap_or_default().to_string()
    }

    fn handle_for(path: &str, node: &Node) -> HandleLike {
        match node {
            Node::Dir => HandleLike::directory(Self::name_of(path)),
            Node::File { data, modified } => HandleLike::file(
                Self::name_of(path),
                data.len() as u64,
                "application/octet-stream",
                *modified,
            ),
        }
    }
}

#[async_trait]
impl StoreAccess for MemoryStore {
    async fn create_file(&self, path: &str) -> BridgeResult<()> {
        self.record("create_file", path);
        self.check_failure(path)?;
        let mut nodes = self.nodes.lock().unwrap();
        Self::ensure_parents(&mut nodes, path);
        match nodes.get(path) {
            Some(Node::Dir) => Err(BridgeError::TypeMismatch(format!("{} is a directory", path))),
            Some(Node::File { .. }) => Ok(()),
            None => {
                let modified = self.clock.load(Ordering::SeqCst);
                nodes.insert(path.to_string(), Node::File { data: Bytes::new(), modified });
                Ok(())
            }
        }
    }

    async fn create_dir(&self, path: &str) -> BridgeResult<()> {
        self.record("create_dir", path);
        self.check_failure(path)?;
        let mut nodes = self.nodes.lock().unwrap();
        Self::ensure_parents(&mut nodes, path);
        match nodes.get(path) {
            Some(Node::File { .. }) => Err(BridgeError::TypeMismatch(format!("{} is a file", path))),
            _ => {
                nodes.insert(path.to_string(), Node::Dir);
                Ok(())
            }
        }
    }

    async fn read_file(&self, path: &str) -> BridgeResult<Bytes> {
        self.record("read_file", path);
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.nodes.lock().unwrap().get(path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Dir) => Err(BridgeError::TypeMismatch(format!("{} is a directory", path))),
            None => Err(BridgeError::NotFound(path.to_string())),
        }
    }

    async fn write_file(&self, path: &str, data: Bytes, append: bool) -> BridgeResult<()> {
        self.record("write_file", path);
        self.check_failure(path)?;
        let modified = self.clock.load(Ordering::SeqCst);
        let mut nodes = self.nodes.lock().unwrap();
        Self::ensure_parents(&mut nodes, path);
        let data = match (append, nodes.get(path)) {
            (_, Some(Node::Dir)) => {
                return Err(BridgeError::TypeMismatch(format!("{} is a directory", path)))
            }
            (true, Some(Node::File { data: existing, .. })) => {
                let mut joined = existing.to_vec();
                joined.extend_from_slice(&data);
                Bytes::from(joined)
            }
            _ => data,
        };
        nodes.insert(path.to_string(), Node::File { data, modified });
        Ok(())
    }

    async fn read_dir(&self, path: &str, recursive: bool) -> BridgeResult<Vec<DirEntryLike>> {
        self.record("read_dir", path);
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(path) {
            Some(Node::Dir) => {}
            Some(Node::File { .. }) => {
                return Err(BridgeError::TypeMismatch(format!("{} is a file", path)))
            }
            None => return Err(BridgeError::NotFound(path.to_string())),
        }

        let prefix = if path == "/" { "/".to_string() } else { format!("{}/", path) };
        Ok(nodes
            .iter()
            .filter_map(|(key, node)| {
                let relative = key.strip_prefix(&prefix)?;
                if relative.is_empty() || (!recursive && relative.contains('/')) {
                    return None;
                }
                Some(DirEntryLike {
                    path: relative.to_string(),
                    handle: Self::handle_for(key, node),
                })
            })
            .collect())
    }

    async fn remove(&self, path: &str) -> BridgeResult<()> {
        self.record("remove", path);
        self.check_failure(path)?;
        let mut nodes = self.nodes.lock().unwrap();
        let prefix = if path == "/" { "/".to_string() } else { format!("{}/", path) };
        nodes.retain(|key, _| key == "/" || (key != path && !key.starts_with(&prefix)));
        Ok(())
    }

    async fn stat(&self, path: &str) -> BridgeResult<HandleLike> {
        self.record("stat", path);
        match self.nodes.lock().unwrap().get(path) {
            Some(node) => Ok(Self::handle_for(path, node)),
            None => Err(BridgeError::NotFound(path.to_string())),
        }
    }
}

/// Codec that ignores its input and yields fixed entries.
pub struct StaticCodec(pub ArchiveEntries);

impl StaticCodec {
    pub fn new(entries: &[(&str, &[u8])]) -> Arc<Self> {
        Arc::new(Self(
            entries
                .iter()
                .map(|(path, data)| (path.to_string(), Bytes::copy_from_slice(data)))
                .collect(),
        ))
    }
}

#[async_trait]
impl ArchiveCodec for StaticCodec {
    async fn decode(&self, _data: Bytes) -> BridgeResult<ArchiveEntries> {
        Ok(self.0.clone())
    }
}

/// Build a zip archive in memory. Paths ending in `/` become directory entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    for (path, data) in entries {
        if path.ends_with('/') {
            writer.add_directory(*path, options).unwrap();
        } else {
            writer.start_file(*path, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

pub fn config(store: Arc<MemoryStore>, codec: Arc<dyn ArchiveCodec>) -> FsConfig {
    FsConfig::builder()
        .store(store)
        .codec(codec)
        .build()
        .unwrap()
}

pub fn memory_opfs(store: Arc<MemoryStore>) -> Opfs {
    Opfs::new(&config(store, Arc::new(bridge_desktop::ZipCodec::new())))
}
