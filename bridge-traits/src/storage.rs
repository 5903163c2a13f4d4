//! Native Store Abstraction
//!
//! The primitive set of the sandboxed, origin-scoped store the core
//! orchestrates. Paths are POSIX-style and absolute within the store (`/` is
//! the store root); implementations decide where that root lives.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of a node in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    File,
    Directory,
}

/// Serializable projection of a live store handle.
///
/// Only file handles carry size, MIME type and modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleLike {
    pub name: String,
    pub kind: HandleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Milliseconds since UNIX_EPOCH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
}

impl HandleLike {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: HandleKind::Directory,
            size: None,
            mime_type: None,
            last_modified: None,
        }
    }

    pub fn file(
        name: impl Into<String>,
        size: u64,
        mime_type: impl Into<String>,
        last_modified: i64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: HandleKind::File,
            size: Some(size),
            mime_type: Some(mime_type.into()),
            last_modified: Some(last_modified),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == HandleKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == HandleKind::Directory
    }
}

/// One entry yielded by [`StoreAccess::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntryLike {
    /// Path relative to the listed directory, `/`-separated.
    pub path: String,
    pub handle: HandleLike,
}

/// Native store primitive set.
///
/// Implementations:
/// - Desktop: a host directory acting as the sandbox root
/// - Web: the origin private file system
///
/// Every method reports failure through [`BridgeError`](crate::BridgeError);
/// a missing target must be reported so that
/// [`BridgeError::is_not_found`](crate::BridgeError::is_not_found) holds.
#[async_trait]
pub trait StoreAccess: Send + Sync {
    /// Create an empty file, creating parent directories as needed.
    ///
    /// An existing file is left untouched.
    async fn create_file(&self, path: &str) -> Result<()>;

    /// Create a directory and all missing parents.
    async fn create_dir(&self, path: &str) -> Result<()>;

    /// Read the entire file.
    async fn read_file(&self, path: &str) -> Result<Bytes>;

    /// Write (or append) data to a file, creating it and its parents.
    async fn write_file(&self, path: &str, data: Bytes, append: bool) -> Result<()>;

    /// List a directory. With `recursive` every descendant is yielded, each
    /// directory before its children.
    async fn read_dir(&self, path: &str, recursive: bool) -> Result<Vec<DirEntryLike>>;

    /// Remove a file or a directory with all its contents.
    ///
    /// Removing a path that does not exist succeeds.
    async fn remove(&self, path: &str) -> Result<()>;

    /// Describe the node at `path`.
    async fn stat(&self, path: &str) -> Result<HandleLike>;

    /// Check whether a node exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
