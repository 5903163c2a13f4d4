//! Store Implementation using Tokio
//!
//! A host directory plays the role of the sandbox root. Store paths are
//! absolute and `/`-separated; `..` components are clamped at the root so a
//! path can never leave the sandbox.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{DirEntryLike, HandleLike, StoreAccess},
};
use bytes::Bytes;
use core_async::time::system_time_millis;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Tokio-based sandboxed store.
pub struct TokioStore {
    root: PathBuf,
}

impl TokioStore {
    /// Create a store rooted at the platform data directory.
    pub fn new() -> Self {
        let root = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("sandbox-fs");

        Self { root }
    }

    /// Create a store rooted at a custom host directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Host directory backing the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store path onto the host file system.
    fn resolve(&self, path: &str) -> PathBuf {
        let mut parts: Vec<&str> = Vec::new();
        for part in path.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }

        let mut resolved = self.root.clone();
        resolved.extend(parts);
        resolved
    }

    fn map_io_error(path: &str, e: std::io::Error) -> BridgeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            BridgeError::NotFound(path.to_string())
        } else {
            BridgeError::Io(e)
        }
    }

    async fn ensure_parent(&self, target: &Path) -> Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn handle_for(name: String, metadata: &std::fs::Metadata) -> HandleLike {
        if metadata.is_dir() {
            return HandleLike::directory(name);
        }

        let modified = metadata
            .modified()
            .map(system_time_millis)
            .unwrap_or_default();
        let mime = mime_for(&name);
        HandleLike::file(name, metadata.len(), mime, modified)
    }
}

impl Default for TokioStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreAccess for TokioStore {
    async fn create_file(&self, path: &str) -> Result<()> {
        let target = self.resolve(path);
        self.ensure_parent(&target).await?;

        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&target)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = %path, "Created file");
        Ok(())
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path))
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = %path, "Created directory");
        Ok(())
    }

    async fn read_file(&self, path: &str) -> Result<Bytes> {
        let data = fs::read(self.resolve(path))
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = %path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &str, data: Bytes, append: bool) -> Result<()> {
        let target = self.resolve(path);
        self.ensure_parent(&target).await?;

        if append {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&target)
                .await
                .map_err(|e| Self::map_io_error(path, e))?;
            file.write_all(data.as_ref()).await?;
            file.flush().await?;
        } else {
            fs::write(&target, data.as_ref())
                .await
                .map_err(|e| Self::map_io_error(path, e))?;
        }

        debug!(path = %path, size = data.len(), append, "Wrote file");
        Ok(())
    }

    async fn read_dir(&self, path: &str, recursive: bool) -> Result<Vec<DirEntryLike>> {
        let base = self.resolve(path);
        let mut entries = Vec::new();
        // (host dir, relative prefix); popped from the back so each directory
        // is listed before its children are walked.
        let mut pending = vec![(base, String::new())];

        while let Some((dir, prefix)) = pending.pop() {
            let mut read_dir = fs::read_dir(&dir)
                .await
                .map_err(|e| Self::map_io_error(path, e))?;

            let mut level = Vec::new();
            while let Some(entry) = read_dir.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                let metadata = entry.metadata().await?;
                level.push((name, entry.path(), metadata));
            }
            level.sort_by(|a, b| a.0.cmp(&b.0));

            let mut subdirs = Vec::new();
            for (name, host_path, metadata) in level {
                let relative = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                };
                if recursive && metadata.is_dir() {
                    subdirs.push((host_path, relative.clone()));
                }
                entries.push(DirEntryLike {
                    path: relative,
                    handle: Self::handle_for(name, &metadata),
                });
            }
            pending.extend(subdirs.into_iter().rev());
        }

        debug!(path = %path, count = entries.len(), recursive, "Listed directory");
        Ok(entries)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let target = self.resolve(path);
        let metadata = match fs::metadata(&target).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        if target == self.root {
            // The root itself stays; only its contents go.
            let mut read_dir = fs::read_dir(&target).await?;
            while let Some(entry) = read_dir.next_entry().await? {
                if entry.file_type().await?.is_dir() {
                    fs::remove_dir_all(entry.path()).await?;
                } else {
                    fs::remove_file(entry.path()).await?;
                }
            }
        } else if metadata.is_dir() {
            fs::remove_dir_all(&target)
                .await
                .map_err(|e| Self::map_io_error(path, e))?;
        } else {
            fs::remove_file(&target)
                .await
                .map_err(|e| Self::map_io_error(path, e))?;
        }

        debug!(path = %path, "Removed");
        Ok(())
    }

    async fn stat(&self, path: &str) -> Result<HandleLike> {
        let target = self.resolve(path);
        let metadata = fs::metadata(&target)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        let name = target
            .file_name()
            .filter(|_| target != self.root)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::handle_for(name, &metadata))
    }
}

/// Best-effort MIME type from a file name's extension.
fn mime_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => "",
    }
}
