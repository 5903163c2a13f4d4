//! Async facade over the native store.
//!
//! [`Opfs`] is what async callers in the main context use directly, and what
//! the executor domain runs bridged requests against. Every method asserts
//! its path arguments, calls the matching store primitive and converts
//! collaborator failures into [`FsError`] at this boundary.

use std::sync::Arc;

use bridge_traits::{ArchiveCodec, DirEntryLike, Fetcher, HandleLike, StoreAccess};
use bytes::Bytes;
use core_runtime::config::FsConfig;
use tracing::debug;

use crate::assertions::assert_absolute_path;
use crate::error::{FsError, IoResult, VoidIoResult};
use crate::paths::basename;
use crate::types::FileLike;

/// Result-typed file operations over the configured store.
#[derive(Clone)]
pub struct Opfs {
    pub(crate) store: Arc<dyn StoreAccess>,
    pub(crate) fetcher: Option<Arc<dyn Fetcher>>,
    pub(crate) codec: Option<Arc<dyn ArchiveCodec>>,
    pub(crate) tmp_dir: String,
}

impl std::fmt::Debug for Opfs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Opfs")
            .field("tmp_dir", &self.tmp_dir)
            .field("fetcher", &self.fetcher.is_some())
            .field("codec", &self.codec.is_some())
            .finish_non_exhaustive()
    }
}

impl Opfs {
    pub fn new(config: &FsConfig) -> Self {
        Self {
            store: Arc::clone(&config.store),
            fetcher: config.fetcher.clone(),
            codec: config.codec.clone(),
            tmp_dir: config.tmp_dir.clone(),
        }
    }

    /// Temp root inside the store.
    pub fn tmp_dir(&self) -> &str {
        &self.tmp_dir
    }

    /// Create an empty file (and its parents). An existing file is kept.
    pub async fn create_file(&self, path: &str) -> VoidIoResult {
        assert_absolute_path(path);
        self.store.create_file(path).await?;
        Ok(())
    }

    /// Create a directory and its parents.
    pub async fn mkdir(&self, path: &str) -> VoidIoResult {
        assert_absolute_path(path);
        self.store.create_dir(path).await?;
        Ok(())
    }

    pub async fn read_dir(&self, path: &str, recursive: bool) -> IoResult<Vec<DirEntryLike>> {
        assert_absolute_path(path);
        Ok(self.store.read_dir(path, recursive).await?)
    }

    pub async fn read_file(&self, path: &str) -> IoResult<Bytes> {
        assert_absolute_path(path);
        Ok(self.store.read_file(path).await?)
    }

    /// Read a file together with its metadata.
    pub async fn read_blob_file(&self, path: &str) -> IoResult<FileLike> {
        assert_absolute_path(path);
        let handle = self.stat(path).await?;
        if !handle.is_file() {
            return Err(FsError::NativeStore {
                name: "TypeMismatchError".to_string(),
                message: format!("{} is not a file", path),
            });
        }
        let data = self.store.read_file(path).await?;
        Ok(FileLike::from_parts(&handle, data))
    }

    /// Write a file, replacing existing contents.
    pub async fn write_file(&self, path: &str, contents: impl Into<Bytes>) -> VoidIoResult {
        assert_absolute_path(path);
        self.store.write_file(path, contents.into(), false).await?;
        Ok(())
    }

    pub async fn append_file(&self, path: &str, contents: impl Into<Bytes>) -> VoidIoResult {
        assert_absolute_path(path);
        self.store.write_file(path, contents.into(), true).await?;
        Ok(())
    }

    /// Remove a file or directory recursively; a missing path is not an error.
    pub async fn remove(&self, path: &str) -> VoidIoResult {
        assert_absolute_path(path);
        self.store.remove(path).await?;
        debug!(path = %path, "Removed");
        Ok(())
    }

    pub async fn stat(&self, path: &str) -> IoResult<HandleLike> {
        assert_absolute_path(path);
        let mut handle = self.store.stat(path).await?;
        if handle.name.is_empty() {
            handle.name = basename(path).to_string();
        }
        Ok(handle)
    }

    pub async fn exists(&self, path: &str) -> IoResult<bool> {
        assert_absolute_path(path);
        Ok(self.store.exists(path).await?)
    }
}
