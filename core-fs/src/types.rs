//! Serializable data shapes that cross the executor boundary.

use bridge_traits::HandleLike;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use bridge_traits::{DirEntryLike, FetchOptions, HandleKind, RedirectPolicy};

/// Serializable file: metadata plus the full byte payload.
///
/// Moves file content (never a live handle) across a context boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLike {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    /// Milliseconds since UNIX_EPOCH.
    pub last_modified: i64,
    pub data: Vec<u8>,
}

impl FileLike {
    /// Build from a file handle projection and its contents.
    ///
    /// `size` is taken from the payload, not the handle, so the two always agree.
    pub fn from_parts(handle: &HandleLike, data: Bytes) -> Self {
        Self {
            name: handle.name.clone(),
            mime_type: handle.mime_type.clone().unwrap_or_default(),
            size: data.len() as u64,
            last_modified: handle.last_modified.unwrap_or_default(),
            data: data.to_vec(),
        }
    }

    /// Split back into a handle projection and the payload.
    pub fn into_parts(self) -> (HandleLike, Bytes) {
        let handle = HandleLike::file(self.name, self.size, self.mime_type, self.last_modified);
        (handle, Bytes::from(self.data))
    }
}

/// Options for generated temp paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempOptions {
    pub is_directory: bool,
    /// Prefix before the random token; empty means no prefix and no dash.
    pub basename: String,
    /// Suffix for files (e.g. `.txt`); ignored for directories.
    pub extname: String,
}

impl Default for TempOptions {
    fn default() -> Self {
        Self {
            is_directory: false,
            basename: "tmp".to_string(),
            extname: String::new(),
        }
    }
}

impl TempOptions {
    pub fn file() -> Self {
        Self::default()
    }

    pub fn directory() -> Self {
        Self {
            is_directory: true,
            ..Self::default()
        }
    }

    pub fn with_basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = basename.into();
        self
    }

    pub fn with_extname(mut self, extname: impl Into<String>) -> Self {
        self.extname = extname.into();
        self
    }
}
