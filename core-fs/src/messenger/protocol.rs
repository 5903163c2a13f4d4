//! Wire format between the requester and the executor.
//!
//! Frames are `serde_json` documents. Only serializable projections cross:
//! errors travel as [`ErrorLike`], files as [`FileLike`], handles as
//! [`HandleLike`].

use bridge_traits::{DirEntryLike, FetchOptions, HandleLike};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{ErrorLike, FsError, IoResult};
use crate::types::{FileLike, TempOptions};

/// Identifier pairing a request with its response.
pub type RequestId = u64;

/// Operation code plus arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Call {
    CreateFile { path: String },
    Mkdir { path: String },
    ReadDir { path: String, recursive: bool },
    ReadFile { path: String },
    ReadBlobFile { path: String },
    WriteFile { path: String, contents: Vec<u8>, append: bool },
    Remove { path: String },
    Stat { path: String },
    Exists { path: String },
    MkTemp { options: TempOptions },
    DeleteTemp,
    /// Milliseconds since UNIX_EPOCH.
    PruneTemp { expired_before: i64 },
    Unzip { zip_path: String, target: String },
    UnzipFromUrl { url: String, target: String, options: FetchOptions },
}

impl Call {
    /// Short name used in log fields.
    pub fn op(&self) -> &'static str {
        match self {
            Call::CreateFile { .. } => "createFile",
            Call::Mkdir { .. } => "mkdir",
            Call::ReadDir { .. } => "readDir",
            Call::ReadFile { .. } => "readFile",
            Call::ReadBlobFile { .. } => "readBlobFile",
            Call::WriteFile { .. } => "writeFile",
            Call::Remove { .. } => "remove",
            Call::Stat { .. } => "stat",
            Call::Exists { .. } => "exists",
            Call::MkTemp { .. } => "mkTemp",
            Call::DeleteTemp => "deleteTemp",
            Call::PruneTemp { .. } => "pruneTemp",
            Call::Unzip { .. } => "unzip",
            Call::UnzipFromUrl { .. } => "unzipFromUrl",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub call: Call,
}

/// Success payload of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Payload {
    Unit,
    Path(String),
    Bytes(Vec<u8>),
    File(FileLike),
    Entries(Vec<DirEntryLike>),
    Handle(HandleLike),
    Bool(bool),
}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Payload::Unit => "unit",
            Payload::Path(_) => "path",
            Payload::Bytes(_) => "bytes",
            Payload::File(_) => "file",
            Payload::Entries(_) => "entries",
            Payload::Handle(_) => "handle",
            Payload::Bool(_) => "bool",
        }
    }

    fn mismatch(self, expected: &str) -> FsError {
        FsError::Channel(format!(
            "expected {} payload but received {}",
            expected,
            self.kind()
        ))
    }

    pub fn into_unit(self) -> IoResult<()> {
        match self {
            Payload::Unit => Ok(()),
            other => Err(other.mismatch("unit")),
        }
    }

    pub fn into_path(self) -> IoResult<String> {
        match self {
            Payload::Path(path) => Ok(path),
            other => Err(other.mismatch("path")),
        }
    }

    pub fn into_bytes(self) -> IoResult<Bytes> {
        match self {
            Payload::Bytes(data) => Ok(Bytes::from(data)),
            other => Err(other.mismatch("bytes")),
        }
    }

    pub fn into_file(self) -> IoResult<FileLike> {
        match self {
            Payload::File(file) => Ok(file),
            other => Err(other.mismatch("file")),
        }
    }

    pub fn into_entries(self) -> IoResult<Vec<DirEntryLike>> {
        match self {
            Payload::Entries(entries) => Ok(entries),
            other => Err(other.mismatch("entries")),
        }
    }

    pub fn into_handle(self) -> IoResult<HandleLike> {
        match self {
            Payload::Handle(handle) => Ok(handle),
            other => Err(other.mismatch("handle")),
        }
    }

    pub fn into_bool(self) -> IoResult<bool> {
        match self {
            Payload::Bool(value) => Ok(value),
            other => Err(other.mismatch("bool")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub id: RequestId,
    pub result: Result<Payload, ErrorLike>,
}

/// Everything the executor sends back to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerMessage {
    /// Sent once, before the executor accepts requests.
    Ready,
    Response(Response),
}

pub fn encode<T: Serialize>(message: &T) -> IoResult<Vec<u8>> {
    serde_json::to_vec(message).map_err(|e| FsError::Channel(format!("encode failed: {}", e)))
}

pub fn decode<T: DeserializeOwned>(frame: &[u8]) -> IoResult<T> {
    serde_json::from_slice(frame).map_err(|e| FsError::Channel(format!("decode failed: {}", e)))
}
