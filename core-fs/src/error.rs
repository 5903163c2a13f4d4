//! # File Store Error Types
//!
//! Every public operation returns [`IoResult`] instead of panicking or
//! propagating collaborator errors. [`ErrorLike`] is the only error shape
//! allowed across an execution-context boundary.

use bridge_traits::BridgeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of a missing-target failure.
pub const NOT_FOUND_ERROR: &str = "NotFoundError";
/// Name of a bridged call that exceeded the op timeout.
pub const TIMEOUT_ERROR: &str = "TimeoutError";
/// Name reserved for caller-initiated aborts.
pub const ABORT_ERROR: &str = "AbortError";
/// Name of an archive decode failure.
pub const CODEC_ERROR: &str = "CodecError";
/// Name of a network retrieval failure.
pub const RETRIEVAL_ERROR: &str = "RetrievalError";
/// Name of a call against a terminated session.
pub const SESSION_CLOSED_ERROR: &str = "SessionClosedError";
/// Name of a message channel failure.
pub const CHANNEL_ERROR: &str = "ChannelError";

/// Errors surfaced by the file store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// Target path absent.
    #[error("NotFoundError: {0}")]
    NotFound(String),

    /// A bridged call exceeded the op timeout.
    #[error("TimeoutError: {0}")]
    Timeout(String),

    /// Reserved; nothing in the core raises it.
    #[error("AbortError: {0}")]
    Aborted(String),

    /// Any other native store failure, with the native name preserved.
    #[error("{name}: {message}")]
    NativeStore { name: String, message: String },

    /// Archive decode failure.
    #[error("CodecError: {0}")]
    Codec(String),

    /// Network retrieval failure.
    #[error("RetrievalError: {0}")]
    Retrieval(String),

    /// The session was torn down before the call could complete.
    #[error("SessionClosedError: {0}")]
    SessionClosed(String),

    /// The message channel failed for this request.
    #[error("ChannelError: {0}")]
    Channel(String),
}

impl FsError {
    /// The error emitted when a blocking wait passes its deadline.
    pub fn timeout() -> Self {
        FsError::Timeout("Operating Timeout".to_string())
    }

    /// Classification string.
    pub fn name(&self) -> &str {
        match self {
            FsError::NotFound(_) => NOT_FOUND_ERROR,
            FsError::Timeout(_) => TIMEOUT_ERROR,
            FsError::Aborted(_) => ABORT_ERROR,
            FsError::NativeStore { name, .. } => name,
            FsError::Codec(_) => CODEC_ERROR,
            FsError::Retrieval(_) => RETRIEVAL_ERROR,
            FsError::SessionClosed(_) => SESSION_CLOSED_ERROR,
            FsError::Channel(_) => CHANNEL_ERROR,
        }
    }

    /// Human-readable message, without the name prefix.
    pub fn message(&self) -> &str {
        match self {
            FsError::NotFound(m)
            | FsError::Timeout(m)
            | FsError::Aborted(m)
            | FsError::Codec(m)
            | FsError::Retrieval(m)
            | FsError::SessionClosed(m)
            | FsError::Channel(m) => m,
            FsError::NativeStore { message, .. } => message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FsError::Timeout(_))
    }
}

/// Serializable projection of an error: name and message only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLike {
    pub name: String,
    pub message: String,
}

impl ErrorLike {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl From<&FsError> for ErrorLike {
    fn from(error: &FsError) -> Self {
        ErrorLike::new(error.name(), error.message())
    }
}

impl From<FsError> for ErrorLike {
    fn from(error: FsError) -> Self {
        ErrorLike::from(&error)
    }
}

impl From<ErrorLike> for FsError {
    fn from(error: ErrorLike) -> Self {
        let ErrorLike { name, message } = error;
        match name.as_str() {
            NOT_FOUND_ERROR => FsError::NotFound(message),
            TIMEOUT_ERROR => FsError::Timeout(message),
            ABORT_ERROR => FsError::Aborted(message),
            CODEC_ERROR => FsError::Codec(message),
            RETRIEVAL_ERROR => FsError::Retrieval(message),
            SESSION_CLOSED_ERROR => FsError::SessionClosed(message),
            CHANNEL_ERROR => FsError::Channel(message),
            _ => FsError::NativeStore { name, message },
        }
    }
}

impl From<BridgeError> for FsError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::NotFound(path) => FsError::NotFound(format!("{} is not found", path)),
            BridgeError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                FsError::NotFound(e.to_string())
            }
            BridgeError::Io(e) => FsError::NativeStore {
                name: format!("{:?}", e.kind()),
                message: e.to_string(),
            },
            BridgeError::Codec(m) => FsError::Codec(m),
            BridgeError::Http(m) => FsError::Retrieval(m),
            BridgeError::NotAvailable(m) => FsError::NativeStore {
                name: "NotSupportedError".to_string(),
                message: m,
            },
            BridgeError::TypeMismatch(m) => FsError::NativeStore {
                name: "TypeMismatchError".to_string(),
                message: m,
            },
            BridgeError::OperationFailed(m) => FsError::NativeStore {
                name: "OperationError".to_string(),
                message: m,
            },
        }
    }
}

/// Result type for file store operations.
pub type IoResult<T> = std::result::Result<T, FsError>;

/// Result of an operation without a payload; `Ok(())` is the void success.
pub type VoidIoResult = IoResult<()>;

/// Collapse many void results into one.
///
/// Returns the first `Err` in iteration order, or `Ok(())` if there is none.
/// Successful siblings are not undone.
pub fn first_failure<I>(results: I) -> VoidIoResult
where
    I: IntoIterator<Item = VoidIoResult>,
{
    results.into_iter().find_map(Result::err).map_or(Ok(()), Err)
}
