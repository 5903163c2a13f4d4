//! # Host Bridge Traits
//!
//! Collaborator contracts the sandboxed file store core calls into.
//!
//! ## Traits
//!
//! - [`StoreAccess`](storage::StoreAccess) - native store primitives (create, read, write, list, remove)
//! - [`Fetcher`](http::Fetcher) - raw byte retrieval from a URL
//! - [`ArchiveCodec`](codec::ArchiveCodec) - archive decompression into path/bytes entries
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|----------------------|
//! | Desktop  | `bridge-desktop`     |
//!
//! ## Error Handling
//!
//! All traits report failures as [`BridgeError`](error::BridgeError). The core
//! converts these into its own taxonomy at its boundary; implementations
//! should keep messages actionable and include the offending path or URL.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` because the same collaborator instance is
//! shared between the main context and the executor thread.

pub mod codec;
pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

pub use codec::{ArchiveCodec, ArchiveEntries};
pub use http::{FetchOptions, Fetcher, RedirectPolicy};
pub use storage::{DirEntryLike, HandleKind, HandleLike, StoreAccess};
