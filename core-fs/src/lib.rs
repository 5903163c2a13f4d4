//! # Sandboxed File Store Core
//!
//! Result-typed operations over a sandboxed, origin-scoped file store.
//!
//! ## Overview
//!
//! - [`Opfs`]: async facade for callers that can await. Temp lifecycle
//!   ([`Opfs::mk_temp`], [`Opfs::delete_temp`], [`Opfs::prune_temp`]) and
//!   archive expansion ([`Opfs::unzip`], [`Opfs::unzip_from_url`]) live here.
//! - [`SyncFs`]: blocking session for callers that cannot await. Each call is
//!   bridged to an executor domain through the [`messenger`] and bounded by
//!   the session's op timeout.
//! - [`wait`]: the blocking-wait primitives the bridge is built on.
//!
//! Every operation returns [`IoResult`]. Only malformed input (a relative
//! path, an invalid URL) panics.
//!
//! ## Usage
//!
//! ```ignore
//! use core_fs::{SyncFs, TempOptions};
//! use core_runtime::config::FsConfig;
//!
//! let config = FsConfig::builder().build()?;
//! let fs = SyncFs::spawn(&config)?;
//!
//! let dir = fs.mk_temp(&TempOptions::directory())?;
//! fs.unzip("/downloads/assets.zip", &dir)?;
//! fs.prune_temp(chrono::Utc::now() - chrono::Duration::days(1))?;
//! ```

pub mod assertions;
pub mod error;
pub mod messenger;
pub mod opfs;
pub mod paths;
pub mod tmp;
pub mod types;
pub mod unzip;
pub mod wait;
pub mod worker;

pub use assertions::{assert_absolute_path, assert_file_url, ROOT_DIR};
pub use error::{first_failure, ErrorLike, FsError, IoResult, VoidIoResult};
pub use opfs::Opfs;
pub use paths::{generate_temp_path, is_temp_path};
pub use types::{DirEntryLike, FetchOptions, FileLike, HandleKind, RedirectPolicy, TempOptions};
pub use wait::{sleep_until, wait_for, OpTimeout, Signal, DEFAULT_OP_TIMEOUT};
pub use worker::SyncFs;
