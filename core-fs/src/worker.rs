//! # Context Host Adapter
//!
//! [`SyncFs`] owns one executor domain and the messenger session bound to
//! it. It exposes one blocking, typed call per supported operation.
//!
//! The executor domain is a dedicated OS thread running a current-thread
//! runtime. A second thread drains executor frames into the messenger so
//! that responses land while callers are blocked.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bridge_traits::{DirEntryLike, FetchOptions, HandleLike};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use core_async::runtime::{executor_runtime, in_async_context};
use core_async::sync::mpsc;
use core_runtime::config::FsConfig;
use tracing::{debug, error, info, warn};

use crate::assertions::{assert_absolute_path, assert_file_url};
use crate::error::{FsError, IoResult, VoidIoResult};
use crate::messenger::{Call, Executor, Payload, SyncMessenger};
use crate::opfs::Opfs;
use crate::types::{FileLike, TempOptions};
use crate::wait::OpTimeout;

const EXECUTOR_THREAD: &str = "sandbox-fs-executor";
const DRAIN_THREAD: &str = "sandbox-fs-drain";

/// Blocking file store session.
///
/// Every call blocks the calling thread for at most the op timeout. Do not
/// call from a thread that has to stay responsive.
///
/// ```ignore
/// let fs = SyncFs::spawn(&FsConfig::builder().build()?)?;
/// let path = fs.mk_temp(&TempOptions::file().with_extname(".txt"))?;
/// fs.write_file(&path, b"hello".to_vec())?;
/// ```
pub struct SyncFs {
    messenger: Arc<SyncMessenger>,
    executor: Mutex<Option<JoinHandle<()>>>,
    drain: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SyncFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncFs")
            .field("op_timeout", &self.op_timeout())
            .field("closed", &self.messenger.is_closed())
            .finish_non_exhaustive()
    }
}

impl SyncFs {
    /// Start an executor for `config` and wait for its ready handshake.
    pub fn spawn(config: &FsConfig) -> IoResult<Self> {
        Self::with_fs(Opfs::new(config), config.op_timeout, config.connect_timeout)
    }

    /// Start an executor serving `fs`.
    ///
    /// Fails with `TimeoutError` if the executor does not report ready
    /// within `connect_timeout`, or `SessionClosedError` if it dies first.
    pub fn with_fs(fs: Opfs, op_timeout: Duration, connect_timeout: Duration) -> IoResult<Self> {
        let (to_executor, inbound) = mpsc::unbounded_channel::<Vec<u8>>();
        let (outbound, mut from_executor) = mpsc::unbounded_channel::<Vec<u8>>();

        let messenger = Arc::new(SyncMessenger::new(to_executor, OpTimeout::new(op_timeout)));
        let session = SyncFs {
            messenger: Arc::clone(&messenger),
            executor: Mutex::new(None),
            drain: Mutex::new(None),
        };

        let executor = thread::Builder::new()
            .name(EXECUTOR_THREAD.to_string())
            .spawn(move || {
                let runtime = match executor_runtime(EXECUTOR_THREAD) {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!(error = %e, "Failed to build executor runtime");
                        return;
                    }
                };
                runtime.block_on(Executor::new(fs).serve(inbound, outbound));
            })
            .map_err(|e| FsError::Channel(format!("failed to start executor: {}", e)))?;
        *session.executor.lock().unwrap_or_else(PoisonError::into_inner) = Some(executor);

        let drain = thread::Builder::new()
            .name(DRAIN_THREAD.to_string())
            .spawn(move || {
                while let Some(frame) = from_executor.blocking_recv() {
                    messenger.deliver(&frame);
                }
                messenger.close("executor terminated");
            })
            .map_err(|e| FsError::Channel(format!("failed to start response handler: {}", e)))?;
        *session.drain.lock().unwrap_or_else(PoisonError::into_inner) = Some(drain);

        session.messenger.wait_ready(&OpTimeout::new(connect_timeout))?;
        info!(op_timeout_ms = op_timeout.as_millis() as u64, "File store session ready");
        Ok(session)
    }

    /// Set the deadline for this session's calls, including ones already
    /// waiting.
    pub fn set_op_timeout(&self, timeout: Duration) {
        self.messenger.op_timeout().set(timeout);
    }

    pub fn op_timeout(&self) -> Duration {
        self.messenger.op_timeout().get()
    }

    pub fn create_file(&self, path: &str) -> VoidIoResult {
        assert_absolute_path(path);
        self.call(Call::CreateFile { path: path.to_string() })?.into_unit()
    }

    pub fn mkdir(&self, path: &str) -> VoidIoResult {
        assert_absolute_path(path);
        self.call(Call::Mkdir { path: path.to_string() })?.into_unit()
    }

    pub fn read_dir(&self, path: &str, recursive: bool) -> IoResult<Vec<DirEntryLike>> {
        assert_absolute_path(path);
        self.call(Call::ReadDir {
            path: path.to_string(),
            recursive,
        })?
        .into_entries()
    }

    pub fn read_file(&self, path: &str) -> IoResult<Bytes> {
        assert_absolute_path(path);
        self.call(Call::ReadFile { path: path.to_string() })?.into_bytes()
    }

    pub fn read_blob_file(&self, path: &str) -> IoResult<FileLike> {
        assert_absolute_path(path);
        self.call(Call::ReadBlobFile { path: path.to_string() })?.into_file()
    }

    pub fn write_file(&self, path: &str, contents: impl Into<Vec<u8>>) -> VoidIoResult {
        self.write(path, contents.into(), false)
    }

    pub fn append_file(&self, path: &str, contents: impl Into<Vec<u8>>) -> VoidIoResult {
        self.write(path, contents.into(), true)
    }

    pub fn remove(&self, path: &str) -> VoidIoResult {
        assert_absolute_path(path);
        self.call(Call::Remove { path: path.to_string() })?.into_unit()
    }

    pub fn stat(&self, path: &str) -> IoResult<HandleLike> {
        assert_absolute_path(path);
        self.call(Call::Stat { path: path.to_string() })?.into_handle()
    }

    pub fn exists(&self, path: &str) -> IoResult<bool> {
        assert_absolute_path(path);
        self.call(Call::Exists { path: path.to_string() })?.into_bool()
    }

    pub fn mk_temp(&self, options: &TempOptions) -> IoResult<String> {
        self.call(Call::MkTemp {
            options: options.clone(),
        })?
        .into_path()
    }

    pub fn delete_temp(&self) -> VoidIoResult {
        self.call(Call::DeleteTemp)?.into_unit()
    }

    pub fn prune_temp(&self, expired: DateTime<Utc>) -> VoidIoResult {
        self.call(Call::PruneTemp {
            expired_before: expired.timestamp_millis(),
        })?
        .into_unit()
    }

    pub fn unzip(&self, zip_path: &str, target: &str) -> VoidIoResult {
        assert_absolute_path(zip_path);
        assert_absolute_path(target);
        self.call(Call::Unzip {
            zip_path: zip_path.to_string(),
            target: target.to_string(),
        })?
        .into_unit()
    }

    pub fn unzip_from_url(&self, url: &str, target: &str, options: &FetchOptions) -> VoidIoResult {
        assert_file_url(url);
        assert_absolute_path(target);
        self.call(Call::UnzipFromUrl {
            url: url.to_string(),
            target: target.to_string(),
            options: options.clone(),
        })?
        .into_unit()
    }

    /// Tear the session down. In-flight and later calls fail with
    /// `SessionClosedError`. Idempotent; also runs on drop.
    pub fn terminate(&self) {
        self.messenger.close("session terminated");

        let mut joined = 0usize;
        for (name, slot) in [(EXECUTOR_THREAD, &self.executor), (DRAIN_THREAD, &self.drain)] {
            let handle = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    warn!(thread = name, "Session thread panicked");
                }
                joined += 1;
            }
        }
        if joined > 0 {
            info!("File store session terminated");
        }
    }

    fn write(&self, path: &str, contents: Vec<u8>, append: bool) -> VoidIoResult {
        assert_absolute_path(path);
        self.call(Call::WriteFile {
            path: path.to_string(),
            contents,
            append,
        })?
        .into_unit()
    }

    fn call(&self, call: Call) -> IoResult<Payload> {
        if in_async_context() {
            debug!(op = call.op(), "Blocking file store call issued from an async context");
        }
        self.messenger.call(call)
    }
}

impl Drop for SyncFs {
    fn drop(&mut self) {
        self.terminate();
    }
}
