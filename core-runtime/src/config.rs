//! # File Store Configuration
//!
//! `FsConfig` carries every collaborator and setting the file store core
//! needs. It is built with [`FsConfigBuilder`], which validates required
//! capabilities up front so a misconfigured host fails at startup rather
//! than on the first file operation.
//!
//! ## Required Dependencies
//!
//! - `StoreAccess` - the sandboxed native store
//!
//! ## Optional Dependencies
//!
//! - `Fetcher` - needed only for network-sourced archive expansion
//! - `ArchiveCodec` - needed only for archive expansion
//!
//! With the `desktop-shims` feature, `TokioStore`, `ReqwestFetcher` and
//! `ZipCodec` are injected when not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::FsConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = FsConfig::builder()
//!     .store(Arc::new(MyStore::default()))
//!     .op_timeout(Duration::from_millis(2_000))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{ArchiveCodec, Fetcher, StoreAccess};
use std::sync::Arc;
use std::time::Duration;

/// Default temp root inside the store.
pub const DEFAULT_TMP_DIR: &str = "/tmp";

/// Default deadline of one blocking bridged operation.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default deadline for the executor ready handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Configuration for the file store core.
#[derive(Clone)]
pub struct FsConfig {
    /// Native store primitives
    pub store: Arc<dyn StoreAccess>,

    /// Retrieval collaborator for `unzip_from_url`
    pub fetcher: Option<Arc<dyn Fetcher>>,

    /// Archive codec for `unzip` and `unzip_from_url`
    pub codec: Option<Arc<dyn ArchiveCodec>>,

    /// Absolute store path under which temp artifacts live
    pub tmp_dir: String,

    /// Blocking-wait deadline for each bridged operation
    pub op_timeout: Duration,

    /// Deadline for the executor to report ready
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for FsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsConfig")
            .field("store", &"StoreAccess { ... }")
            .field("fetcher", &self.fetcher.as_ref().map(|_| "Fetcher { ... }"))
            .field("codec", &self.codec.as_ref().map(|_| "ArchiveCodec { ... }"))
            .field("tmp_dir", &self.tmp_dir)
            .field("op_timeout", &self.op_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl FsConfig {
    /// Create a new configuration builder
    pub fn builder() -> FsConfigBuilder {
        FsConfigBuilder::default()
    }
}

/// Builder for [`FsConfig`]
#[derive(Default)]
pub struct FsConfigBuilder {
    store: Option<Arc<dyn StoreAccess>>,
    fetcher: Option<Arc<dyn Fetcher>>,
    codec: Option<Arc<dyn ArchiveCodec>>,
    tmp_dir: Option<String>,
    op_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl FsConfigBuilder {
    /// Set the native store (required)
    pub fn store(mut self, store: Arc<dyn StoreAccess>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the retrieval collaborator
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set the archive codec
    pub fn codec(mut self, codec: Arc<dyn ArchiveCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Set the temp root (default `/tmp`)
    pub fn tmp_dir(mut self, dir: impl Into<String>) -> Self {
        self.tmp_dir = Some(dir.into());
        self
    }

    /// Set the per-operation blocking deadline (default 1000 ms)
    pub fn op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = Some(timeout);
        self
    }

    /// Set the ready handshake deadline (default 5000 ms)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when no store is provided and no
    ///   desktop default is available
    /// - [`Error::Config`] when the temp root is not an absolute, non-root
    ///   path or a timeout is zero
    pub fn build(self) -> Result<FsConfig> {
        #[cfg(feature = "desktop-shims")]
        let builder = self.apply_desktop_defaults();
        #[cfg(not(feature = "desktop-shims"))]
        let builder = self;

        let FsConfigBuilder {
            store,
            fetcher,
            codec,
            tmp_dir,
            op_timeout,
            connect_timeout,
        } = builder;

        let store = store.ok_or_else(|| Error::CapabilityMissing {
            capability: "StoreAccess".to_string(),
            message: "No store implementation provided. \
                      Desktop: enable the `desktop-shims` feature. \
                      Web: inject an origin-private file system adapter."
                .to_string(),
        })?;

        let tmp_dir = tmp_dir.unwrap_or_else(|| DEFAULT_TMP_DIR.to_string());
        let tmp_dir = tmp_dir.trim_end_matches('/').to_string();
        if !tmp_dir.starts_with('/') {
            return Err(Error::Config(format!(
                "Temp root must be an absolute path but received {:?}",
                tmp_dir
            )));
        }

        let op_timeout = op_timeout.unwrap_or(DEFAULT_OP_TIMEOUT);
        let connect_timeout = connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        if op_timeout.is_zero() || connect_timeout.is_zero() {
            return Err(Error::Config("Timeouts must be greater than zero".to_string()));
        }

        Ok(FsConfig {
            store,
            fetcher,
            codec,
            tmp_dir,
            op_timeout,
            connect_timeout,
        })
    }

    #[cfg(feature = "desktop-shims")]
    fn apply_desktop_defaults(mut self) -> Self {
        if self.store.is_none() {
            self.store = Some(Arc::new(bridge_desktop::TokioStore::new()));
        }
        if self.codec.is_none() {
            self.codec = Some(Arc::new(bridge_desktop::ZipCodec::new()));
        }
        if self.fetcher.is_none() {
            match bridge_desktop::ReqwestFetcher::new() {
                Ok(fetcher) => self.fetcher = Some(Arc::new(fetcher)),
                Err(e) => tracing::warn!(error = %e, "Desktop fetcher unavailable"),
            }
        }
        self
    }
}
