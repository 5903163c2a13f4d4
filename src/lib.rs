//! Facade crate for the sandboxed file store.
//!
//! Re-exports the core (`core-fs`) together with configuration and the
//! collaborator contracts so host applications can depend on a single crate.
//! With the `desktop-shims` feature (default) the tokio/reqwest/zip desktop
//! collaborators are re-exported as well.

pub use bridge_traits;
pub use core_fs::*;
pub use core_runtime::{
    config::{FsConfig, FsConfigBuilder},
    logging::{init_logging, LogFormat, LogLevel, LoggingConfig},
};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{ReqwestFetcher, TokioStore, ZipCodec};
