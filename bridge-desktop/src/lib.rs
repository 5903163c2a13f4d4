//! # Desktop Bridge Implementations
//!
//! Default collaborators for desktop platforms (macOS, Windows, Linux):
//! - `StoreAccess` using `tokio::fs`, sandboxed under a host directory
//! - `Fetcher` using `reqwest`
//! - `ArchiveCodec` using `zip`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestFetcher, TokioStore, ZipCodec};
//!
//! let store = TokioStore::with_root("/var/lib/my-app/sandbox");
//! let fetcher = ReqwestFetcher::new()?;
//! let codec = ZipCodec::new();
//! ```

mod codec;
mod filesystem;
mod http;

pub use codec::ZipCodec;
pub use filesystem::TokioStore;
pub use http::ReqwestFetcher;
