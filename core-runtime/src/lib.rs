//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the sandboxed file store:
//! - Configuration (`FsConfig`) with fail-fast capability validation
//! - Logging and tracing setup
//!
//! The file store core reads its collaborators, temp root and timeouts from
//! [`FsConfig`](config::FsConfig); nothing is kept in module-level state.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
