//! Runtime facade for the sandboxed file store.
//!
//! Every other crate in the workspace reaches tokio through this crate so the
//! executor choice lives in one place. Two shapes of use exist:
//!
//! - The executor domain owns a dedicated thread with a current-thread runtime
//!   built through [`runtime::executor_runtime`].
//! - Async callers in the main context use [`task::spawn`] and the
//!   [`sync`] channels directly.
//!
//! # Modules
//!
//! - `runtime`: executor runtime construction and context detection
//! - `task`: task spawning and join helpers
//! - `time`: wall-clock helpers
//! - `sync`: the requester/executor channel

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
