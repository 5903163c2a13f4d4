//! Runtime utilities that abstract over the underlying async executor.

use std::io;

use tokio::runtime::{Builder, Handle, Runtime};

/// Builds the single-threaded runtime that drives an executor domain.
///
/// The runtime is owned by the thread that calls this; it never migrates
/// tasks to other threads.
pub fn executor_runtime(thread_name: &str) -> io::Result<Runtime> {
    Builder::new_current_thread()
        .thread_name(thread_name)
        .enable_all()
        .build()
}

/// Returns `true` when called from inside a tokio runtime context.
///
/// Blocking bridges use this to flag calls that park a runtime thread; the
/// call still proceeds.
pub fn in_async_context() -> bool {
    Handle::try_current().is_ok()
}
