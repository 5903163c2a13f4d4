//! Task spawning and execution abstractions.
//!
//! Thin wrappers over `tokio::task`. Fan-out helpers used by aggregate
//! operations (archive expansion) live here so they share one executor.

pub use tokio::task::{spawn_blocking, JoinHandle};

/// Spawns a new asynchronous task on the current runtime.
///
/// # Panics
///
/// Panics when called outside a runtime context, like `tokio::spawn`.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Drives every future concurrently and returns their outputs in input order.
///
/// All futures run to completion even when some of them resolve to an
/// error value; nothing is cancelled early.
pub async fn join_all<I>(futures: I) -> Vec<<I::Item as std::future::Future>::Output>
where
    I: IntoIterator,
    I::Item: std::future::Future,
{
    futures::future::join_all(futures).await
}
