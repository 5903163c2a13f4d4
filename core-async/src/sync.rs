//! Channels.
//!
//! The unbounded `mpsc` channel is the message channel between requester and
//! executor domains: its sender is usable from threads that cannot await, and
//! its receiver supports both `recv().await` and `blocking_recv()`.

pub use tokio::sync::mpsc;
