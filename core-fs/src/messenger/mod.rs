//! # Messenger
//!
//! Paired endpoints that let a caller which cannot await perform an
//! operation that only exists asynchronously.
//!
//! 1. [`SyncMessenger::call`] registers a fresh identifier in the pending
//!    table, sends a [`Request`] and blocks on the shared [`Signal`].
//! 2. [`Executor`] runs the call against [`Opfs`](crate::Opfs) in its own
//!    runtime and sends back a [`Response`] with the same identifier.
//! 3. The requester's drain handler passes each frame to
//!    [`SyncMessenger::deliver`], which fills the slot and notifies.
//! 4. The blocked caller returns the filled result, or `TimeoutError` once
//!    the op timeout passes. A response for an abandoned slot is dropped.
//!
//! Responses are matched by identifier only; there is no ordering between
//! concurrent calls.
//!
//! [`Signal`]: crate::wait::Signal

pub mod executor;
pub mod protocol;
pub mod requester;

pub use executor::{Executor, PANIC_ERROR};
pub use protocol::{Call, Payload, Request, RequestId, Response, WorkerMessage};
pub use requester::SyncMessenger;
