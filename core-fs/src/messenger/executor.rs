//! Executor endpoint: performs bridged calls against [`Opfs`] and replies.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Utc};
use core_async::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use futures::FutureExt;
use tracing::{debug, info, warn};

use super::protocol::{decode, encode, Call, Payload, Request, Response, WorkerMessage};
use crate::error::{ErrorLike, FsError};
use crate::opfs::Opfs;

/// Name of the error reported when an operation panics inside the executor.
pub const PANIC_ERROR: &str = "PanicError";

/// Executor side of a messenger session.
#[derive(Debug, Clone)]
pub struct Executor {
    fs: Opfs,
}

impl Executor {
    pub fn new(fs: Opfs) -> Self {
        Self { fs }
    }

    /// Announce readiness, then serve requests until `inbound` closes.
    ///
    /// Each request runs as its own task, so responses may come back in any
    /// order. Must run inside a tokio runtime.
    pub async fn serve(self, mut inbound: UnboundedReceiver<Vec<u8>>, outbound: UnboundedSender<Vec<u8>>) {
        let announced = encode(&WorkerMessage::Ready)
            .map(|frame| outbound.send(frame).is_ok())
            .unwrap_or(false);
        if !announced {
            warn!("Requester went away before the ready handshake");
            return;
        }
        info!("Executor ready");

        while let Some(frame) = inbound.recv().await {
            let executor = self.clone();
            let outbound = outbound.clone();
            core_async::spawn(async move {
                let Some(reply) = executor.handle_frame(&frame).await else {
                    return;
                };
                if outbound.send(reply).is_err() {
                    debug!("Requester closed before a response was sent");
                }
            });
        }

        info!("Executor inbound channel closed");
    }

    /// Decode one request frame, run it and encode the response frame.
    ///
    /// Returns `None` for frames that cannot be decoded; their caller is
    /// released by its own timeout.
    pub async fn handle_frame(&self, frame: &[u8]) -> Option<Vec<u8>> {
        let Request { id, call } = match decode::<Request>(frame) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable request");
                return None;
            }
        };

        let op = call.op();
        let result = AssertUnwindSafe(self.execute(call))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ErrorLike::new(PANIC_ERROR, panic_message(panic.as_ref()))));

        if let Err(e) = &result {
            debug!(id, op, name = %e.name, message = %e.message, "Request failed");
        }

        match encode(&WorkerMessage::Response(Response { id, result })) {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!(id, op, error = %e, "Failed to encode response");
                let fallback = Response {
                    id,
                    result: Err(ErrorLike::from(e)),
                };
                encode(&WorkerMessage::Response(fallback)).ok()
            }
        }
    }

    /// Perform one call.
    pub async fn execute(&self, call: Call) -> Result<Payload, ErrorLike> {
        let fs = &self.fs;
        let outcome = match call {
            Call::CreateFile { path } => fs.create_file(&path).await.map(|_| Payload::Unit),
            Call::Mkdir { path } => fs.mkdir(&path).await.map(|_| Payload::Unit),
            Call::ReadDir { path, recursive } => fs.read_dir(&path, recursive).await.map(Payload::Entries),
            Call::ReadFile { path } => fs.read_file(&path).await.map(|data| Payload::Bytes(data.to_vec())),
            Call::ReadBlobFile { path } => fs.read_blob_file(&path).await.map(Payload::File),
            Call::WriteFile { path, contents, append } => {
                let written = if append {
                    fs.append_file(&path, contents).await
                } else {
                    fs.write_file(&path, contents).await
                };
                written.map(|_| Payload::Unit)
            }
            Call::Remove { path } => fs.remove(&path).await.map(|_| Payload::Unit),
            Call::Stat { path } => fs.stat(&path).await.map(Payload::Handle),
            Call::Exists { path } => fs.exists(&path).await.map(Payload::Bool),
            Call::MkTemp { options } => fs.mk_temp(&options).await.map(Payload::Path),
            Call::DeleteTemp => fs.delete_temp().await.map(|_| Payload::Unit),
            Call::PruneTemp { expired_before } => match DateTime::<Utc>::from_timestamp_millis(expired_before) {
                Some(expired) => fs.prune_temp(expired).await.map(|_| Payload::Unit),
                None => Err(FsError::NativeStore {
                    name: "RangeError".to_string(),
                    message: format!("{} is not a valid timestamp", expired_before),
                }),
            },
            Call::Unzip { zip_path, target } => fs.unzip(&zip_path, &target).await.map(|_| Payload::Unit),
            Call::UnzipFromUrl { url, target, options } => {
                fs.unzip_from_url(&url, &target, &options).await.map(|_| Payload::Unit)
            }
        };
        outcome.map_err(ErrorLike::from)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "executor task panicked".to_string()
    }
}
