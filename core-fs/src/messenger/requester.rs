//! Requester endpoint: turns a message-passed call into a blocking one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use core_async::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::protocol::{decode, encode, Call, Payload, Request, RequestId, WorkerMessage};
use crate::error::{FsError, IoResult, VoidIoResult};
use crate::wait::{wait_for, OpTimeout, Signal};

enum Slot {
    Pending,
    Filled(IoResult<Payload>),
}

/// Requester side of a messenger session.
///
/// Any number of threads may call concurrently; each call gets its own
/// identifier and slot. Responses are fed in through [`SyncMessenger::deliver`]
/// by a handler that runs independently of the blocked callers.
pub struct SyncMessenger {
    next_id: AtomicU64,
    pending: Mutex<HashMap<RequestId, Slot>>,
    signal: Signal,
    timeout: OpTimeout,
    outbound: Mutex<Option<UnboundedSender<Vec<u8>>>>,
    ready: AtomicBool,
    closed: Mutex<Option<String>>,
}

impl SyncMessenger {
    pub fn new(outbound: UnboundedSender<Vec<u8>>, timeout: OpTimeout) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
            signal: Signal::new(),
            timeout,
            outbound: Mutex::new(Some(outbound)),
            ready: AtomicBool::new(false),
            closed: Mutex::new(None),
        }
    }

    /// Handle to this session's op timeout.
    pub fn op_timeout(&self) -> &OpTimeout {
        &self.timeout
    }

    /// Number of registered calls still waiting for a response.
    pub fn in_flight(&self) -> usize {
        self.pending().len()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.closed).is_some()
    }

    /// Send `call` and block until its response lands or the op timeout
    /// passes.
    ///
    /// On timeout the slot is abandoned; a response arriving later is
    /// discarded. The executor may still complete the operation.
    pub fn call(&self, call: Call) -> IoResult<Payload> {
        if let Some(reason) = lock(&self.closed).clone() {
            return Err(FsError::SessionClosed(reason));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let op = call.op();
        let frame = encode(&Request { id, call })?;

        self.pending().insert(id, Slot::Pending);
        if let Err(e) = self.send(frame) {
            self.pending().remove(&id);
            return Err(e);
        }
        debug!(id, op, "Request sent");

        let waited = wait_for(&self.signal, &self.timeout, || {
            let mut pending = self.pending();
            if matches!(pending.get(&id), Some(Slot::Pending)) {
                return None;
            }
            match pending.remove(&id) {
                Some(Slot::Filled(result)) => Some(result),
                _ => Some(Err(FsError::Channel(format!("request {} has no slot", id)))),
            }
        });

        match waited {
            Ok(result) => result,
            Err(timeout) => {
                self.pending().remove(&id);
                warn!(id, op, timeout_ms = self.timeout.get().as_millis() as u64, "Request timed out");
                Err(timeout)
            }
        }
    }

    /// Feed one frame received from the executor.
    ///
    /// Undecodable frames and responses for unknown identifiers are dropped.
    pub fn deliver(&self, frame: &[u8]) {
        let message = match decode::<WorkerMessage>(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable frame from executor");
                return;
            }
        };

        match message {
            WorkerMessage::Ready => {
                self.ready.store(true, Ordering::Release);
                debug!("Executor ready");
            }
            WorkerMessage::Response(response) => {
                let mut pending = self.pending();
                match pending.get_mut(&response.id) {
                    Some(slot @ Slot::Pending) => {
                        *slot = Slot::Filled(response.result.map_err(FsError::from));
                    }
                    _ => debug!(id = response.id, "Discarding late response"),
                }
            }
        }
        self.signal.notify();
    }

    /// Block until the executor has reported ready.
    pub fn wait_ready(&self, timeout: &OpTimeout) -> VoidIoResult {
        wait_for(&self.signal, timeout, || {
            if self.ready.load(Ordering::Acquire) {
                Some(Ok(()))
            } else {
                lock(&self.closed).clone().map(|reason| Err(FsError::SessionClosed(reason)))
            }
        })?
    }

    /// Close the session: stop sending, and fail every pending call with
    /// `SessionClosed`. Later calls fail the same way. Idempotent.
    pub fn close(&self, reason: &str) {
        let reason = {
            let mut closed = lock(&self.closed);
            if closed.is_none() {
                *closed = Some(reason.to_string());
            }
            closed.clone().unwrap_or_default()
        };
        lock(&self.outbound).take();

        let mut failed = 0usize;
        for slot in self.pending().values_mut() {
            if matches!(slot, Slot::Pending) {
                *slot = Slot::Filled(Err(FsError::SessionClosed(reason.clone())));
                failed += 1;
            }
        }
        if failed > 0 {
            debug!(failed, reason = %reason, "Failed in-flight requests on close");
        }
        self.signal.notify();
    }

    fn send(&self, frame: Vec<u8>) -> VoidIoResult {
        let outbound = lock(&self.outbound);
        let Some(sender) = outbound.as_ref() else {
            let reason = lock(&self.closed).clone().unwrap_or_default();
            return Err(FsError::SessionClosed(reason));
        };
        sender
            .send(frame)
            .map_err(|_| FsError::Channel("executor channel is closed".to_string()))
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<RequestId, Slot>> {
        lock(&self.pending)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorLike, SESSION_CLOSED_ERROR};
    use crate::messenger::protocol::Response;
    use core_async::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn respond(id: RequestId, result: Result<Payload, ErrorLike>) -> Vec<u8> {
        encode(&WorkerMessage::Response(Response { id, result })).unwrap()
    }

    /// Echo executor on a plain thread: answers every request with `Bool(true)`
    /// after `delay`.
    fn echo(
        messenger: Arc<SyncMessenger>,
        mut rx: mpsc::UnboundedReceiver<Vec<u8>>,
        delay: Duration,
    ) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            while let Some(frame) = rx.blocking_recv() {
                let request: Request = decode(&frame).unwrap();
                thread::sleep(delay);
                messenger.deliver(&respond(request.id, Ok(Payload::Bool(true))));
            }
        })
    }

    #[test]
    fn test_call_round_trip() {
        let (tx, rx) = mpsc::unbounded_channel();
        let messenger = Arc::new(SyncMessenger::new(tx, OpTimeout::new(Duration::from_secs(2))));
        let worker = echo(messenger.clone(), rx, Duration::ZERO);

        let payload = messenger.call(Call::Exists { path: "/a".into() }).unwrap();
        assert_eq!(payload, Payload::Bool(true));
        assert_eq!(messenger.in_flight(), 0);

        messenger.close("done");
        worker.join().unwrap();
    }

    #[test]
    fn test_timeout_abandons_slot_and_discards_late_response() {
        let (tx, rx) = mpsc::unbounded_channel();
        let messenger = Arc::new(SyncMessenger::new(tx, OpTimeout::new(Duration::from_millis(50))));
        let worker = echo(messenger.clone(), rx, Duration::from_millis(200));

        let start = Instant::now();
        let err = messenger.call(Call::DeleteTemp).unwrap_err();
        assert!(err.is_timeout());
        assert!(start.elapsed() < Duration::from_millis(180));
        assert_eq!(messenger.in_flight(), 0);

        messenger.op_timeout().set(Duration::from_secs(2));
        thread::sleep(Duration::from_millis(250));
        assert_eq!(messenger.in_flight(), 0);

        messenger.close("done");
        worker.join().unwrap();
    }

    #[test]
    fn test_close_fails_pending_calls() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let messenger = Arc::new(SyncMessenger::new(tx, OpTimeout::new(Duration::from_secs(5))));

        let caller = {
            let messenger = messenger.clone();
            thread::spawn(move || messenger.call(Call::DeleteTemp))
        };
        while messenger.in_flight() == 0 {
            thread::yield_now();
        }
        messenger.close("session terminated");

        let err = caller.join().unwrap().unwrap_err();
        assert_eq!(err.name(), SESSION_CLOSED_ERROR);

        let err = messenger.call(Call::DeleteTemp).unwrap_err();
        assert_eq!(err, FsError::SessionClosed("session terminated".into()));
    }

    #[test]
    fn test_error_result_is_restored() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let messenger = Arc::new(SyncMessenger::new(tx, OpTimeout::new(Duration::from_secs(2))));
        let worker = {
            let messenger = messenger.clone();
            thread::spawn(move || {
                let request: Request = decode(&rx.blocking_recv().unwrap()).unwrap();
                let err = ErrorLike::new("QuotaExceededError", "store is full");
                messenger.deliver(&respond(request.id, Err(err)));
            })
        };

        let err = messenger.call(Call::Mkdir { path: "/x".into() }).unwrap_err();
        assert_eq!(err.name(), "QuotaExceededError");
        assert_eq!(err.message(), "store is full");
        worker.join().unwrap();
    }

    #[test]
    fn test_wait_ready() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let messenger = SyncMessenger::new(tx, OpTimeout::default());

        let err = messenger.wait_ready(&OpTimeout::new(Duration::from_millis(20))).unwrap_err();
        assert!(err.is_timeout());

        messenger.deliver(&encode(&WorkerMessage::Ready).unwrap());
        messenger.wait_ready(&OpTimeout::new(Duration::from_millis(20))).unwrap();
    }

    #[test]
    fn test_garbage_frame_is_ignored() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let messenger = SyncMessenger::new(tx, OpTimeout::default());
        messenger.deliver(b"\x00\x01");
        assert!(!messenger.is_closed());
    }
}
