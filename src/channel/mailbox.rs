//! Cross-thread mailbox between the signaling/media producers and the
//! recognition worker.
//!
//! One mutex and one condition variable guard two single-item slots: the
//! pending request (written by the signaling thread) and the pending
//! completion cause (written by the media thread). The same critical
//! section carries the ingress gate the media thread consults before
//! touching the decoder. Both slots are drained atomically under the lock
//! before the worker dispatches anything, so a signal can neither be lost
//! nor consumed twice.

use crate::protocol::{CompletionCause, Request, RequestId};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Slots {
    /// Pending request from the signaling thread. The protocol guarantees
    /// at most one request in flight per channel.
    request: Option<Request>,
    /// Pending completion raised by the media thread.
    completion: Option<CompletionCause>,
    /// Cooperative-close flag; observed by the worker at the top of its
    /// wait loop.
    close_requested: bool,
    /// Id of the in-progress RECOGNIZE, if any. Maintained by the worker,
    /// read by the media thread as its ingress gate.
    recognizing: Option<RequestId>,
    /// A STOP response is deferred; the next frame short-circuits into a
    /// completion.
    stop_pending: bool,
}

/// What a single worker wakeup drained from the slots.
#[derive(Debug)]
pub(crate) struct Wakeup {
    pub request: Option<Request>,
    pub completion: Option<CompletionCause>,
    pub close_requested: bool,
}

/// Snapshot the media thread takes before processing a frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IngressGate {
    pub request_id: RequestId,
    pub stop_pending: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Mailbox {
    slots: Mutex<Slots>,
    signal: Condvar,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a request and wakes the worker. Called from the signaling
    /// thread; never blocks beyond the slot write.
    pub(crate) fn post_request(&self, request: Request) {
        let mut slots = self.lock();
        debug_assert!(
            slots.request.is_none(),
            "a second request arrived before the first was consumed"
        );
        slots.request = Some(request);
        self.signal.notify_one();
    }

    /// Raises a completion cause and wakes the worker. Called from the
    /// media thread. A completion already pending wins; the gate makes
    /// that unreachable in practice.
    pub(crate) fn post_completion(&self, cause: CompletionCause) {
        let mut slots = self.lock();
        if slots.completion.is_none() {
            slots.completion = Some(cause);
            self.signal.notify_one();
        }
    }

    /// Requests cooperative close and wakes the worker.
    pub(crate) fn request_close(&self) {
        let mut slots = self.lock();
        slots.close_requested = true;
        self.signal.notify_one();
    }

    pub(crate) fn close_requested(&self) -> bool {
        self.lock().close_requested
    }

    /// Blocks until a slot is filled or close is requested, then drains
    /// both slots.
    pub(crate) fn wait(&self) -> Wakeup {
        let mut slots = self.lock();
        while slots.request.is_none() && slots.completion.is_none() && !slots.close_requested {
            slots = self
                .signal
                .wait(slots)
                .unwrap_or_else(PoisonError::into_inner);
        }
        Wakeup {
            request: slots.request.take(),
            completion: slots.completion.take(),
            close_requested: slots.close_requested,
        }
    }

    /// Close-path wait: blocks until the media thread delivers the
    /// completion for the still-in-progress recognition, then drains it.
    pub(crate) fn wait_completion(&self) -> CompletionCause {
        let mut slots = self.lock();
        loop {
            if let Some(cause) = slots.completion.take() {
                return cause;
            }
            slots = self
                .signal
                .wait(slots)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Marks a RECOGNIZE as in progress and clears any stale completion.
    pub(crate) fn begin_recognition(&self, request_id: RequestId) {
        let mut slots = self.lock();
        slots.recognizing = Some(request_id);
        slots.completion = None;
    }

    /// Clears the in-progress marker; the ingress gate closes with it.
    pub(crate) fn end_recognition(&self) {
        let mut slots = self.lock();
        slots.recognizing = None;
    }

    pub(crate) fn set_stop_pending(&self, pending: bool) {
        let mut slots = self.lock();
        slots.stop_pending = pending;
        if pending {
            // the close path waits on the completion the next frame raises
            self.signal.notify_one();
        }
    }

    /// Returns the ingress gate if a recognition is in progress and no
    /// completion is pending; otherwise the frame is to be ignored.
    pub(crate) fn ingress_gate(&self) -> Option<IngressGate> {
        let slots = self.lock();
        if slots.completion.is_some() {
            return None;
        }
        slots.recognizing.map(|request_id| IngressGate {
            request_id,
            stop_pending: slots.stop_pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Method, Request};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_returns_posted_request() {
        let mailbox = Arc::new(Mailbox::new());
        let producer = Arc::clone(&mailbox);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.post_request(Request::new(1, Method::GetParams));
        });

        let wakeup = mailbox.wait();
        assert!(wakeup.request.is_some());
        assert!(wakeup.completion.is_none());
        assert!(!wakeup.close_requested);
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_drains_both_slots_at_once() {
        let mailbox = Mailbox::new();
        mailbox.begin_recognition(RequestId(1));
        mailbox.post_request(Request::new(2, Method::Stop));
        mailbox.post_completion(CompletionCause::Success);

        let wakeup = mailbox.wait();
        assert!(wakeup.request.is_some());
        assert_eq!(wakeup.completion, Some(CompletionCause::Success));

        // Slots are empty afterwards; close is the only way to wake again.
        mailbox.request_close();
        let wakeup = mailbox.wait();
        assert!(wakeup.request.is_none());
        assert!(wakeup.completion.is_none());
        assert!(wakeup.close_requested);
    }

    #[test]
    fn test_first_completion_wins() {
        let mailbox = Mailbox::new();
        mailbox.post_completion(CompletionCause::NoInputTimeout);
        mailbox.post_completion(CompletionCause::Success);
        let wakeup = mailbox.wait();
        assert_eq!(wakeup.completion, Some(CompletionCause::NoInputTimeout));
    }

    #[test]
    fn test_gate_closed_when_idle() {
        let mailbox = Mailbox::new();
        assert!(mailbox.ingress_gate().is_none());
    }

    #[test]
    fn test_gate_open_during_recognition() {
        let mailbox = Mailbox::new();
        mailbox.begin_recognition(RequestId(5));
        let gate = mailbox.ingress_gate().unwrap();
        assert_eq!(gate.request_id, RequestId(5));
        assert!(!gate.stop_pending);

        mailbox.set_stop_pending(true);
        assert!(mailbox.ingress_gate().unwrap().stop_pending);
    }

    #[test]
    fn test_gate_closed_while_completion_pending() {
        let mailbox = Mailbox::new();
        mailbox.begin_recognition(RequestId(5));
        mailbox.post_completion(CompletionCause::Success);
        assert!(mailbox.ingress_gate().is_none());

        // Draining the completion reopens the gate until end_recognition.
        let _ = mailbox.wait();
        assert!(mailbox.ingress_gate().is_some());
        mailbox.end_recognition();
        assert!(mailbox.ingress_gate().is_none());
    }

    #[test]
    fn test_begin_recognition_clears_stale_completion() {
        let mailbox = Mailbox::new();
        mailbox.post_completion(CompletionCause::RecognitionTimeout);
        mailbox.begin_recognition(RequestId(9));
        mailbox.post_request(Request::new(10, Method::GetParams));
        let wakeup = mailbox.wait();
        assert_eq!(wakeup.completion, None);
    }

    #[test]
    fn test_wait_completion_blocks_until_raised() {
        let mailbox = Arc::new(Mailbox::new());
        let producer = Arc::clone(&mailbox);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.post_completion(CompletionCause::Success);
        });
        assert_eq!(mailbox.wait_completion(), CompletionCause::Success);
        handle.join().unwrap();
    }
}
