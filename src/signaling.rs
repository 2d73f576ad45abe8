//! Signaling boundary.
//!
//! The signaling stack owns session negotiation and message transport; the
//! channel only needs somewhere to hand responses, events and lifecycle
//! acknowledgements. Implementations must not block: they are called from
//! the worker thread and, for START-OF-INPUT, from the media thread.

use crate::protocol::{Event, Response};
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Outbound surface toward the signaling stack.
pub trait SignalingSink: Send + Sync {
    /// Delivers the single response owed for a request.
    fn deliver_response(&self, response: Response);

    /// Delivers an asynchronous event.
    fn deliver_event(&self, event: Event);

    /// Acknowledges the channel-open request.
    fn channel_opened(&self, success: bool);

    /// Acknowledges the channel-close request, sent after the worker
    /// thread has fully terminated.
    fn channel_closed(&self);
}

/// Everything a channel can emit toward signaling, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelMessage {
    Response(Response),
    Event(Event),
    Opened(bool),
    Closed,
}

/// A [`SignalingSink`] backed by an unbounded crossbeam channel.
///
/// The send never blocks and the receiving side can await messages with a
/// timeout, which is what both embedders bridging to a signaling agent and
/// the integration tests want.
pub struct QueueSink {
    tx: Sender<ChannelMessage>,
}

impl QueueSink {
    /// Creates a sink and the receiver for its messages.
    pub fn new() -> (Self, Receiver<ChannelMessage>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl SignalingSink for QueueSink {
    fn deliver_response(&self, response: Response) {
        // A dropped receiver means the session is gone; nothing to do.
        self.tx.send(ChannelMessage::Response(response)).ok();
    }

    fn deliver_event(&self, event: Event) {
        self.tx.send(ChannelMessage::Event(event)).ok();
    }

    fn channel_opened(&self, success: bool) {
        self.tx.send(ChannelMessage::Opened(success)).ok();
    }

    fn channel_closed(&self) {
        self.tx.send(ChannelMessage::Closed).ok();
    }
}
