//! Abstracted MRCP recognizer-resource protocol surface.
//!
//! The signaling stack parses and serializes real MRCP; the channel works
//! with these already-decoded message types and hands back responses and
//! events through the signaling boundary.

pub mod message;
pub mod nlsml;

pub use message::{
    CompletionCause, Event, EventKind, Method, Request, RequestId, RequestState, Response,
    StatusCode,
};
