//! recogchan - MRCP recognizer engine channel
//!
//! Per-session coordination of speech recognition resources with a media
//! pipeline and a signaling stack: each channel dispatches protocol
//! requests on its own worker thread, consumes real-time audio frames on
//! the media thread, and emits exactly one response per request plus
//! well-ordered START-OF-INPUT / RECOGNITION-COMPLETE events.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod channel;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod signaling;
pub mod stt;

// Core surfaces (signaling → channel → worker; media → channel)
pub use channel::{GrammarRegistry, RecognizerChannel};
pub use engine::{AudioSink, EngineChannel, RecognizerEngine};

// Audio side
pub use audio::detector::{ActivityDetector, DetectorEvent};
pub use audio::frame::AudioFrame;

// Collaborator boundaries
pub use signaling::{ChannelMessage, QueueSink, SignalingSink};
pub use stt::decoder::{Decoder, DecoderFactory, Hypothesis, MockDecoderFactory, MockHandle};

// Protocol surface
pub use protocol::{
    CompletionCause, Event, EventKind, Method, Request, RequestId, RequestState, Response,
    StatusCode,
};

// Error handling
pub use error::{RecogError, Result};

// Config
pub use config::{DetectorConfig, EngineConfig, PathsConfig, RecognizerConfig};
