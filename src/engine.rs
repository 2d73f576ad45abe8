//! The recognizer engine: an aggregation of recognizer channels.
//!
//! The engine itself carries no runtime state beyond its configuration and
//! the decoder factory; all the interesting machinery lives per channel.
//! The trait seams here stand in for the engine/channel/stream method
//! tables of the hosting media server.

use crate::audio::frame::AudioFrame;
use crate::channel::RecognizerChannel;
use crate::config::EngineConfig;
use crate::protocol::Request;
use crate::signaling::SignalingSink;
use crate::stt::decoder::DecoderFactory;
use std::sync::Arc;
use tracing::info;

/// Engine-channel surface driven by the signaling stack.
///
/// Per the engine contract, `open`, `process_request` and `close` must not
/// block: each acknowledgement travels asynchronously through the
/// channel's [`SignalingSink`] (`close` is the one exception — it joins
/// the worker so the close acknowledgement can guarantee full teardown).
pub trait EngineChannel: Send + Sync {
    fn open(&self);
    fn process_request(&self, request: Request);
    fn close(&self);
}

/// Media-stream surface driven by the media thread, once per frame at a
/// fixed cadence. Must not block.
pub trait AudioSink: Send + Sync {
    fn write_frame(&self, frame: &AudioFrame);
}

/// A recognition engine producing per-session recognizer channels.
pub struct RecognizerEngine {
    config: EngineConfig,
    factory: Arc<dyn DecoderFactory>,
}

impl RecognizerEngine {
    pub fn new(config: EngineConfig, factory: Arc<dyn DecoderFactory>) -> Self {
        Self { config, factory }
    }

    pub fn open(&self) {
        info!("open recognizer engine");
    }

    pub fn close(&self) {
        info!("close recognizer engine");
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creates a recognizer channel bound to the given signaling sink.
    /// Channels are independent; sessions across channels run in parallel.
    pub fn create_channel(&self, id: &str, sink: Arc<dyn SignalingSink>) -> RecognizerChannel {
        info!(channel = id, "create recognizer channel");
        RecognizerChannel::new(id, &self.config, Arc::clone(&self.factory), sink)
    }
}
