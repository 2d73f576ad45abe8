//! The recognizer engine channel.
//!
//! One channel per session-resource pairing. The signaling thread submits
//! requests through [`RecognizerChannel::process_request`], the media
//! thread delivers frames through [`RecognizerChannel::write_frame`], and
//! a dedicated worker thread owns all protocol state and produces exactly
//! one response per request plus well-ordered events. Neither ingress path
//! ever blocks: both only write a mailbox slot (the media path additionally
//! takes the media-state lock, which the gate keeps uncontended).

pub mod grammar;
mod mailbox;
mod worker;

pub use grammar::GrammarRegistry;

use crate::audio::detector::{ActivityDetector, DetectorEvent};
use crate::audio::frame::AudioFrame;
use crate::config::{EngineConfig, RecognizerConfig};
use crate::engine::{AudioSink, EngineChannel};
use crate::protocol::{CompletionCause, Event, Request};
use crate::signaling::SignalingSink;
use crate::stt::decoder::{Decoder, DecoderFactory};
use mailbox::Mailbox;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};
use worker::Worker;

/// Decoder-side state shared between the media thread and the worker.
///
/// The ingress gate guarantees the two sides never contend: the worker
/// only takes this lock while no recognition is in progress or while a
/// completion is pending, and the media thread only while the opposite
/// holds.
pub(crate) struct MediaState {
    pub decoder: Option<Box<dyn Decoder>>,
    pub detector: ActivityDetector,
    /// Time elapsed in the current utterance, in frame-time increments.
    pub recognition_elapsed_ms: u64,
    /// Time elapsed since the last partial-result poll.
    pub partial_elapsed_ms: u64,
    /// Most recent decoded hypothesis text.
    pub last_result: Option<String>,
}

/// State shared by the façade, the worker thread and the media callback.
pub(crate) struct ChannelInner {
    pub id: String,
    pub timing: RecognizerConfig,
    pub mailbox: Mailbox,
    pub media: Mutex<MediaState>,
    pub sink: Arc<dyn SignalingSink>,
}

impl ChannelInner {
    pub(crate) fn media(&self) -> MutexGuard<'_, MediaState> {
        self.media.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A recognizer channel: the engine-side endpoint of one MRCP recognizer
/// resource.
pub struct RecognizerChannel {
    inner: Arc<ChannelInner>,
    grammar_dir: PathBuf,
    factory: Arc<dyn DecoderFactory>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RecognizerChannel {
    pub fn new(
        id: &str,
        config: &EngineConfig,
        factory: Arc<dyn DecoderFactory>,
        sink: Arc<dyn SignalingSink>,
    ) -> Self {
        let inner = ChannelInner {
            id: id.to_string(),
            timing: config.recognizer,
            mailbox: Mailbox::new(),
            media: Mutex::new(MediaState {
                decoder: None,
                detector: ActivityDetector::new(config.detector),
                recognition_elapsed_ms: 0,
                partial_elapsed_ms: 0,
                last_result: None,
            }),
            sink,
        };
        Self {
            inner: Arc::new(inner),
            grammar_dir: config.paths.grammar_dir.clone(),
            factory,
            worker: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    fn worker_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EngineChannel for RecognizerChannel {
    /// Opens the channel by launching its worker thread. The open
    /// acknowledgement is sent by the worker once its state is ready; a
    /// failed launch is acknowledged here and the worker loop never runs.
    fn open(&self) {
        info!(channel = %self.inner.id, "open channel");
        let worker = Worker::new(
            Arc::clone(&self.inner),
            GrammarRegistry::new(&self.grammar_dir, &self.inner.id),
            Arc::clone(&self.factory),
        );
        let spawned = thread::Builder::new()
            .name(format!("recog-{}", self.inner.id))
            .spawn(move || worker.run());
        match spawned {
            Ok(handle) => {
                let mut slot = self.worker_slot();
                *slot = Some(handle);
            }
            Err(err) => {
                warn!(channel = %self.inner.id, error = %err, "failed to launch worker thread");
                self.inner.sink.channel_opened(false);
            }
        }
    }

    /// Hands a request to the worker thread. Never blocks beyond the
    /// mailbox slot write.
    fn process_request(&self, request: Request) {
        self.inner.mailbox.post_request(request);
    }

    /// Closes the channel: signals the worker to terminate, joins it, and
    /// only then acknowledges the close.
    fn close(&self) {
        info!(channel = %self.inner.id, "close channel");
        let handle = self.worker_slot().take();
        if let Some(handle) = handle {
            self.inner.mailbox.request_close();
            if handle.join().is_err() {
                warn!(channel = %self.inner.id, "worker thread panicked during close");
            }
        }
        self.inner.sink.channel_closed();
    }
}

impl AudioSink for RecognizerChannel {
    /// The audio ingress callback, invoked by the media thread for every
    /// frame. Must never block; evaluation order is fixed: deferred-STOP
    /// fast path, decoder feed, partial-result timer, recognition timer,
    /// activity detection.
    fn write_frame(&self, frame: &AudioFrame) {
        let Some(gate) = self.inner.mailbox.ingress_gate() else {
            return;
        };

        // A deferred STOP short-circuits normal flow so the worker's
        // stop/close handling can proceed without waiting for silence.
        if gate.stop_pending {
            self.inner.mailbox.post_completion(CompletionCause::Success);
            return;
        }

        let frame_time = self.inner.timing.frame_time_ms;
        let mut media = self.inner.media();

        // Per-frame decoder failures are non-fatal; recognition continues
        // on subsequent frames.
        if let Some(decoder) = media.decoder.as_mut() {
            if let Err(err) = decoder.feed(&frame.samples) {
                warn!(channel = %self.inner.id, error = %err, "failed to feed frame to decoder");
            }
        }

        media.partial_elapsed_ms += frame_time;
        if media.partial_elapsed_ms >= self.inner.timing.partial_result_timeout_ms {
            media.partial_elapsed_ms = 0;
            let hypothesis = media.decoder.as_ref().and_then(|d| d.hypothesis());
            if let Some(hypothesis) = hypothesis {
                if !hypothesis.text.is_empty()
                    && media.last_result.as_deref() != Some(hypothesis.text.as_str())
                {
                    debug!(
                        channel = %self.inner.id,
                        text = %hypothesis.text,
                        score = hypothesis.score,
                        "partial result"
                    );
                    media.last_result = Some(hypothesis.text);
                }
            }
        }

        media.recognition_elapsed_ms += frame_time;
        if media.recognition_elapsed_ms >= self.inner.timing.recognition_timeout_ms {
            drop(media);
            info!(channel = %self.inner.id, "recognition timeout elapsed");
            self.inner
                .mailbox
                .post_completion(CompletionCause::RecognitionTimeout);
            return;
        }

        let event = media.detector.process(&frame.samples);
        drop(media);
        match event {
            DetectorEvent::Activity => {
                info!(channel = %self.inner.id, "detected voice activity");
                // START-OF-INPUT carries no response obligation and no
                // worker state, so it goes out directly.
                self.inner
                    .sink
                    .deliver_event(Event::start_of_input(gate.request_id));
            }
            DetectorEvent::Inactivity => {
                info!(channel = %self.inner.id, "detected voice inactivity");
                self.inner.mailbox.post_completion(CompletionCause::Success);
            }
            DetectorEvent::NoInput => {
                info!(channel = %self.inner.id, "detected no input");
                self.inner
                    .mailbox
                    .post_completion(CompletionCause::NoInputTimeout);
            }
            DetectorEvent::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signaling::{ChannelMessage, QueueSink};
    use crate::stt::decoder::MockDecoderFactory;

    #[test]
    fn test_close_without_open_still_acknowledges() {
        let (sink, rx) = QueueSink::new();
        let channel = RecognizerChannel::new(
            "chan-0",
            &EngineConfig::default(),
            Arc::new(MockDecoderFactory::new()),
            Arc::new(sink),
        );
        channel.close();
        assert_eq!(rx.recv().unwrap(), ChannelMessage::Closed);
    }

    #[test]
    fn test_frames_ignored_while_idle() {
        let (sink, rx) = QueueSink::new();
        let factory = MockDecoderFactory::new();
        let handle = factory.handle();
        let channel = RecognizerChannel::new(
            "chan-0",
            &EngineConfig::default(),
            Arc::new(factory),
            Arc::new(sink),
        );
        channel.write_frame(&AudioFrame::tone(3000));
        assert_eq!(handle.feed_count(), 0);
        assert!(rx.try_recv().is_err());
    }
}
