//! Decoder boundary traits.
//!
//! The recognition engine proper (acoustic model, grammar compiler) is an
//! external collaborator. The channel only needs utterance bracketing,
//! incremental audio feeding and hypothesis retrieval, so that is the
//! whole trait surface. A mock implementation lives here too, allowing the
//! channel machinery to be tested without a real engine.

use crate::error::{RecogError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A decoded hypothesis with its raw decoder score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypothesis {
    pub text: String,
    pub score: i32,
}

/// One recognition decoder instance, owned by a single channel.
pub trait Decoder: Send {
    /// Re-initializes the decoder with a new active grammar.
    fn init_grammar(&mut self, grammar: &Path) -> Result<()>;

    /// Begins a new utterance.
    fn start_utterance(&mut self) -> Result<()>;

    /// Feeds one frame's worth of PCM samples into the running utterance.
    fn feed(&mut self, samples: &[i16]) -> Result<()>;

    /// Returns the best hypothesis so far, if any.
    fn hypothesis(&self) -> Option<Hypothesis>;

    /// Ends the current utterance.
    fn end_utterance(&mut self) -> Result<()>;
}

/// Creates decoder instances for newly defined grammars.
pub trait DecoderFactory: Send + Sync {
    /// Builds a decoder initialized with the given grammar file.
    fn create_decoder(&self, grammar: &Path) -> Result<Box<dyn Decoder>>;
}

/// Observable state shared between a [`MockDecoderFactory`], the decoders
/// it hands out, and the test asserting on them.
#[derive(Debug, Default)]
struct MockState {
    hypothesis: Mutex<Option<Hypothesis>>,
    feeds: AtomicUsize,
    hypothesis_polls: AtomicUsize,
    utterances_started: AtomicUsize,
    utterances_ended: AtomicUsize,
    fail_create: AtomicBool,
    fail_grammar: AtomicBool,
    fail_start: AtomicBool,
    fail_feed: AtomicBool,
    last_grammar: Mutex<Option<PathBuf>>,
}

/// Factory producing mock decoders for tests.
///
/// All decoders created by one factory share its state, so a test can keep
/// a [`MockHandle`] and both script behavior and observe decoder calls
/// while the channel owns the decoder itself.
#[derive(Debug, Default)]
pub struct MockDecoderFactory {
    state: Arc<MockState>,
}

/// Test-side handle to the shared mock state.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<MockState>,
}

impl MockDecoderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle for scripting and observing the mock.
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }
}

#[allow(clippy::unwrap_used)]
impl MockHandle {
    /// Scripts the hypothesis returned by subsequent `hypothesis()` calls.
    pub fn set_hypothesis(&self, text: &str, score: i32) {
        let mut slot = self.state.hypothesis.lock().unwrap();
        *slot = Some(Hypothesis {
            text: text.to_string(),
            score,
        });
    }

    /// Clears the scripted hypothesis (decoder reports nothing).
    pub fn clear_hypothesis(&self) {
        let mut slot = self.state.hypothesis.lock().unwrap();
        *slot = None;
    }

    pub fn fail_create(&self, fail: bool) {
        self.state.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_grammar(&self, fail: bool) {
        self.state.fail_grammar.store(fail, Ordering::SeqCst);
    }

    pub fn fail_start(&self, fail: bool) {
        self.state.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn fail_feed(&self, fail: bool) {
        self.state.fail_feed.store(fail, Ordering::SeqCst);
    }

    /// Number of frames fed across all utterances.
    pub fn feed_count(&self) -> usize {
        self.state.feeds.load(Ordering::SeqCst)
    }

    /// Number of times the channel asked for a hypothesis.
    pub fn hypothesis_polls(&self) -> usize {
        self.state.hypothesis_polls.load(Ordering::SeqCst)
    }

    pub fn utterances_started(&self) -> usize {
        self.state.utterances_started.load(Ordering::SeqCst)
    }

    pub fn utterances_ended(&self) -> usize {
        self.state.utterances_ended.load(Ordering::SeqCst)
    }

    /// The grammar path most recently handed to the decoder.
    pub fn last_grammar(&self) -> Option<PathBuf> {
        self.state.last_grammar.lock().unwrap().clone()
    }
}

struct MockDecoder {
    state: Arc<MockState>,
}

#[allow(clippy::unwrap_used)]
impl DecoderFactory for MockDecoderFactory {
    fn create_decoder(&self, grammar: &Path) -> Result<Box<dyn Decoder>> {
        if self.state.fail_create.load(Ordering::SeqCst) {
            return Err(RecogError::engine("mock decoder creation failure"));
        }
        let mut last = self.state.last_grammar.lock().unwrap();
        *last = Some(grammar.to_path_buf());
        Ok(Box::new(MockDecoder {
            state: Arc::clone(&self.state),
        }))
    }
}

#[allow(clippy::unwrap_used)]
impl Decoder for MockDecoder {
    fn init_grammar(&mut self, grammar: &Path) -> Result<()> {
        if self.state.fail_grammar.load(Ordering::SeqCst) {
            return Err(RecogError::engine("mock grammar reinit failure"));
        }
        let mut last = self.state.last_grammar.lock().unwrap();
        *last = Some(grammar.to_path_buf());
        Ok(())
    }

    fn start_utterance(&mut self) -> Result<()> {
        if self.state.fail_start.load(Ordering::SeqCst) {
            return Err(RecogError::engine("mock start-utterance failure"));
        }
        self.state.utterances_started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn feed(&mut self, _samples: &[i16]) -> Result<()> {
        if self.state.fail_feed.load(Ordering::SeqCst) {
            return Err(RecogError::engine("mock feed failure"));
        }
        self.state.feeds.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn hypothesis(&self) -> Option<Hypothesis> {
        self.state.hypothesis_polls.fetch_add(1, Ordering::SeqCst);
        self.state.hypothesis.lock().unwrap().clone()
    }

    fn end_utterance(&mut self) -> Result<()> {
        self.state.utterances_ended.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_decoder_counts_calls() {
        let factory = MockDecoderFactory::new();
        let handle = factory.handle();
        let mut decoder = factory.create_decoder(Path::new("test.gram")).unwrap();

        decoder.start_utterance().unwrap();
        decoder.feed(&[0; 80]).unwrap();
        decoder.feed(&[0; 80]).unwrap();
        decoder.end_utterance().unwrap();

        assert_eq!(handle.utterances_started(), 1);
        assert_eq!(handle.feed_count(), 2);
        assert_eq!(handle.utterances_ended(), 1);
        assert_eq!(handle.last_grammar(), Some(PathBuf::from("test.gram")));
    }

    #[test]
    fn test_mock_decoder_scripted_hypothesis() {
        let factory = MockDecoderFactory::new();
        let handle = factory.handle();
        let decoder = factory.create_decoder(Path::new("test.gram")).unwrap();

        assert_eq!(decoder.hypothesis(), None);
        handle.set_hypothesis("open the door", -1200);
        let hyp = decoder.hypothesis().unwrap();
        assert_eq!(hyp.text, "open the door");
        assert_eq!(hyp.score, -1200);
    }

    #[test]
    fn test_mock_decoder_failure_injection() {
        let factory = MockDecoderFactory::new();
        let handle = factory.handle();

        handle.fail_create(true);
        assert!(factory.create_decoder(Path::new("g.gram")).is_err());
        handle.fail_create(false);

        let mut decoder = factory.create_decoder(Path::new("g.gram")).unwrap();
        handle.fail_start(true);
        assert!(decoder.start_utterance().is_err());
        handle.fail_feed(true);
        assert!(decoder.feed(&[0; 80]).is_err());
        handle.fail_grammar(true);
        assert!(decoder.init_grammar(Path::new("h.gram")).is_err());
    }
}
