//! Default configuration constants for recogchan.
//!
//! This module provides shared constants used across configuration types
//! to ensure consistency and eliminate duplication.

/// Duration of one decoded media frame in milliseconds.
///
/// The media transport delivers fixed-size frames at this cadence; every
/// application-level timer in the channel advances in these increments
/// rather than by wall clock, which keeps frame processing deterministic.
pub const FRAME_TIME_MS: u64 = 10;

/// Default audio sample rate in Hz.
///
/// Telephony channels run at 8kHz narrowband; the decoder models are
/// matched to this rate.
pub const SAMPLE_RATE: u32 = 8000;

/// Samples per frame at the default sample rate and frame time.
pub const FRAME_SAMPLES: usize = (SAMPLE_RATE as usize / 1000) * FRAME_TIME_MS as usize;

/// Default no-input timeout in milliseconds.
///
/// If no voice activity is observed for this long after RECOGNIZE, the
/// recognition completes with cause `no-input-timeout`.
pub const NOINPUT_TIMEOUT_MS: u64 = 5000;

/// Default overall recognition timeout in milliseconds.
///
/// Upper bound on one utterance; reaching it completes the recognition
/// with cause `recognition-timeout` regardless of detector state.
pub const RECOGNITION_TIMEOUT_MS: u64 = 15000;

/// Default interval between partial-result polls in milliseconds.
///
/// While a recognition is in progress the ingress path asks the decoder
/// for an interim hypothesis this often. Partial results are pulled, not
/// pushed; they only refresh the channel's last-result cache.
pub const PARTIAL_RESULT_TIMEOUT_MS: u64 = 100;

/// Default activity detector level threshold.
///
/// Mean absolute sample amplitude above which a frame counts as voice
/// activity. Tuned for 16-bit PCM telephony input.
pub const DETECTOR_LEVEL_THRESHOLD: u32 = 50;

/// Default duration of sustained activity before speech is confirmed
/// (milliseconds).
pub const SPEECH_CONFIRM_MS: u64 = 300;

/// Default duration of sustained silence before end of speech is
/// confirmed (milliseconds).
pub const SILENCE_CONFIRM_MS: u64 = 300;

/// Content type of the NLSML recognition result document.
pub const NLSML_CONTENT_TYPE: &str = "application/x-nlsml";

/// Marker that must appear in a DEFINE-GRAMMAR content type for the
/// grammar format to be accepted. Only JSGF grammars are supported.
pub const SUPPORTED_GRAMMAR_MARKER: &str = "jsgf";

/// Confidence reported in result documents.
///
/// Decoder scores are log-domain and model-dependent; the channel reports
/// a fixed confidence and logs the raw score instead of mapping it.
pub const RESULT_CONFIDENCE: u32 = 99;
