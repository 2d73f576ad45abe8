//! Voice activity detection for recognizer channels.
//!
//! Classifies each media frame as activity or silence using a mean
//! absolute amplitude threshold, then runs duration hysteresis so one
//! noisy frame neither starts nor ends an utterance. Purely frame-driven:
//! no wall clock, no I/O, so identical frame sequences with identical
//! configuration always produce identical event sequences.

use crate::config::DetectorConfig;

/// Internal detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorState {
    /// Silence; counting toward the no-input timeout.
    Inactivity,
    /// Activity observed; waiting for it to sustain.
    ActivityTransition,
    /// Speech confirmed.
    Activity,
    /// Silence observed during speech; waiting for it to sustain.
    InactivityTransition,
}

/// Events emitted by the activity detector, one per processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorEvent {
    /// No state change of interest.
    None,
    /// Start of voice activity confirmed.
    Activity,
    /// End of voice activity confirmed.
    Inactivity,
    /// No activity observed within the no-input timeout.
    NoInput,
}

/// Activity detector state machine.
#[derive(Debug)]
pub struct ActivityDetector {
    config: DetectorConfig,
    state: DetectorState,
    /// Time accumulated in the current state, in milliseconds.
    duration_ms: u64,
}

impl ActivityDetector {
    /// Creates a detector with the given configuration.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            state: DetectorState::Inactivity,
            duration_ms: 0,
        }
    }

    /// Processes one frame of samples and returns the detector event.
    pub fn process(&mut self, samples: &[i16]) -> DetectorEvent {
        let level = mean_abs_level(samples);
        let active = level >= self.config.level_threshold;
        let frame_time = self.config.frame_time_ms;

        match self.state {
            DetectorState::Inactivity => {
                if active {
                    self.change_state(DetectorState::ActivityTransition);
                } else {
                    self.duration_ms += frame_time;
                    if self.duration_ms >= self.config.noinput_timeout_ms {
                        self.duration_ms = 0;
                        return DetectorEvent::NoInput;
                    }
                }
                DetectorEvent::None
            }
            DetectorState::ActivityTransition => {
                if active {
                    self.duration_ms += frame_time;
                    if self.duration_ms >= self.config.speech_confirm_ms {
                        self.change_state(DetectorState::Activity);
                        return DetectorEvent::Activity;
                    }
                } else {
                    self.change_state(DetectorState::Inactivity);
                }
                DetectorEvent::None
            }
            DetectorState::Activity => {
                if !active {
                    self.change_state(DetectorState::InactivityTransition);
                }
                DetectorEvent::None
            }
            DetectorState::InactivityTransition => {
                if active {
                    self.change_state(DetectorState::Activity);
                } else {
                    self.duration_ms += frame_time;
                    if self.duration_ms >= self.config.silence_confirm_ms {
                        self.change_state(DetectorState::Inactivity);
                        return DetectorEvent::Inactivity;
                    }
                }
                DetectorEvent::None
            }
        }
    }

    /// Resets all accumulated state. Must be called at the start of every
    /// new utterance.
    pub fn reset(&mut self) {
        self.state = DetectorState::Inactivity;
        self.duration_ms = 0;
    }

    /// Updates the activity level threshold without resetting state.
    pub fn set_level_threshold(&mut self, threshold: u32) {
        self.config.level_threshold = threshold;
    }

    fn change_state(&mut self, state: DetectorState) {
        self.state = state;
        self.duration_ms = 0;
    }
}

/// Mean absolute sample amplitude of a frame.
fn mean_abs_level(samples: &[i16]) -> u32 {
    if samples.is_empty() {
        return 0;
    }
    let sum: u64 = samples
        .iter()
        .map(|&sample| (sample as i32).unsigned_abs() as u64)
        .sum();
    (sum / samples.len() as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> DetectorConfig {
        DetectorConfig {
            level_threshold: 50,
            speech_confirm_ms: 20,
            silence_confirm_ms: 20,
            noinput_timeout_ms: 50,
            frame_time_ms: 10,
        }
    }

    fn speech() -> Vec<i16> {
        vec![3000; 80]
    }

    fn silence() -> Vec<i16> {
        vec![0; 80]
    }

    #[test]
    fn test_level_silence_is_zero() {
        assert_eq!(mean_abs_level(&silence()), 0);
    }

    #[test]
    fn test_level_handles_negative_and_min_samples() {
        assert_eq!(mean_abs_level(&[-3000; 80]), 3000);
        assert_eq!(mean_abs_level(&[i16::MIN; 4]), 32768);
    }

    #[test]
    fn test_level_empty_frame_is_zero() {
        assert_eq!(mean_abs_level(&[]), 0);
    }

    #[test]
    fn test_activity_confirmed_after_sustained_speech() {
        let mut detector = ActivityDetector::new(test_config());
        // First active frame only enters the transition state.
        assert_eq!(detector.process(&speech()), DetectorEvent::None);
        assert_eq!(detector.process(&speech()), DetectorEvent::None);
        // 20ms of sustained activity confirms speech.
        assert_eq!(detector.process(&speech()), DetectorEvent::Activity);
        // Further speech is uneventful.
        assert_eq!(detector.process(&speech()), DetectorEvent::None);
    }

    #[test]
    fn test_spurious_activity_is_discarded() {
        let mut detector = ActivityDetector::new(test_config());
        assert_eq!(detector.process(&speech()), DetectorEvent::None);
        // Silence before confirmation drops back to inactivity.
        assert_eq!(detector.process(&silence()), DetectorEvent::None);
        for _ in 0..2 {
            assert_eq!(detector.process(&speech()), DetectorEvent::None);
        }
        assert_eq!(detector.process(&speech()), DetectorEvent::Activity);
    }

    #[test]
    fn test_inactivity_confirmed_after_sustained_silence() {
        let mut detector = ActivityDetector::new(test_config());
        detector.process(&speech());
        detector.process(&speech());
        assert_eq!(detector.process(&speech()), DetectorEvent::Activity);

        // One silent frame enters the transition; brief silence does not
        // end the utterance.
        assert_eq!(detector.process(&silence()), DetectorEvent::None);
        assert_eq!(detector.process(&speech()), DetectorEvent::None);

        assert_eq!(detector.process(&silence()), DetectorEvent::None);
        assert_eq!(detector.process(&silence()), DetectorEvent::None);
        assert_eq!(detector.process(&silence()), DetectorEvent::Inactivity);
    }

    #[test]
    fn test_noinput_fires_after_timeout() {
        let mut detector = ActivityDetector::new(test_config());
        for _ in 0..4 {
            assert_eq!(detector.process(&silence()), DetectorEvent::None);
        }
        // 50ms of leading silence reaches the no-input timeout.
        assert_eq!(detector.process(&silence()), DetectorEvent::NoInput);
    }

    #[test]
    fn test_reset_restarts_noinput_counting() {
        let mut detector = ActivityDetector::new(test_config());
        for _ in 0..4 {
            detector.process(&silence());
        }
        detector.reset();
        for _ in 0..4 {
            assert_eq!(detector.process(&silence()), DetectorEvent::None);
        }
        assert_eq!(detector.process(&silence()), DetectorEvent::NoInput);
    }

    #[test]
    fn test_deterministic_event_sequence() {
        let frames: Vec<Vec<i16>> = vec![
            silence(),
            speech(),
            speech(),
            speech(),
            silence(),
            silence(),
            silence(),
        ];
        let run = |frames: &[Vec<i16>]| -> Vec<DetectorEvent> {
            let mut detector = ActivityDetector::new(test_config());
            frames.iter().map(|f| detector.process(f)).collect()
        };
        assert_eq!(run(&frames), run(&frames));
    }

    #[test]
    fn test_threshold_update_applies_to_next_frame() {
        let mut detector = ActivityDetector::new(test_config());
        let quiet = vec![40i16; 80];
        assert_eq!(detector.process(&quiet), DetectorEvent::None);
        detector.set_level_threshold(30);
        assert_eq!(detector.process(&quiet), DetectorEvent::None);
        assert_eq!(detector.process(&quiet), DetectorEvent::None);
        assert_eq!(detector.process(&quiet), DetectorEvent::Activity);
    }
}
