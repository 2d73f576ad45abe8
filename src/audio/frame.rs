//! Media frame type delivered by the transport at a fixed cadence.

use crate::defaults;

/// One decoded audio frame of 16-bit PCM samples.
///
/// The transport collaborator delivers exactly one frame per frame-time
/// tick; all channel timers advance by the configured frame time per
/// delivered frame, never by wall clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    /// PCM samples (16-bit signed integers).
    pub samples: Vec<i16>,
}

impl AudioFrame {
    /// Creates a frame from raw samples.
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    /// A full frame of digital silence at the default cadence.
    pub fn silence() -> Self {
        Self {
            samples: vec![0; defaults::FRAME_SAMPLES],
        }
    }

    /// A full frame of constant amplitude, handy for driving the detector
    /// in tests.
    pub fn tone(amplitude: i16) -> Self {
        Self {
            samples: vec![amplitude; defaults::FRAME_SAMPLES],
        }
    }
}
