//! Audio-side building blocks: media frames and voice activity detection.

pub mod detector;
pub mod frame;

pub use detector::{ActivityDetector, DetectorEvent};
pub use frame::AudioFrame;
