//! Speech-to-text decoder boundary.

pub mod decoder;

pub use decoder::{Decoder, DecoderFactory, Hypothesis, MockDecoderFactory, MockHandle};
