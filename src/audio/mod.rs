//! Audio decoding into a mono waveform, plus the mixing helpers used before muxing.

pub mod mix;
pub mod waveform;
