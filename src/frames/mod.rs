//! Mapping from waveform samples to per-frame sample windows.

pub mod sampler;
