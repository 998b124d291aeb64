//! Waveform styles, the CPU renderer, and the parallel frame driver.

pub mod backend;
pub mod pipeline;
pub mod style;
pub mod waveform;
