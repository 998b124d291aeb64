//! Frame sinks and the external `ffmpeg` stages.

/// External tool lookup and invocation.
pub mod ffmpeg;
/// Final audio/video mux.
pub mod mux;
/// PNG frame sequence writer.
pub mod sequence;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
