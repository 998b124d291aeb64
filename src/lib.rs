//! Wavecast renders an audio track into a waveform-visualization video.
//!
//! The pipeline runs strictly in stage order for one [`PipelineRun`]:
//!
//! - decode (and optionally merge and speed-adjust) the audio into a mono [`Waveform`]
//! - split it into per-frame windows with one global normalization scale ([`FrameSampler`])
//! - render each window with a [`RenderStyle`] ([`WaveformRenderer`], rayon-parallel)
//! - write the frames as an image sequence ([`PngSequenceEncoder`])
//! - composite background, waveform, and text with `ffmpeg` ([`Compositor`])
//! - mux the composited stream with the audio into the final file ([`Muxer`])
//!
//! [`generate`] is the one-call entry point. `ffmpeg` must be installed; its absence is reported
//! as [`MuxError::EncoderNotFound`].
#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
pub mod audio;
pub mod composition;
pub mod encode;
pub mod frames;
pub mod pipeline;
pub mod render;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgb8};
pub use crate::foundation::error::{MuxError, PipelineError, PipelineResult, Stage};

pub use crate::assets::text::TextStyle;
pub use crate::audio::waveform::{Waveform, decode_waveform};
pub use crate::composition::compositor::{BackgroundLayer, Compositor};
pub use crate::composition::model::{BackgroundSpec, CompositionSpec};
pub use crate::encode::ffmpeg::ToolPaths;
pub use crate::encode::mux::{AudioCodec, Muxer};
pub use crate::encode::sequence::{PngSequenceEncoder, VideoClip};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::frames::sampler::{FrameSampler, FrameWindow};
pub use crate::pipeline::cancel::{CancelToken, Watchdog};
pub use crate::pipeline::config::RunConfig;
pub use crate::pipeline::run::{
    OutputDescriptor, PipelineRun, RunState, generate, generate_with, output_file_name,
};
pub use crate::render::backend::RasterFrame;
pub use crate::render::pipeline::{RenderThreading, render_preview_frame};
pub use crate::render::style::{RenderStyle, StyleParams};
pub use crate::render::waveform::{RenderScratch, WaveformRenderer};
