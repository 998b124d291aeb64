use std::path::Path;
use std::sync::Arc;

use crate::assets::media::{AudioPcm, DecodeOpts, decode_audio_f32};
use crate::encode::ffmpeg::ToolPaths;
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::pipeline::cancel::Watchdog;

/// Decoded mono audio used to drive the visualization.
///
/// Immutable once built; samples are shared so render workers can read them without copying.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl Waveform {
    /// Build from mono samples. Empty input or a zero rate is a decode error.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> PipelineResult<Self> {
        if sample_rate == 0 {
            return Err(PipelineError::decode("waveform sample rate must be > 0"));
        }
        if samples.is_empty() {
            return Err(PipelineError::decode("waveform has zero samples"));
        }
        Ok(Self {
            samples: samples.into(),
            sample_rate,
        })
    }

    /// Downmix interleaved PCM to mono by the arithmetic mean across channels.
    pub fn from_pcm(pcm: &AudioPcm) -> PipelineResult<Self> {
        let ch = usize::from(pcm.channels);
        if ch == 0 {
            return Err(PipelineError::decode("pcm has zero channels"));
        }
        let mono = if ch == 1 {
            pcm.interleaved_f32.clone()
        } else {
            pcm.interleaved_f32
                .chunks_exact(ch)
                .map(|frame| frame.iter().sum::<f32>() / ch as f32)
                .collect()
        };
        Self::new(mono, pcm.sample_rate)
    }

    /// Mono samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of mono samples.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds (`sample_count / sample_rate`).
    pub fn duration_sec(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }
}

/// Decode an encoded audio asset into a mono [`Waveform`] at its native sample rate.
#[tracing::instrument(skip(tools, watchdog))]
pub fn decode_waveform(
    tools: &ToolPaths,
    path: &Path,
    watchdog: &Watchdog,
) -> PipelineResult<Waveform> {
    let pcm = decode_audio_f32(tools, path, DecodeOpts::default(), watchdog)?;
    Waveform::from_pcm(&pcm)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/waveform.rs"]
mod tests;
