use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::assets::media::MIX_SAMPLE_RATE;
use crate::assets::text::TextStyle;
use crate::encode::ffmpeg::ToolPaths;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::render::pipeline::RenderThreading;
use crate::render::style::StyleParams;

/// Settings shared by every run, loaded once by the caller and passed into `generate`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Gain applied to the secondary (background) audio track before the merge.
    pub background_gain_db: f32,
    /// Sample rate every track is decoded to before mixing.
    pub mix_sample_rate: u32,
    /// Channel count every track is decoded to before mixing.
    pub mix_channels: u16,
    pub style: StyleParams,
    pub text: TextStyle,
    pub threading: RenderThreading,
    /// Wall-clock budget of one run; `None` disables the timeout.
    pub timeout_secs: Option<f64>,
    #[serde(flatten)]
    pub tools: ToolPaths,
    /// Parent of per-run scratch directories; defaults to the system temp dir.
    pub temp_root: Option<PathBuf>,
    pub audio_bitrate: String,
    /// x264 constant rate factor (0-51).
    pub video_crf: u8,
    pub video_preset: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            background_gain_db: -20.0,
            mix_sample_rate: MIX_SAMPLE_RATE,
            mix_channels: 2,
            style: StyleParams::default(),
            text: TextStyle::default(),
            threading: RenderThreading::default(),
            timeout_secs: None,
            tools: ToolPaths::default(),
            temp_root: None,
            audio_bitrate: "192k".to_owned(),
            video_crf: 18,
            video_preset: "medium".to_owned(),
        }
    }
}

impl RunConfig {
    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read run config '{}'", path.display()))?;
        let cfg: RunConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse run config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.canvas.validate()?;
        self.fps.validate()?;
        self.style.validate()?;
        self.text.validate()?;
        if !self.background_gain_db.is_finite() {
            return Err(PipelineError::validation("background_gain_db must be finite"));
        }
        if self.mix_sample_rate == 0 || self.mix_channels == 0 {
            return Err(PipelineError::validation(
                "mix sample rate and channel count must be > 0",
            ));
        }
        if let Some(t) = self.timeout_secs
            && (t <= 0.0 || Duration::try_from_secs_f64(t).is_err())
        {
            return Err(PipelineError::validation(
                "timeout_secs must be > 0 and representable as a duration",
            ));
        }
        if self.video_crf > 51 {
            return Err(PipelineError::validation("video_crf must be in 0..=51"));
        }
        if self.audio_bitrate.trim().is_empty() || self.video_preset.trim().is_empty() {
            return Err(PipelineError::validation(
                "audio_bitrate and video_preset must be non-empty",
            ));
        }
        Ok(())
    }

    /// Wall-clock budget as a [`Duration`]. Values a `Duration` cannot hold count as no budget.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .and_then(|t| Duration::try_from_secs_f64(t).ok())
    }

    /// Directory that receives per-run scratch directories.
    pub fn temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }
}
