use std::path::{Path, PathBuf};

use crate::assets::decode::is_accepted_image;
use crate::encode::mux::AudioCodec;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::render::style::RenderStyle;

/// Slowest accepted playback speed multiplier.
pub const MIN_PLAYBACK_SPEED: f64 = 0.1;
/// Fastest accepted playback speed multiplier.
pub const MAX_PLAYBACK_SPEED: f64 = 5.0;

/// Bottom layer of the composited video.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BackgroundSpec {
    /// Flat fill.
    SolidColor(Rgb8),
    /// Still image scaled to fill the canvas.
    StillImage(PathBuf),
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        BackgroundSpec::SolidColor(Rgb8::BLACK)
    }
}

/// Parameters of one generation run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositionSpec {
    pub style: RenderStyle,
    pub waveform_color: Rgb8,
    pub background: BackgroundSpec,
    /// Accepted in `[0, 1]` but not applied to the background (see the compositor).
    pub background_opacity: f32,
    /// Audio (and therefore video) speed multiplier.
    pub playback_speed: f64,
    /// Text drawn near the top. Blank text is treated as absent.
    pub text_overlay: Option<String>,
    pub audio_codec: AudioCodec,
}

impl Default for CompositionSpec {
    fn default() -> Self {
        Self {
            style: RenderStyle::default(),
            waveform_color: Rgb8::WHITE,
            background: BackgroundSpec::default(),
            background_opacity: 1.0,
            playback_speed: 1.0,
            text_overlay: None,
            audio_codec: AudioCodec::default(),
        }
    }
}

impl CompositionSpec {
    /// Reject values the pipeline cannot honour.
    pub fn validate(&self) -> PipelineResult<()> {
        if !self.background_opacity.is_finite() || !(0.0..=1.0).contains(&self.background_opacity)
        {
            return Err(PipelineError::validation(format!(
                "background opacity {} is outside [0, 1]",
                self.background_opacity
            )));
        }
        if !self.playback_speed.is_finite()
            || !(MIN_PLAYBACK_SPEED..=MAX_PLAYBACK_SPEED).contains(&self.playback_speed)
        {
            return Err(PipelineError::validation(format!(
                "playback speed {} is outside [{MIN_PLAYBACK_SPEED}, {MAX_PLAYBACK_SPEED}]",
                self.playback_speed
            )));
        }
        if let BackgroundSpec::StillImage(path) = &self.background
            && !is_accepted_image(path)
        {
            return Err(PipelineError::validation(format!(
                "background image '{}' is not a png, jpg, jpeg or gif",
                path.display()
            )));
        }
        Ok(())
    }

    /// Overlay text, if any non-blank text was given.
    pub fn text(&self) -> Option<&str> {
        self.text_overlay
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Background after applying an explicitly supplied image path, which wins over `background`.
    pub fn resolved_background(&self, image: Option<&Path>) -> BackgroundSpec {
        match image {
            Some(path) => BackgroundSpec::StillImage(path.to_path_buf()),
            None => self.background.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
