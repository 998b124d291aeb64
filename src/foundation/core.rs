use crate::foundation::error::{PipelineError, PipelineResult};

/// Absolute 0-based frame index in the output timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> PipelineResult<Self> {
        if den == 0 {
            return Err(PipelineError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(PipelineError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Integer frame rate.
    pub fn whole(num: u32) -> PipelineResult<Self> {
        Self::new(num, 1)
    }

    /// Validate an already-constructed value (e.g. one loaded through serde).
    pub fn validate(self) -> PipelineResult<()> {
        Self::new(self.num, self.den).map(|_| ())
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        // Guard the floor against representation error (10.0 * 24 must give 240, not 239).
        (secs * self.as_f64() + 1e-9).floor().max(0.0) as u64
    }

    /// Number of audio samples covered by one frame, rounded to nearest.
    pub fn samples_per_frame(self, sample_rate: u32) -> u64 {
        let num = u128::from(sample_rate) * u128::from(self.den);
        let den = u128::from(self.num);
        ((num + den / 2) / den) as u64
    }

    /// `num/den` string accepted by ffmpeg rate options.
    pub fn ffmpeg_rate(self) -> String {
        format!("{}/{}", self.num, self.den)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 24, den: 1 }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas; both sides must be non-zero, even and fit in `u16`.
    pub fn new(width: u32, height: u32) -> PipelineResult<Self> {
        let c = Self { width, height };
        c.validate()?;
        Ok(c)
    }

    /// Check the constraints imposed by the rasterizer and the yuv420p encoder.
    pub fn validate(self) -> PipelineResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::validation("canvas width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(PipelineError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(PipelineError::validation("canvas dimensions exceed u16"));
        }
        Ok(())
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// `WxH` string accepted by ffmpeg size options.
    pub fn ffmpeg_size(self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Opaque 8-bit sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// `#RRGGBB` form.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// `0xRRGGBB` form used by ffmpeg color options.
    pub fn to_ffmpeg(self) -> String {
        format!("0x{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
