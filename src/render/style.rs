use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::foundation::error::{PipelineError, PipelineResult};

/// Waveform visualization algorithm.
///
/// Parsing never fails: names that do not match a variant select [`RenderStyle::Lines`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderStyle {
    /// Mirrored vertical bars, stride-sampled.
    Bars,
    /// Symmetric polyline envelope.
    #[default]
    Lines,
    /// Single ring sized by RMS amplitude.
    Circles,
    /// Bars with their own bar count.
    FrequencyBars,
    /// Envelope drawn with quadratic curves through sample midpoints.
    SmoothLines,
}

impl RenderStyle {
    /// All styles, in declaration order.
    pub const ALL: [RenderStyle; 5] = [
        RenderStyle::Bars,
        RenderStyle::Lines,
        RenderStyle::Circles,
        RenderStyle::FrequencyBars,
        RenderStyle::SmoothLines,
    ];

    /// Exact match on the kebab-case name.
    pub fn parse_exact(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Resolve a style name, falling back to [`RenderStyle::Lines`] for anything unrecognized.
    pub fn from_name(name: &str) -> Self {
        Self::parse_exact(name).unwrap_or_else(|| {
            tracing::warn!(style = name, "unknown waveform style, falling back to lines");
            RenderStyle::Lines
        })
    }

    /// Stable kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            RenderStyle::Bars => "bars",
            RenderStyle::Lines => "lines",
            RenderStyle::Circles => "circles",
            RenderStyle::FrequencyBars => "frequency-bars",
            RenderStyle::SmoothLines => "smooth-lines",
        }
    }
}

impl std::fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for RenderStyle {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl Serialize for RenderStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for RenderStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Aesthetic tuning constants shared by all styles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleParams {
    /// Gain applied to normalized amplitude before mapping to pixels.
    pub amplitude_multiplier: f32,
    /// Bars drawn by [`RenderStyle::Bars`].
    pub bar_count: u32,
    /// Bars drawn by [`RenderStyle::FrequencyBars`].
    pub frequency_bar_count: u32,
    /// Fraction of each bar slot that is filled.
    pub bar_fill_ratio: f32,
    /// Stroke width of line styles, in pixels.
    pub line_width: f32,
    /// Stroke width of the ring, in pixels.
    pub ring_width: f32,
    /// Ring radius at full-scale RMS, as a fraction of `min(width, height)`.
    pub ring_radius_ratio: f32,
}

impl Default for StyleParams {
    fn default() -> Self {
        Self {
            amplitude_multiplier: 1.5,
            bar_count: 100,
            frequency_bar_count: 100,
            bar_fill_ratio: 0.8,
            line_width: 2.0,
            ring_width: 3.0,
            ring_radius_ratio: 0.25,
        }
    }
}

impl StyleParams {
    pub(crate) fn validate(&self) -> PipelineResult<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.amplitude_multiplier) {
            return Err(PipelineError::validation(
                "amplitude_multiplier must be finite and > 0",
            ));
        }
        if self.bar_count == 0 || self.frequency_bar_count == 0 {
            return Err(PipelineError::validation("bar counts must be > 0"));
        }
        if !positive(self.bar_fill_ratio) || self.bar_fill_ratio > 1.0 {
            return Err(PipelineError::validation("bar_fill_ratio must be in (0, 1]"));
        }
        if !positive(self.line_width) || !positive(self.ring_width) {
            return Err(PipelineError::validation("stroke widths must be finite and > 0"));
        }
        if !positive(self.ring_radius_ratio) {
            return Err(PipelineError::validation(
                "ring_radius_ratio must be finite and > 0",
            ));
        }
        Ok(())
    }
}
