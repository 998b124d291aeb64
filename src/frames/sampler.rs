use std::iter::FusedIterator;
use std::ops::Range;

use crate::audio::waveform::Waveform;
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{PipelineError, PipelineResult};

/// Per-run mapping from frame indices to sample windows.
///
/// Holds only counts and the shared normalization scale, so it is cheap to copy into render
/// workers. Window iteration is restartable via [`FrameSampler::windows`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSampler {
    sample_count: usize,
    samples_per_frame: usize,
    frame_count: u64,
    scale: f32,
}

impl FrameSampler {
    /// Plan windows for `target_duration_sec` of video at `fps` over `waveform`.
    ///
    /// `target_duration_sec` may differ from the waveform's own duration. Windows past the end of
    /// the buffer come back empty rather than reading out of bounds.
    pub fn new(waveform: &Waveform, target_duration_sec: f64, fps: Fps) -> PipelineResult<Self> {
        fps.validate()?;
        if !target_duration_sec.is_finite() || target_duration_sec <= 0.0 {
            return Err(PipelineError::validation(
                "target duration must be finite and > 0",
            ));
        }
        let samples_per_frame = usize::try_from(fps.samples_per_frame(waveform.sample_rate()))
            .map_err(|_| PipelineError::validation("samples per frame overflow"))?;
        if samples_per_frame == 0 {
            return Err(PipelineError::validation(format!(
                "sample rate {} Hz is too low for {} fps",
                waveform.sample_rate(),
                fps.as_f64()
            )));
        }

        let peak = waveform.peak();
        let scale = if peak > 0.0 && peak.is_finite() { peak } else { 1.0 };

        Ok(Self {
            sample_count: waveform.sample_count(),
            samples_per_frame,
            frame_count: fps.secs_to_frames_floor(target_duration_sec),
            scale,
        })
    }

    /// `floor(target_duration * fps)`.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// `round(sample_rate / fps)`.
    pub fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    /// Global normalization scale: peak absolute amplitude, or `1` for silence.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Window for frame `index`, or `None` past `frame_count`.
    pub fn window(&self, index: FrameIndex) -> Option<FrameWindow> {
        if index.0 >= self.frame_count {
            return None;
        }
        let start = usize::try_from(index.0)
            .ok()
            .and_then(|i| i.checked_mul(self.samples_per_frame))
            .map_or(self.sample_count, |s| s.min(self.sample_count));
        let end = start
            .saturating_add(self.samples_per_frame)
            .min(self.sample_count);
        Some(FrameWindow {
            index,
            start,
            end,
            scale: self.scale,
        })
    }

    /// Iterate every window in frame order.
    pub fn windows(&self) -> FrameWindows {
        FrameWindows {
            sampler: *self,
            next: 0,
        }
    }
}

/// One frame's slice of the waveform plus the run-wide normalization scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameWindow {
    /// 0-based frame index.
    pub index: FrameIndex,
    /// First sample (inclusive).
    pub start: usize,
    /// Last sample (exclusive), never past the waveform's sample count.
    pub end: usize,
    /// Shared normalization scale.
    pub scale: f32,
}

impl FrameWindow {
    /// Sample index range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of samples covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// `true` when the window covers no samples.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Borrow this window's samples from `waveform`.
    pub fn samples<'a>(&self, waveform: &'a Waveform) -> &'a [f32] {
        waveform.samples().get(self.range()).unwrap_or(&[])
    }
}

/// Iterator over [`FrameWindow`]s in frame order.
#[derive(Clone, Debug)]
pub struct FrameWindows {
    sampler: FrameSampler,
    next: u64,
}

impl Iterator for FrameWindows {
    type Item = FrameWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let w = self.sampler.window(FrameIndex(self.next))?;
        self.next += 1;
        Some(w)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.sampler.frame_count.saturating_sub(self.next))
            .unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

impl ExactSizeIterator for FrameWindows {}
impl FusedIterator for FrameWindows {}

#[cfg(test)]
#[path = "../../tests/unit/frames/sampler.rs"]
mod tests;
