use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::render::backend::RasterFrame;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Size every pushed frame must have.
    pub canvas: Canvas,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Number of frames the renderer will push.
    pub frame_count: u64,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: frames arrive in strictly increasing `FrameIndex` order starting at 0.
/// Sinks take ownership of each frame and release it once written.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> PipelineResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: RasterFrame) -> PipelineResult<()>;
    /// Push a run of consecutive frames starting at `first`.
    fn push_chunk(&mut self, first: FrameIndex, frames: Vec<RasterFrame>) -> PipelineResult<()> {
        for (offset, frame) in frames.into_iter().enumerate() {
            self.push_frame(FrameIndex(first.0 + offset as u64), frame)?;
        }
        Ok(())
    }
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> PipelineResult<()>;
}

/// Check that `idx` is the next expected index and `frame` matches the configured canvas.
pub(crate) fn check_next_frame(
    cfg: Option<&SinkConfig>,
    expected: u64,
    idx: FrameIndex,
    frame: &RasterFrame,
) -> PipelineResult<()> {
    let cfg = cfg.ok_or_else(|| PipelineError::encode("frame pushed before begin"))?;
    if idx.0 != expected {
        return Err(PipelineError::encode(format!(
            "frame {} arrived out of order (expected {expected})",
            idx.0
        )));
    }
    if frame.canvas() != cfg.canvas {
        return Err(PipelineError::encode(format!(
            "frame {} is {}x{}, sequence is {}x{}",
            idx.0, frame.width, frame.height, cfg.canvas.width, cfg.canvas.height
        )));
    }
    Ok(())
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    pub(crate) frames: Vec<(FrameIndex, RasterFrame)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in timeline order.
    pub fn frames(&self) -> &[(FrameIndex, RasterFrame)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> PipelineResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: RasterFrame) -> PipelineResult<()> {
        check_next_frame(self.cfg.as_ref(), self.frames.len() as u64, idx, &frame)?;
        self.frames.push((idx, frame));
        Ok(())
    }

    fn end(&mut self) -> PipelineResult<()> {
        Ok(())
    }
}
