use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig, check_next_frame};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::render::backend::RasterFrame;

/// `printf`-style file name of each frame image, as understood by ffmpeg's image2 demuxer.
pub const FRAME_FILE_PATTERN: &str = "frame_%06d.png";

/// A finished, video-only frame sequence on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoClip {
    /// Directory holding the frame images.
    pub dir: PathBuf,
    /// Number of frames, numbered from 0.
    pub frame_count: u64,
    /// Playback rate.
    pub fps: Fps,
    /// Size shared by every frame.
    pub canvas: Canvas,
}

impl VideoClip {
    /// `frame_count / fps`.
    pub fn duration_sec(&self) -> f64 {
        self.fps.frames_to_secs(self.frame_count)
    }

    /// ffmpeg input pattern matching every frame.
    pub fn pattern(&self) -> PathBuf {
        self.dir.join(FRAME_FILE_PATTERN)
    }

    /// Path of frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        frame_path(&self.dir, idx)
    }
}

fn frame_path(dir: &Path, idx: FrameIndex) -> PathBuf {
    dir.join(format!("frame_{:06}.png", idx.0))
}

/// Writes each frame as a straight-alpha PNG and yields a [`VideoClip`].
///
/// Frames are released as soon as they are written. Chunks are encoded in parallel.
#[derive(Debug)]
pub struct PngSequenceEncoder {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    written: u64,
    clip: Option<VideoClip>,
}

impl PngSequenceEncoder {
    /// Encoder writing into `dir`, which is created if missing.
    pub fn new(dir: impl Into<PathBuf>) -> PipelineResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create frame directory '{}'", dir.display()))?;
        Ok(Self {
            dir,
            cfg: None,
            written: 0,
            clip: None,
        })
    }

    /// Encode an in-order frame sequence in one call. The first frame fixes the canvas size.
    pub fn encode_all(
        dir: impl Into<PathBuf>,
        fps: Fps,
        frames: Vec<RasterFrame>,
    ) -> PipelineResult<VideoClip> {
        let first = frames
            .first()
            .ok_or_else(|| PipelineError::encode("frame sequence is empty"))?;
        let cfg = SinkConfig {
            canvas: first.canvas(),
            fps,
            frame_count: frames.len() as u64,
        };
        let mut enc = Self::new(dir)?;
        enc.begin(cfg)?;
        enc.push_chunk(FrameIndex(0), frames)?;
        enc.end()?;
        enc.into_clip()
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.written
    }

    /// The finished clip. Fails unless `end` succeeded.
    pub fn into_clip(self) -> PipelineResult<VideoClip> {
        self.clip
            .ok_or_else(|| PipelineError::encode("frame sequence was not finished"))
    }
}

fn write_png(dir: &Path, idx: FrameIndex, frame: &RasterFrame) -> PipelineResult<()> {
    let path = frame_path(dir, idx);
    frame
        .to_straight_image()?
        .save_with_format(&path, image::ImageFormat::Png)
        .with_context(|| format!("write frame '{}'", path.display()))?;
    Ok(())
}

impl FrameSink for PngSequenceEncoder {
    fn begin(&mut self, cfg: SinkConfig) -> PipelineResult<()> {
        cfg.canvas.validate()?;
        cfg.fps.validate()?;
        self.cfg = Some(cfg);
        self.written = 0;
        self.clip = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: RasterFrame) -> PipelineResult<()> {
        check_next_frame(self.cfg.as_ref(), self.written, idx, &frame)?;
        write_png(&self.dir, idx, &frame)?;
        self.written += 1;
        Ok(())
    }

    fn push_chunk(&mut self, first: FrameIndex, frames: Vec<RasterFrame>) -> PipelineResult<()> {
        for (offset, frame) in frames.iter().enumerate() {
            check_next_frame(
                self.cfg.as_ref(),
                self.written + offset as u64,
                FrameIndex(first.0 + offset as u64),
                frame,
            )?;
        }
        let count = frames.len() as u64;
        let dir = self.dir.as_path();
        frames
            .into_par_iter()
            .enumerate()
            .try_for_each(|(offset, frame)| {
                write_png(dir, FrameIndex(first.0 + offset as u64), &frame)
            })?;
        self.written += count;
        Ok(())
    }

    fn end(&mut self) -> PipelineResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| PipelineError::encode("frame sequence was never started"))?;
        if self.written == 0 {
            return Err(PipelineError::encode("frame sequence is empty"));
        }
        if self.written != cfg.frame_count {
            return Err(PipelineError::encode(format!(
                "expected {} frames, received {}",
                cfg.frame_count, self.written
            )));
        }
        tracing::debug!(frames = self.written, dir = %self.dir.display(), "frame sequence written");
        self.clip = Some(VideoClip {
            dir: self.dir.clone(),
            frame_count: self.written,
            fps: cfg.fps,
            canvas: cfg.canvas,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sequence.rs"]
mod tests;
