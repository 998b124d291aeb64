use rayon::prelude::*;

use crate::audio::waveform::Waveform;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::frames::sampler::{FrameSampler, FrameWindow};
use crate::pipeline::cancel::Watchdog;
use crate::render::backend::RasterFrame;
use crate::render::waveform::{RenderScratch, WaveformRenderer};

/// Worker pool and chunking options for frame rendering.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Render frames on a rayon pool.
    pub parallel: bool,
    /// Frames rendered per batch; cancellation is checked between batches.
    pub chunk_size: usize,
    /// Pool size; `None` uses one thread per core.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 48,
            threads: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_total: u64,
    /// Frames that came out fully transparent (silent or empty windows).
    pub frames_blank: u64,
}

/// Render every window of `sampler` and push the frames, in index order, into `sink`.
///
/// Calls `begin` on the sink but leaves `end` to the caller.
#[tracing::instrument(skip_all, fields(frames = sampler.frame_count(), style = %renderer.style()))]
pub fn render_to_sink(
    renderer: &WaveformRenderer,
    waveform: &Waveform,
    sampler: &FrameSampler,
    fps: Fps,
    threading: &RenderThreading,
    sink: &mut dyn FrameSink,
    watchdog: &Watchdog,
) -> PipelineResult<RenderStats> {
    sink.begin(SinkConfig {
        canvas: renderer.canvas(),
        fps,
        frame_count: sampler.frame_count(),
    })?;

    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };

    let mut stats = RenderStats::default();
    let mut scratch = RenderScratch::default();
    let mut windows = sampler.windows();
    loop {
        watchdog.check()?;
        let chunk: Vec<FrameWindow> = windows.by_ref().take(chunk_size).collect();
        let Some(first) = chunk.first().map(|w| w.index) else {
            break;
        };

        let frames = match &pool {
            Some(pool) => render_chunk_parallel(renderer, waveform, &chunk, pool)?,
            None => chunk
                .iter()
                .map(|w| renderer.render_with(&mut scratch, w, waveform))
                .collect::<PipelineResult<Vec<_>>>()?,
        };

        stats.frames_total += frames.len() as u64;
        stats.frames_blank += frames.iter().filter(|f| f.is_fully_transparent()).count() as u64;
        sink.push_chunk(first, frames)?;
    }

    tracing::debug!(
        frames = stats.frames_total,
        blank = stats.frames_blank,
        "rendered waveform frames"
    );
    Ok(stats)
}

/// Render a single frame without touching any encoder.
pub fn render_preview_frame(
    renderer: &WaveformRenderer,
    waveform: &Waveform,
    sampler: &FrameSampler,
    index: FrameIndex,
) -> PipelineResult<RasterFrame> {
    let window = sampler.window(index).ok_or_else(|| {
        PipelineError::validation(format!(
            "frame {} is out of range (frame count {})",
            index.0,
            sampler.frame_count()
        ))
    })?;
    renderer.render(&window, waveform)
}

fn render_chunk_parallel(
    renderer: &WaveformRenderer,
    waveform: &Waveform,
    chunk: &[FrameWindow],
    pool: &rayon::ThreadPool,
) -> PipelineResult<Vec<RasterFrame>> {
    // Indexed collect keeps frame order regardless of completion order.
    pool.install(|| {
        chunk
            .par_iter()
            .map_init(RenderScratch::default, |scratch, window| {
                renderer.render_with(scratch, window, waveform)
            })
            .collect::<PipelineResult<Vec<_>>>()
    })
}

fn build_thread_pool(threads: Option<usize>) -> PipelineResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PipelineError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        PipelineError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
