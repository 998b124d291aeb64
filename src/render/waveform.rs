use vello_cpu::kurbo::{BezPath, Circle, Point, Rect, Shape, Stroke};

use crate::audio::waveform::Waveform;
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::frames::sampler::FrameWindow;
use crate::render::backend::RasterFrame;
use crate::render::style::{RenderStyle, StyleParams};

const CIRCLE_TOLERANCE: f64 = 0.1;

/// Raster context and target reused across frames by one worker.
#[derive(Default)]
pub struct RenderScratch {
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: Option<vello_cpu::Pixmap>,
}

impl std::fmt::Debug for RenderScratch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderScratch")
            .field("has_ctx", &self.ctx.is_some())
            .field("has_pixmap", &self.pixmap.is_some())
            .finish()
    }
}

/// CPU waveform renderer for one run's style, color, and canvas.
///
/// Holds no per-frame state; workers share it and bring their own [`RenderScratch`].
#[derive(Clone, Debug)]
pub struct WaveformRenderer {
    canvas: Canvas,
    width: u16,
    height: u16,
    style: RenderStyle,
    color: Rgb8,
    params: StyleParams,
}

impl WaveformRenderer {
    pub fn new(
        canvas: Canvas,
        style: RenderStyle,
        color: Rgb8,
        params: StyleParams,
    ) -> PipelineResult<Self> {
        canvas.validate()?;
        params.validate()?;
        let width = u16::try_from(canvas.width)
            .map_err(|_| PipelineError::validation("canvas width exceeds u16"))?;
        let height = u16::try_from(canvas.height)
            .map_err(|_| PipelineError::validation("canvas height exceeds u16"))?;
        Ok(Self {
            canvas,
            width,
            height,
            style,
            color,
            params,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn style(&self) -> RenderStyle {
        self.style
    }

    /// Render `window` of `waveform` onto a transparent frame.
    ///
    /// Windows with no samples, or only zero-valued ones, yield a blank frame.
    pub fn render(&self, window: &FrameWindow, waveform: &Waveform) -> PipelineResult<RasterFrame> {
        self.render_with(&mut RenderScratch::default(), window, waveform)
    }

    /// [`render`](Self::render) reusing the context and pixmap held in `scratch`.
    pub fn render_with(
        &self,
        scratch: &mut RenderScratch,
        window: &FrameWindow,
        waveform: &Waveform,
    ) -> PipelineResult<RasterFrame> {
        let samples = window.samples(waveform);
        let scale = if window.scale > 0.0 { window.scale } else { 1.0 };
        if samples.iter().all(|s| *s == 0.0) {
            return Ok(RasterFrame::transparent(self.canvas));
        }

        let mut ctx = match scratch.ctx.take() {
            Some(ctx) if ctx.width() == self.width && ctx.height() == self.height => ctx,
            _ => vello_cpu::RenderContext::new(self.width, self.height),
        };
        ctx.reset();
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            self.color.r,
            self.color.g,
            self.color.b,
            255,
        ));

        let drew = match self.style {
            RenderStyle::Bars => self.draw_bars(&mut ctx, samples, scale, self.params.bar_count),
            RenderStyle::FrequencyBars => {
                self.draw_bars(&mut ctx, samples, scale, self.params.frequency_bar_count)
            }
            RenderStyle::Lines => self.draw_envelope(&mut ctx, samples, scale, false),
            RenderStyle::SmoothLines => self.draw_envelope(&mut ctx, samples, scale, true),
            RenderStyle::Circles => self.draw_ring(&mut ctx, samples, scale),
        };
        if !drew {
            scratch.ctx = Some(ctx);
            return Ok(RasterFrame::transparent(self.canvas));
        }

        let mut pixmap = match scratch.pixmap.take() {
            Some(p) if p.width() == self.width && p.height() == self.height => p,
            _ => vello_cpu::Pixmap::new(self.width, self.height),
        };
        pixmap.data_as_u8_slice_mut().fill(0);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        let data = pixmap.data_as_u8_slice().to_vec();
        scratch.ctx = Some(ctx);
        scratch.pixmap = Some(pixmap);
        RasterFrame::from_premul(self.canvas, data)
    }

    fn center_y(&self) -> f64 {
        f64::from(self.canvas.height) / 2.0
    }

    /// Normalized amplitude in pixels from the vertical center, capped at half the height.
    fn extent(&self, sample: f32, scale: f32) -> f64 {
        let a = f64::from((sample / scale).abs()) * f64::from(self.params.amplitude_multiplier);
        (a * self.center_y()).min(self.center_y())
    }

    fn draw_bars(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        samples: &[f32],
        scale: f32,
        bar_count: u32,
    ) -> bool {
        let n = bar_count as usize;
        let slot = f64::from(self.canvas.width) / n as f64;
        let bar_w = slot * f64::from(self.params.bar_fill_ratio);
        let inset = (slot - bar_w) / 2.0;
        let cy = self.center_y();

        let mut drew = false;
        for j in 0..n {
            let h = self.extent(samples[stride_index(j, n, samples.len())], scale);
            if h <= 0.0 {
                continue;
            }
            let x0 = (j as f64) * slot + inset;
            ctx.fill_rect(&Rect::new(x0, cy - h, x0 + bar_w, cy + h));
            drew = true;
        }
        drew
    }

    fn draw_envelope(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        samples: &[f32],
        scale: f32,
        smooth: bool,
    ) -> bool {
        let w = f64::from(self.canvas.width);
        let cy = self.center_y();
        let step = if samples.len() > 1 {
            w / (samples.len() - 1) as f64
        } else {
            0.0
        };
        let x_at = |i: usize| {
            if samples.len() > 1 {
                i as f64 * step
            } else {
                w / 2.0
            }
        };

        let mut above = Vec::with_capacity(samples.len());
        let mut below = Vec::with_capacity(samples.len());
        for (i, s) in samples.iter().enumerate() {
            let h = self.extent(*s, scale);
            above.push(Point::new(x_at(i), cy - h));
            below.push(Point::new(x_at(i), cy + h));
        }

        ctx.set_stroke(Stroke::new(f64::from(self.params.line_width)));
        for points in [&above, &below] {
            let path = if smooth {
                smooth_path(points)
            } else {
                polyline_path(points)
            };
            ctx.stroke_path(&path);
        }
        true
    }

    fn draw_ring(&self, ctx: &mut vello_cpu::RenderContext, samples: &[f32], scale: f32) -> bool {
        let mean_sq = samples
            .iter()
            .map(|s| {
                let a = f64::from(s / scale);
                a * a
            })
            .sum::<f64>()
            / samples.len() as f64;
        let rms = mean_sq.sqrt();
        let min_side = f64::from(self.canvas.width.min(self.canvas.height));
        let radius = rms
            * min_side
            * f64::from(self.params.ring_radius_ratio)
            * f64::from(self.params.amplitude_multiplier);
        if radius.is_nan() || radius <= 0.0 {
            return false;
        }

        let center = Point::new(f64::from(self.canvas.width) / 2.0, self.center_y());
        ctx.set_stroke(Stroke::new(f64::from(self.params.ring_width)));
        ctx.stroke_path(&Circle::new(center, radius).to_path(CIRCLE_TOLERANCE));
        true
    }
}

/// Index of the `j`-th of `n` evenly spaced representatives over `len` samples.
fn stride_index(j: usize, n: usize, len: usize) -> usize {
    if n <= 1 || len <= 1 {
        return 0;
    }
    (j * (len - 1)) / (n - 1)
}

fn polyline_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    if rest.is_empty() {
        // A single sample still shows up as a dot.
        path.line_to(Point::new(first.x + 0.5, first.y));
    }
    for p in rest {
        path.line_to(*p);
    }
    path
}

fn smooth_path(points: &[Point]) -> BezPath {
    if points.len() < 3 {
        return polyline_path(points);
    }
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for pair in points[1..].windows(2) {
        path.quad_to(pair[0], pair[0].midpoint(pair[1]));
    }
    path.line_to(points[points.len() - 1]);
    path
}

#[cfg(test)]
#[path = "../../tests/unit/render/waveform.rs"]
mod tests;
