use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::decode::prepare_background_png;
use crate::assets::text::{TextStyle, render_text_layer};
use crate::composition::model::BackgroundSpec;
use crate::encode::ffmpeg::{ToolPaths, ensure_parent_dir, run_tool, tool_command};
use crate::encode::sequence::VideoClip;
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::PipelineResult;
use crate::pipeline::cancel::Watchdog;

/// Background resolved to something ffmpeg can read at the run's canvas size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackgroundLayer {
    /// Generated by ffmpeg's `color` source.
    Solid(Rgb8),
    /// PNG already scaled to the canvas.
    Image(PathBuf),
}

/// Resolve `spec` into a layer, writing a canvas-sized PNG into `dir` for images.
///
/// Opacity is accepted for every background kind but currently has no effect.
pub fn prepare_background(
    spec: &BackgroundSpec,
    opacity: f32,
    canvas: Canvas,
    dir: &Path,
) -> PipelineResult<BackgroundLayer> {
    if opacity < 1.0 {
        tracing::debug!(opacity, "background opacity is not applied");
    }
    match spec {
        BackgroundSpec::SolidColor(color) => Ok(BackgroundLayer::Solid(*color)),
        BackgroundSpec::StillImage(source) => {
            let dest = dir.join("background.png");
            prepare_background_png(source, canvas, &dest)?;
            Ok(BackgroundLayer::Image(dest))
        }
    }
}

/// Rasterize `text` into `dir/text.png`. Returns `None` when there is no text.
pub fn prepare_text_layer(
    text: Option<&str>,
    style: &TextStyle,
    canvas: Canvas,
    dir: &Path,
) -> PipelineResult<Option<PathBuf>> {
    let Some(text) = text else {
        return Ok(None);
    };
    let layer = render_text_layer(text, style, canvas)?;
    let dest = dir.join("text.png");
    layer
        .to_straight_image()?
        .save_with_format(&dest, image::ImageFormat::Png)
        .with_context(|| format!("write text layer '{}'", dest.display()))?;
    Ok(Some(dest))
}

/// Layers background, waveform frames, and optional text into one H.264 stream.
#[derive(Clone, Debug)]
pub struct Compositor {
    tools: ToolPaths,
    crf: u8,
    preset: String,
}

impl Compositor {
    pub fn new(tools: ToolPaths, crf: u8, preset: impl Into<String>) -> Self {
        Self {
            tools,
            crf,
            preset: preset.into(),
        }
    }

    pub(crate) fn args(
        &self,
        clip: &VideoClip,
        background: &BackgroundLayer,
        text: Option<&Path>,
        out_path: &Path,
    ) -> Vec<OsString> {
        let rate = clip.fps.ffmpeg_rate();
        let mut args: Vec<OsString> = vec!["-y".into()];

        match background {
            BackgroundLayer::Solid(color) => {
                args.extend(["-f", "lavfi", "-i"].map(OsString::from));
                args.push(
                    format!(
                        "color=c={}:s={}:r={rate}",
                        color.to_ffmpeg(),
                        clip.canvas.ffmpeg_size()
                    )
                    .into(),
                );
            }
            BackgroundLayer::Image(path) => {
                args.extend(["-loop", "1", "-framerate", &rate, "-i"].map(OsString::from));
                args.push(path.into());
            }
        }

        args.extend(["-framerate", &rate, "-start_number", "0", "-i"].map(OsString::from));
        args.push(clip.pattern().into());

        let mut graph = String::from("[0:v][1:v]overlay=0:0:format=auto[wave]");
        let mut last = "wave";
        if let Some(text) = text {
            args.extend(["-loop", "1", "-framerate", &rate, "-i"].map(OsString::from));
            args.push(text.into());
            graph.push_str(";[wave][2:v]overlay=0:0:format=auto[titled]");
            last = "titled";
        }
        graph.push_str(&format!(";[{last}]format=yuv420p[vout]"));

        args.extend(
            [
                "-filter_complex",
                &graph,
                "-map",
                "[vout]",
                "-frames:v",
                &clip.frame_count.to_string(),
                "-r",
                &rate,
                "-c:v",
                "libx264",
                "-preset",
                &self.preset,
                "-crf",
                &self.crf.to_string(),
                "-pix_fmt",
                "yuv420p",
                "-an",
                "-movflags",
                "+faststart",
            ]
            .map(OsString::from),
        );
        args.push(out_path.into());
        args
    }

    /// Composite `clip` over `background` (and under `text`) into `out_path`.
    #[tracing::instrument(skip_all, fields(frames = clip.frame_count))]
    pub fn composite(
        &self,
        clip: &VideoClip,
        background: &BackgroundLayer,
        text: Option<&Path>,
        out_path: &Path,
        watchdog: &Watchdog,
    ) -> PipelineResult<()> {
        ensure_parent_dir(out_path)?;
        let mut cmd = tool_command(&self.tools.ffmpeg);
        cmd.args(self.args(clip, background, text, out_path));
        run_tool(cmd, &self.tools.ffmpeg, watchdog)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/compositor.rs"]
mod tests;
