use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::media::{AudioPcm, DecodeOpts, decode_audio_f32, is_accepted_audio};
use crate::audio::mix::{change_speed, overlay_merge, write_pcm_to_f32le_file};
use crate::audio::waveform::Waveform;
use crate::composition::compositor::{Compositor, prepare_background, prepare_text_layer};
use crate::composition::model::CompositionSpec;
use crate::encode::ffmpeg::{ensure_parent_dir, require_tool};
use crate::encode::mux::{AudioCodec, AudioInput, Muxer};
use crate::encode::sequence::{PngSequenceEncoder, VideoClip};
use crate::encode::sink::FrameSink;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{PipelineError, PipelineResult, Stage};
use crate::frames::sampler::FrameSampler;
use crate::pipeline::cancel::{CancelToken, Watchdog};
use crate::pipeline::config::RunConfig;
use crate::pipeline::workspace::{RunWorkspace, unique_token};
use crate::render::pipeline::render_to_sink;
use crate::render::waveform::WaveformRenderer;

/// Lifecycle of one [`PipelineRun`]. `Failed` is reachable from every non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunState {
    Validated,
    Decoding,
    Sampling,
    Rendering,
    Encoding,
    Compositing,
    Muxing,
    Done,
    Failed,
}

impl RunState {
    pub fn name(self) -> &'static str {
        match self {
            RunState::Validated => "validated",
            RunState::Decoding => "decoding",
            RunState::Sampling => "sampling",
            RunState::Rendering => "rendering",
            RunState::Encoding => "encoding",
            RunState::Compositing => "compositing",
            RunState::Muxing => "muxing",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }

    /// Error stage for a failure in this state. Terminal states have none.
    pub fn stage(self) -> Option<Stage> {
        match self {
            RunState::Validated => Some(Stage::Validated),
            RunState::Decoding => Some(Stage::Decoding),
            RunState::Sampling => Some(Stage::Sampling),
            RunState::Rendering => Some(Stage::Rendering),
            RunState::Encoding => Some(Stage::Encoding),
            RunState::Compositing => Some(Stage::Compositing),
            RunState::Muxing => Some(Stage::Muxing),
            RunState::Done | RunState::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Facts about a finished output file.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OutputDescriptor {
    pub path: PathBuf,
    /// Video duration (`frame_count / fps`); the audio track is cut to match.
    pub duration_sec: f64,
    pub canvas: Canvas,
    pub fps: Fps,
    pub frame_count: u64,
    pub audio_codec: AudioCodec,
}

/// Fresh file name of the form `waveform_video_<unique>.mp4`.
pub fn output_file_name() -> String {
    format!("waveform_video_{}.mp4", unique_token())
}

/// Generate a waveform video with the default [`RunConfig`].
///
/// `audio_paths` holds the primary (foreground) track and an optional secondary track that is
/// mixed underneath it. An explicit `background_image` replaces `spec.background`.
pub fn generate<P: AsRef<Path>>(
    spec: &CompositionSpec,
    audio_paths: &[P],
    background_image: Option<&Path>,
    output_path: &Path,
) -> PipelineResult<OutputDescriptor> {
    generate_with(
        spec,
        audio_paths,
        background_image,
        output_path,
        &RunConfig::default(),
        &CancelToken::new(),
    )
}

/// [`generate`] with explicit settings and a cancellation token.
pub fn generate_with<P: AsRef<Path>>(
    spec: &CompositionSpec,
    audio_paths: &[P],
    background_image: Option<&Path>,
    output_path: &Path,
    config: &RunConfig,
    cancel: &CancelToken,
) -> PipelineResult<OutputDescriptor> {
    let audio: Vec<&Path> = audio_paths.iter().map(AsRef::as_ref).collect();
    let run = PipelineRun::new(spec, &audio, background_image, output_path, config, cancel)?;
    run.execute()
}

/// One end-to-end generation. Owns the run workspace, which is removed when the run ends.
#[derive(Debug)]
pub struct PipelineRun<'a> {
    spec: CompositionSpec,
    config: &'a RunConfig,
    primary: PathBuf,
    secondary: Option<PathBuf>,
    output_path: PathBuf,
    state: RunState,
    watchdog: Watchdog,
    workspace: RunWorkspace,
}

impl<'a> PipelineRun<'a> {
    /// Validate inputs and allocate the run workspace.
    pub fn new(
        spec: &CompositionSpec,
        audio_paths: &[&Path],
        background_image: Option<&Path>,
        output_path: &Path,
        config: &'a RunConfig,
        cancel: &CancelToken,
    ) -> PipelineResult<Self> {
        let (spec, primary, secondary) =
            validate_inputs(spec, audio_paths, background_image, output_path, config)
                .map_err(|e| e.at(Stage::Validated))?;
        let workspace =
            RunWorkspace::create(&config.temp_root()).map_err(|e| e.at(Stage::Validated))?;

        let run = Self {
            spec,
            config,
            primary,
            secondary,
            output_path: output_path.to_path_buf(),
            state: RunState::Validated,
            watchdog: Watchdog::new(cancel.clone(), config.timeout()),
            workspace,
        };
        tracing::info!(
            run = run.id(),
            style = %run.spec.style,
            sources = 1 + usize::from(run.secondary.is_some()),
            "pipeline run validated"
        );
        Ok(run)
    }

    pub fn id(&self) -> &str {
        self.workspace.id()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Drive the run to `Done` or `Failed`. The workspace is removed before this returns.
    pub fn execute(mut self) -> PipelineResult<OutputDescriptor> {
        match self.drive() {
            Ok(out) => {
                self.enter(RunState::Done);
                tracing::info!(
                    run = self.id(),
                    path = %out.path.display(),
                    frames = out.frame_count,
                    duration_sec = out.duration_sec,
                    elapsed_ms = self.watchdog.elapsed().as_millis() as u64,
                    "pipeline run finished"
                );
                drop(self);
                Ok(out)
            }
            Err(e) => {
                let e = match self.state.stage() {
                    Some(stage) => e.at(stage),
                    None => e,
                };
                tracing::warn!(run = self.id(), from = %self.state, "pipeline run failed: {e}");
                self.enter(RunState::Failed);
                drop(self);
                Err(e)
            }
        }
    }

    fn enter(&mut self, next: RunState) {
        tracing::info!(run = self.id(), from = %self.state, to = %next, "run state");
        self.state = next;
    }

    fn drive(&mut self) -> PipelineResult<OutputDescriptor> {
        let cfg = self.config;
        require_tool(&cfg.tools.ffmpeg)?;

        self.enter(RunState::Decoding);
        let (waveform, audio) = self.decode_and_mix()?;

        self.enter(RunState::Sampling);
        self.watchdog.check()?;
        let sampler = FrameSampler::new(&waveform, waveform.duration_sec(), cfg.fps)?;
        tracing::debug!(
            run = self.id(),
            frames = sampler.frame_count(),
            samples_per_frame = sampler.samples_per_frame(),
            scale = sampler.scale(),
            "sampled waveform"
        );

        self.enter(RunState::Rendering);
        let renderer = WaveformRenderer::new(
            cfg.canvas,
            self.spec.style,
            self.spec.waveform_color,
            cfg.style.clone(),
        )?;
        let mut encoder = PngSequenceEncoder::new(self.workspace.frames_dir())?;
        render_to_sink(
            &renderer,
            &waveform,
            &sampler,
            cfg.fps,
            &cfg.threading,
            &mut encoder,
            &self.watchdog,
        )?;
        drop(waveform);

        self.enter(RunState::Encoding);
        encoder.end()?;
        let clip = encoder.into_clip()?;

        self.enter(RunState::Compositing);
        let composited = self.composite(&clip)?;

        self.enter(RunState::Muxing);
        let muxed = self.workspace.file("final.mp4");
        Muxer::new(cfg.tools.clone(), cfg.audio_bitrate.clone()).mux(
            &composited,
            &audio,
            self.spec.audio_codec,
            &muxed,
            &self.watchdog,
        )?;
        self.watchdog.check()?;
        publish(&muxed, &self.output_path)?;

        Ok(OutputDescriptor {
            path: self.output_path.clone(),
            duration_sec: clip.duration_sec(),
            canvas: clip.canvas,
            fps: clip.fps,
            frame_count: clip.frame_count,
            audio_codec: self.spec.audio_codec,
        })
    }

    /// Decode, merge, and speed-adjust the audio; write it as raw PCM and fold it to mono.
    fn decode_and_mix(&self) -> PipelineResult<(Waveform, AudioInput)> {
        let cfg = self.config;
        let opts = DecodeOpts {
            sample_rate: Some(cfg.mix_sample_rate),
            channels: Some(cfg.mix_channels),
        };
        let decode = |path: &Path| decode_audio_f32(&cfg.tools, path, opts, &self.watchdog);

        let primary = decode(&self.primary)?;
        let merged: AudioPcm = match &self.secondary {
            Some(path) => {
                let secondary = decode(path)?;
                let merged = overlay_merge(&primary, &secondary, cfg.background_gain_db)?;
                tracing::debug!(
                    run = self.id(),
                    primary_sec = primary.duration_sec(),
                    secondary_sec = secondary.duration_sec(),
                    merged_sec = merged.duration_sec(),
                    "merged audio sources"
                );
                merged
            }
            None => primary,
        };
        let adjusted = change_speed(&merged, self.spec.playback_speed)?;
        drop(merged);

        let audio = AudioInput {
            path: self.workspace.file("audio.f32le"),
            sample_rate: adjusted.sample_rate,
            channels: adjusted.channels,
        };
        write_pcm_to_f32le_file(&adjusted.interleaved_f32, &audio.path)?;
        let waveform = Waveform::from_pcm(&adjusted)?;
        Ok((waveform, audio))
    }

    fn composite(&self, clip: &VideoClip) -> PipelineResult<PathBuf> {
        let cfg = self.config;
        let dir = self.workspace.path();
        let background = prepare_background(
            &self.spec.background,
            self.spec.background_opacity,
            clip.canvas,
            dir,
        )?;
        let text = prepare_text_layer(self.spec.text(), &cfg.text, clip.canvas, dir)?;

        let out = self.workspace.file("composited.mp4");
        Compositor::new(cfg.tools.clone(), cfg.video_crf, cfg.video_preset.clone()).composite(
            clip,
            &background,
            text.as_deref(),
            &out,
            &self.watchdog,
        )?;

        // Frames are no longer needed once they are inside the composited stream.
        if let Err(e) = std::fs::remove_dir_all(&clip.dir) {
            tracing::warn!(run = self.id(), "failed to release frame images early: {e}");
        }
        Ok(out)
    }
}

type ValidatedInputs = (CompositionSpec, PathBuf, Option<PathBuf>);

fn validate_inputs(
    spec: &CompositionSpec,
    audio_paths: &[&Path],
    background_image: Option<&Path>,
    output_path: &Path,
    config: &RunConfig,
) -> PipelineResult<ValidatedInputs> {
    config.validate()?;
    let spec = CompositionSpec {
        background: spec.resolved_background(background_image),
        ..spec.clone()
    };
    spec.validate()?;

    let (primary, secondary) = match audio_paths {
        [primary] => (primary.to_path_buf(), None),
        [primary, secondary] => (primary.to_path_buf(), Some(secondary.to_path_buf())),
        other => {
            return Err(PipelineError::validation(format!(
                "expected one or two audio sources, got {}",
                other.len()
            )));
        }
    };
    for path in std::iter::once(&primary).chain(secondary.as_ref()) {
        if !is_accepted_audio(path) {
            return Err(PipelineError::validation(format!(
                "audio '{}' is not one of the accepted containers",
                path.display()
            )));
        }
    }
    if output_path.as_os_str().is_empty() {
        return Err(PipelineError::validation("output path must not be empty"));
    }
    Ok((spec, primary, secondary))
}

/// Move the finished file into place, falling back to copy across filesystems.
fn publish(from: &Path, to: &Path) -> PipelineResult<()> {
    ensure_parent_dir(to)?;
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    if let Err(e) = std::fs::copy(from, to) {
        let _ = std::fs::remove_file(to);
        return Err(PipelineError::Other(anyhow::Error::new(e).context(format!(
            "copy output video to '{}'",
            to.display()
        ))));
    }
    std::fs::remove_file(from).with_context(|| format!("remove '{}'", from.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
