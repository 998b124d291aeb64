use std::path::Path;

use crate::encode::ffmpeg::{ToolPaths, run_tool, tool_command};
use crate::foundation::error::{MuxError, PipelineError, PipelineResult};
use crate::pipeline::cancel::Watchdog;

/// Default audio mixing sample rate used across decode/mix/encode.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Audio containers accepted as pipeline input (lowercase extensions).
pub const ACCEPTED_AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "webm", "ogg", "aac", "m4a", "flac"];

/// Return `true` when `path` has an accepted audio extension (case-insensitive).
pub fn is_accepted_audio(path: &Path) -> bool {
    has_extension_in(path, ACCEPTED_AUDIO_EXTENSIONS)
}

pub(crate) fn has_extension_in(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| allowed.contains(&e.as_str()))
}

#[derive(Clone, Debug, PartialEq)]
/// Basic metadata about a source audio file.
pub struct AudioSourceInfo {
    /// Native sample rate in Hz.
    pub sample_rate: u32,
    /// Native channel count.
    pub channels: u16,
    /// Container-reported duration, when known.
    pub duration_sec: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
/// Decoded interleaved floating-point PCM.
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Silent buffer of `frames` sample frames.
    pub fn silence(sample_rate: u32, channels: u16, frames: usize) -> Self {
        Self {
            sample_rate,
            channels,
            interleaved_f32: vec![0.0; frames * usize::from(channels)],
        }
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    /// Duration in seconds.
    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Output format requested from the decoder. `None` keeps the source's native value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOpts {
    /// Resample to this rate.
    pub sample_rate: Option<u32>,
    /// Up/down-mix to this channel count.
    pub channels: Option<u16>,
}

/// Probe source audio metadata through `ffprobe`.
pub fn probe_audio(
    tools: &ToolPaths,
    source_path: &Path,
    watchdog: &Watchdog,
) -> PipelineResult<AudioSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        sample_rate: Option<String>,
        channels: Option<u16>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let mut cmd = std::process::Command::new(&tools.ffprobe);
    cmd.args([
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_streams",
        "-show_format",
    ])
    .arg(source_path);
    let out = run_tool(cmd, &tools.ffprobe, watchdog)
        .map_err(|e| as_decode_error(e, source_path))?;

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| PipelineError::decode(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .ok_or_else(|| {
            PipelineError::decode(format!(
                "no audio stream found in '{}'",
                source_path.display()
            ))
        })?;
    let sample_rate = stream
        .sample_rate
        .as_deref()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&r| r > 0)
        .ok_or_else(|| PipelineError::decode("missing audio sample rate from ffprobe"))?;
    let channels = stream
        .channels
        .filter(|&c| c > 0)
        .ok_or_else(|| PipelineError::decode("missing audio channel count from ffprobe"))?;
    let duration_sec = stream
        .duration
        .as_deref()
        .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|s| s.parse::<f64>().ok());

    Ok(AudioSourceInfo {
        sample_rate,
        channels,
        duration_sec,
    })
}

/// Decode audio from a media source to interleaved `f32` PCM.
///
/// Zero decoded samples is a [`PipelineError::Decode`].
#[tracing::instrument(skip(tools, watchdog))]
pub fn decode_audio_f32(
    tools: &ToolPaths,
    path: &Path,
    opts: DecodeOpts,
    watchdog: &Watchdog,
) -> PipelineResult<AudioPcm> {
    let (sample_rate, channels) = match (opts.sample_rate, opts.channels) {
        (Some(r), Some(c)) => (r, c),
        (r, c) => {
            let info = probe_audio(tools, path, watchdog)?;
            (r.unwrap_or(info.sample_rate), c.unwrap_or(info.channels))
        }
    };
    if sample_rate == 0 || channels == 0 {
        return Err(PipelineError::validation(
            "decode sample rate and channel count must be non-zero",
        ));
    }

    let mut cmd = tool_command(&tools.ffmpeg);
    cmd.arg("-i")
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &channels.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ]);
    let out = run_tool(cmd, &tools.ffmpeg, watchdog).map_err(|e| as_decode_error(e, path))?;

    let pcm = AudioPcm {
        sample_rate,
        channels,
        interleaved_f32: f32le_bytes_to_samples(&out.stdout)?,
    };
    if pcm.frames() == 0 {
        return Err(PipelineError::decode(format!(
            "'{}' decoded to zero samples",
            path.display()
        )));
    }
    tracing::debug!(
        frames = pcm.frames(),
        sample_rate,
        channels,
        "decoded audio source"
    );
    Ok(pcm)
}

pub(crate) fn f32le_bytes_to_samples(bytes: &[u8]) -> PipelineResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(PipelineError::decode(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn as_decode_error(err: PipelineError, path: &Path) -> PipelineError {
    match err {
        PipelineError::Mux(MuxError::Failed { stderr, .. }) => PipelineError::decode(format!(
            "could not decode audio '{}': {stderr}",
            path.display()
        )),
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
