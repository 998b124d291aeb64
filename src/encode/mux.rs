use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::encode::ffmpeg::{ToolPaths, ensure_parent_dir, run_tool, tool_command};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::pipeline::cancel::Watchdog;

/// Audio codec of the final container. The video codec is always H.264.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Aac,
    Mp3,
    Opus,
}

impl AudioCodec {
    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            AudioCodec::Aac => "aac",
            AudioCodec::Mp3 => "mp3",
            AudioCodec::Opus => "opus",
        }
    }

    /// ffmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            AudioCodec::Aac => "aac",
            AudioCodec::Mp3 => "libmp3lame",
            AudioCodec::Opus => "libopus",
        }
    }

    /// Map a download-format name (`aac`, `mp3`, `webm`) or codec name to a codec.
    pub fn from_download_format(format: &str) -> PipelineResult<Self> {
        match format.trim().to_ascii_lowercase().as_str() {
            "aac" | "m4a" => Ok(AudioCodec::Aac),
            "mp3" => Ok(AudioCodec::Mp3),
            "webm" | "opus" => Ok(AudioCodec::Opus),
            other => Err(PipelineError::validation(format!(
                "unsupported audio format '{other}' (expected aac, mp3 or webm)"
            ))),
        }
    }
}

impl std::str::FromStr for AudioCodec {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_download_format(s)
    }
}

impl std::fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw interleaved `f32le` PCM file fed to the muxer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioInput {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Binds a composited video stream to an audio track in an MP4 container.
#[derive(Clone, Debug)]
pub struct Muxer {
    tools: ToolPaths,
    audio_bitrate: String,
}

impl Muxer {
    pub fn new(tools: ToolPaths, audio_bitrate: impl Into<String>) -> Self {
        Self {
            tools,
            audio_bitrate: audio_bitrate.into(),
        }
    }

    /// ffmpeg arguments for one mux, excluding the global quiet flags.
    pub(crate) fn args(
        &self,
        video: &Path,
        audio: &AudioInput,
        codec: AudioCodec,
        out_path: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), video.into()];
        args.extend(
            [
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
            ]
            .map(OsString::from),
        );
        args.push("-i".into());
        args.push(audio.path.clone().into());
        args.extend(
            [
                "-map",
                "0:v:0",
                "-map",
                "1:a:0",
                "-c:v",
                "copy",
                "-c:a",
                codec.ffmpeg_encoder(),
                "-b:a",
                &self.audio_bitrate,
            ]
            .map(OsString::from),
        );
        if codec == AudioCodec::Opus {
            // Opus in MP4 is still gated behind this flag on older ffmpeg builds.
            args.extend(["-strict", "experimental"].map(OsString::from));
        }
        args.extend(["-shortest", "-movflags", "+faststart"].map(OsString::from));
        args.push(out_path.into());
        args
    }

    /// Mux `video` with `audio` into `out_path`.
    #[tracing::instrument(skip(self, audio, watchdog), fields(codec = %codec))]
    pub fn mux(
        &self,
        video: &Path,
        audio: &AudioInput,
        codec: AudioCodec,
        out_path: &Path,
        watchdog: &Watchdog,
    ) -> PipelineResult<()> {
        ensure_parent_dir(out_path)?;
        let mut cmd = tool_command(&self.tools.ffmpeg);
        cmd.args(self.args(video, audio, codec, out_path));
        run_tool(cmd, &self.tools.ffmpeg, watchdog)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mux.rs"]
mod tests;
