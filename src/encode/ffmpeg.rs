use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::foundation::error::{MuxError, PipelineError, PipelineResult};
use crate::pipeline::cancel::Watchdog;

/// Locations of the external `ffmpeg` / `ffprobe` binaries.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    /// Encoder/decoder binary.
    pub ffmpeg: PathBuf,
    /// Stream probe binary.
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// Captured output of a finished tool invocation.
#[derive(Debug, Default)]
pub(crate) struct ToolOutput {
    pub(crate) stdout: Vec<u8>,
}

/// Return `true` when `bin -version` can be invoked.
pub fn is_tool_on_path(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Fail with [`MuxError::EncoderNotFound`] when `bin` cannot be invoked.
pub fn require_tool(bin: &Path) -> PipelineResult<()> {
    if is_tool_on_path(bin) {
        Ok(())
    } else {
        Err(MuxError::EncoderNotFound {
            binary: bin.display().to_string(),
        }
        .into())
    }
}

pub(crate) fn spawn_error(bin: &Path, e: std::io::Error) -> PipelineError {
    if e.kind() == std::io::ErrorKind::NotFound {
        MuxError::EncoderNotFound {
            binary: bin.display().to_string(),
        }
        .into()
    } else {
        MuxError::Io {
            binary: bin.display().to_string(),
            source: e,
        }
        .into()
    }
}

/// Build a quiet, non-interactive command for `bin`.
pub(crate) fn tool_command(bin: &Path) -> Command {
    let mut cmd = Command::new(bin);
    cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error"]);
    cmd
}

/// Run `cmd` to completion, draining both pipes and honouring the watchdog.
pub(crate) fn run_tool(
    mut cmd: Command,
    bin: &Path,
    watchdog: &Watchdog,
) -> PipelineResult<ToolOutput> {
    watchdog.check()?;
    tracing::debug!(command = %describe(&cmd), "spawning external tool");

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(|e| spawn_error(bin, e))?;

    let stdout_drain = drain(child.stdout.take());
    let stderr_drain = drain(child.stderr.take());
    let status = wait_watched(&mut child, bin, watchdog);
    let stdout = join_drain(stdout_drain, bin)?;
    let stderr = join_drain(stderr_drain, bin)?;
    let status = status?;

    if !status.success() {
        return Err(MuxError::Failed {
            binary: bin.display().to_string(),
            status: status.to_string(),
            stderr: String::from_utf8_lossy(&stderr).trim().to_owned(),
        }
        .into());
    }
    if !stderr.is_empty() {
        tracing::debug!(
            binary = %bin.display(),
            stderr = %String::from_utf8_lossy(&stderr).trim(),
            "external tool reported diagnostics"
        );
    }
    Ok(ToolOutput { stdout })
}

fn wait_watched(child: &mut Child, bin: &Path, watchdog: &Watchdog) -> PipelineResult<ExitStatus> {
    let mut backoff = Duration::from_millis(5);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => {
                return Err(MuxError::Io {
                    binary: bin.display().to_string(),
                    source: e,
                }
                .into());
            }
        }
        if let Err(e) = watchdog.check() {
            tracing::warn!(binary = %bin.display(), "killing external tool: {e}");
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
        std::thread::sleep(backoff);
        backoff = (backoff * 2).min(Duration::from_millis(100));
    }
}

type Drain = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut r| {
        std::thread::spawn(move || {
            let mut bytes = Vec::new();
            r.read_to_end(&mut bytes)?;
            Ok(bytes)
        })
    })
}

fn join_drain(handle: Drain, bin: &Path) -> PipelineResult<Vec<u8>> {
    let Some(handle) = handle else {
        return Ok(Vec::new());
    };
    let joined = handle.join().map_err(|_| MuxError::Io {
        binary: bin.display().to_string(),
        source: std::io::Error::other("pipe drain thread panicked"),
    })?;
    joined.map_err(|e| {
        MuxError::Io {
            binary: bin.display().to_string(),
            source: e,
        }
        .into()
    })
}

fn describe(cmd: &Command) -> String {
    let mut parts: Vec<OsString> = vec![cmd.get_program().to_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_owned()));
    parts
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> PipelineResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
