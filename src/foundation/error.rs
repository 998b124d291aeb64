use std::fmt;

/// Convenience result type used across wavecast.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Stage of a pipeline run, used to attach context to failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Spec validation and tool pre-flight.
    Validated,
    /// Audio decode, merge and speed adjustment.
    Decoding,
    /// Frame window computation.
    Sampling,
    /// Waveform rasterization.
    Rendering,
    /// Frame sequence encoding.
    Encoding,
    /// Background / waveform / text layering.
    Compositing,
    /// Final audio + video container write.
    Muxing,
}

impl Stage {
    /// Lowercase stage name used in logs and messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Validated => "validation",
            Self::Decoding => "decoding",
            Self::Sampling => "sampling",
            Self::Rendering => "rendering",
            Self::Encoding => "encoding",
            Self::Compositing => "compositing",
            Self::Muxing => "muxing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failures reported by external encoder invocations.
#[derive(thiserror::Error, Debug)]
pub enum MuxError {
    /// The encoder binary could not be found on the execution path.
    #[error(
        "'{binary}' was not found; install FFmpeg and make sure it is accessible on your PATH"
    )]
    EncoderNotFound {
        /// Binary name or path that was looked up.
        binary: String,
    },

    /// The encoder ran and exited unsuccessfully.
    #[error("'{binary}' exited with status {status}: {stderr}")]
    Failed {
        /// Binary that failed.
        binary: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Trimmed stderr output.
        stderr: String,
    },

    /// The encoder could not be driven (pipe, wait or spawn failure).
    #[error("'{binary}' io failure: {source}")]
    Io {
        /// Binary being driven.
        binary: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Malformed spec or configuration reaching the core.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unreadable or empty audio.
    #[error("decode error: {0}")]
    Decode(String),

    /// Malformed or empty frame sequence.
    #[error("encode error: {0}")]
    Encode(String),

    /// External encoder failure.
    #[error("mux error: {0}")]
    Mux(#[from] MuxError),

    /// Run was cancelled or exceeded its wall-clock budget.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// A failure annotated with the stage it happened in.
    #[error("{stage} failed: {source}")]
    Stage {
        /// Stage that was active.
        stage: Stage,
        /// Underlying failure.
        #[source]
        source: Box<PipelineError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Build a [`PipelineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PipelineError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PipelineError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PipelineError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Attach stage context. Already-staged errors keep their original stage.
    pub fn at(self, stage: Stage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage this error was recorded in, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error kind with stage wrappers removed.
    pub fn root(&self) -> &PipelineError {
        let mut cur = self;
        while let Self::Stage { source, .. } = cur {
            cur = source;
        }
        cur
    }

    /// `true` when an external encoder binary was missing.
    pub fn is_encoder_not_found(&self) -> bool {
        matches!(
            self.root(),
            PipelineError::Mux(MuxError::EncoderNotFound { .. })
        )
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        if self.is_encoder_not_found() {
            return "FFmpeg is not installed or not accessible in your system's PATH. Please install FFmpeg.".to_owned();
        }
        format!("Video generation failed: {self}.")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
