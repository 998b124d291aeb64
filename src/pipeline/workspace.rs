use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;

use crate::foundation::error::PipelineResult;

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-unique token combining pid, wall clock, and a counter.
pub(crate) fn unique_token() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let n = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}_{nanos}_{n}", std::process::id())
}

/// Scratch directory owned by one run, removed with everything in it on drop.
#[derive(Debug)]
pub struct RunWorkspace {
    id: String,
    root: PathBuf,
}

impl RunWorkspace {
    /// Create a fresh directory under `temp_root`.
    pub fn create(temp_root: &Path) -> PipelineResult<Self> {
        let id = unique_token();
        let root = temp_root.join(format!("wavecast_run_{id}"));
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create run directory '{}'", root.display()))?;
        tracing::debug!(run = %id, dir = %root.display(), "created run workspace");
        Ok(Self { id, root })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of `name` inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Directory receiving the rendered frame images.
    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("frames")
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => tracing::debug!(run = %self.id, "removed run workspace"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                run = %self.id,
                dir = %self.root.display(),
                "failed to remove run workspace: {e}"
            ),
        }
    }
}
