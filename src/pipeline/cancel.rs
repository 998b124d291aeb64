use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::foundation::error::{PipelineError, PipelineResult};

/// Shared flag used to cancel a run from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Return `true` once [`CancelToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Cancellation token plus an optional wall-clock deadline for one run.
#[derive(Clone, Debug)]
pub struct Watchdog {
    cancel: CancelToken,
    started: Instant,
    budget: Option<Duration>,
}

impl Watchdog {
    /// Start the clock now.
    pub fn new(cancel: CancelToken, budget: Option<Duration>) -> Self {
        Self {
            cancel,
            started: Instant::now(),
            budget,
        }
    }

    /// Watchdog that never fires.
    pub fn unbounded() -> Self {
        Self::new(CancelToken::new(), None)
    }

    /// Time spent since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fail with [`PipelineError::Cancelled`] if cancelled or over budget.
    pub fn check(&self) -> PipelineResult<()> {
        if self.cancel.is_cancelled() {
            return Err(PipelineError::cancelled("run was cancelled by the caller"));
        }
        if let Some(budget) = self.budget
            && self.started.elapsed() > budget
        {
            return Err(PipelineError::cancelled(format!(
                "run exceeded its wall-clock budget of {:.1}s",
                budget.as_secs_f64()
            )));
        }
        Ok(())
    }
}
