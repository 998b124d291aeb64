//! Run orchestration: configuration, scratch space, cancellation, and the stage driver.

pub mod cancel;
pub mod config;
pub mod run;
pub mod workspace;
