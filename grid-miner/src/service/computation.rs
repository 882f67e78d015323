//! Computation service
//!
//! A computation maps a task's input range to a result payload. It is
//! assumed to be CPU-bound and is always invoked on a blocking thread.

use grid_core::{ResultPayload, Task};
use thiserror::Error;

/// Errors a computation can report instead of a usable result
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("invalid range {start}..{stop}")]
    InvalidRange { start: u64, stop: u64 },

    #[error("computation unavailable: {0}")]
    Unavailable(String),

    #[error("computation aborted: {0}")]
    Aborted(String),
}

/// Service trait for computing task results
pub trait Computation: Send + Sync + 'static {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Computes the result payload for a task
    ///
    /// Runs to completion once started; it is never interrupted.
    fn compute(&self, task: &Task) -> Result<ResultPayload, ComputeError>;
}
