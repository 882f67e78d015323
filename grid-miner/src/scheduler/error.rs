//! Scheduler error types

use thiserror::Error;

use super::retry::RetryError;
use crate::repository::{Classify, FailureKind, FetchError, StoreError};
use crate::service::ComputeError;

/// Unrecoverable failure of a lane or of the whole run
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("could not fetch a task after {attempts} attempt(s): {source}")]
    FetchExhausted { attempts: u32, source: FetchError },

    #[error("could not fetch a task: {0}")]
    Fetch(#[source] FetchError),

    #[error("could not store result of task {task_uid} after {attempts} attempt(s): {source}")]
    StoreExhausted {
        task_uid: u64,
        attempts: u32,
        source: StoreError,
    },

    #[error("could not store result of task {task_uid}: {source}")]
    Store { task_uid: u64, source: StoreError },

    #[error("computation failed for task {task_uid}: {source}")]
    Compute { task_uid: u64, source: ComputeError },

    #[error("worker task panicked: {0}")]
    Panicked(String),

    #[error("the miner needs at least one worker")]
    NoWorkers,
}

impl MinerError {
    /// Whether the session is gone and the whole run has to stop
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Fetch(err) => err.kind() == FailureKind::Auth,
            Self::Store { source, .. } => source.kind() == FailureKind::Auth,
            _ => false,
        }
    }

    /// Converts a failed fetch; `None` when the retry was cancelled
    pub(crate) fn from_fetch(err: RetryError<FetchError>) -> Option<Self> {
        match err {
            RetryError::Exhausted { attempts, source } => {
                Some(Self::FetchExhausted { attempts, source })
            }
            RetryError::Fatal(source) => Some(Self::Fetch(source)),
            RetryError::Cancelled => None,
        }
    }

    /// Converts a failed store of the result of `task_uid`
    pub(crate) fn from_store(task_uid: u64, err: RetryError<StoreError>) -> Self {
        match err {
            RetryError::Exhausted { attempts, source } => Self::StoreExhausted {
                task_uid,
                attempts,
                source,
            },
            RetryError::Fatal(source) => Self::Store { task_uid, source },
            RetryError::Cancelled => Self::Store {
                task_uid,
                source: StoreError::Unavailable("store interrupted".to_string()),
            },
        }
    }
}
