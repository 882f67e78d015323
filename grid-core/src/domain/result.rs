//! Result domain types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output of a computation
///
/// For the twin prime project this is the list of lower members of every
/// twin pair found in the task range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultPayload(pub Vec<u64>);

impl ResultPayload {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes the payload as the JSON array the site expects in a form field
    pub fn to_wire(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

impl From<Vec<u64>> for ResultPayload {
    fn from(values: Vec<u64>) -> Self {
        Self(values)
    }
}

/// A computed result waiting to be stored
///
/// Created by a worker after its computation finishes and consumed once by
/// the store step.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub task_uid: u64,
    pub submission_id: u64,
    pub payload: ResultPayload,
    pub duration: Duration,
}
