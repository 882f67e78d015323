//! Task domain types

use serde::{Deserialize, Deserializer, Serialize};
use std::ops::RangeInclusive;

/// A unit of work handed out by the Microgrid site
///
/// Tasks are immutable once fetched. `workunit_result_uid` is the identifier
/// the result must be submitted under; `uid` identifies the task itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "lenient_u64")]
    pub uid: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub project_uid: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub workunit_result_uid: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub start_number: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub stop_number: u64,
}

impl Task {
    /// Identifier the computed result is stored under
    pub fn submission_id(&self) -> u64 {
        self.workunit_result_uid
    }

    /// Inclusive input range of the task
    pub fn range(&self) -> RangeInclusive<u64> {
        self.start_number..=self.stop_number
    }
}

/// The site encodes numbers inconsistently, sometimes as JSON strings.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
