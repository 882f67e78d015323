//! Task DTOs

use serde::{Deserialize, Serialize};

use super::FormAction;
use crate::domain::result::ResultPayload;

/// Result storage protocol version understood by the site
pub const STORE_PROTOCOL_VERSION: u32 = 2;

/// Request to hand out a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNewTask {
    pub project: u32,
}

impl FormAction for GetNewTask {
    const ACTION: &'static str = "get_new_task";

    fn fields(&self) -> serde_json::Result<Vec<(&'static str, String)>> {
        Ok(vec![("project", self.project.to_string())])
    }
}

/// Request to store a computed result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResult {
    pub version: u32,
    pub workunit_result_uid: u64,
    pub result: ResultPayload,
}

impl StoreResult {
    pub fn new(workunit_result_uid: u64, result: ResultPayload) -> Self {
        Self {
            version: STORE_PROTOCOL_VERSION,
            workunit_result_uid,
            result,
        }
    }
}

impl FormAction for StoreResult {
    const ACTION: &'static str = "task_store_result";

    fn fields(&self) -> serde_json::Result<Vec<(&'static str, String)>> {
        Ok(vec![
            ("version", self.version.to_string()),
            ("workunit_result_uid", self.workunit_result_uid.to_string()),
            ("result", self.result.to_wire()?),
        ])
    }
}

/// JSON body returned by the site after storing a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResultResponse {
    pub result: String,
    #[serde(default)]
    pub message: Option<String>,
}
