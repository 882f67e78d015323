//! Task-related site actions

use grid_core::Task;
use grid_core::dto::task::{GetNewTask, StoreResult, StoreResultResponse};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::{MicrogridClient, WRONG_TOKEN_BODY};

impl MicrogridClient {
    // =============================================================================
    // Task Lifecycle
    // =============================================================================

    /// Ask the site for a new task of the given project
    ///
    /// # Errors
    /// * `WrongToken` - the session is no longer valid
    /// * `IncorrectBody` - the site answered with something that is not a task
    pub async fn get_new_task(&self, project: u32) -> Result<Task> {
        let response = self.post_action(&GetNewTask { project }).await?;
        let body = self.read_body(response).await?;

        let task = parse_task_body(&body)?;
        debug!(
            "Received task {} ({}..{})",
            task.uid, task.start_number, task.stop_number
        );
        Ok(task)
    }

    /// Store the result of a computed task
    ///
    /// # Errors
    /// * `WrongToken` - the session is no longer valid
    /// * `WrongVersion` - the site refused the result
    /// * `IncorrectBody` - the site answered with something unrecognised
    pub async fn store_result(&self, request: &StoreResult) -> Result<()> {
        let response = self.post_action(request).await?;
        let body = self.read_body(response).await?;

        parse_store_body(&body)
    }
}

fn parse_task_body(body: &str) -> Result<Task> {
    if body.trim() == WRONG_TOKEN_BODY {
        return Err(ClientError::WrongToken);
    }

    serde_json::from_str(body).map_err(|e| ClientError::IncorrectBody(e.to_string()))
}

fn parse_store_body(body: &str) -> Result<()> {
    if body.trim() == WRONG_TOKEN_BODY {
        return Err(ClientError::WrongToken);
    }

    let response: StoreResultResponse =
        serde_json::from_str(body).map_err(|e| ClientError::IncorrectBody(e.to_string()))?;

    match response.result.as_str() {
        "ok" => Ok(()),
        "fail" => Err(ClientError::WrongVersion),
        other => Err(ClientError::IncorrectBody(format!(
            "unknown store result '{}'",
            other
        ))),
    }
}
