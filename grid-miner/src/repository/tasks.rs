//! Task repository
//!
//! Handles communication with the site for the task lifecycle:
//! - Fetching the next task
//! - Storing a computed result

use async_trait::async_trait;
use grid_client::MicrogridClient;
use grid_core::dto::task::StoreResult;
use grid_core::{ResultPayload, Task};

use super::error::{FetchError, StoreError};

/// Source of tasks
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetches one task
    ///
    /// Every successful call hands out a distinct task owned by the caller.
    async fn next_task(&self) -> Result<Task, FetchError>;
}

/// Destination for computed results
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Stores the result of a task under its submission identifier
    async fn store_result(
        &self,
        submission_id: u64,
        payload: &ResultPayload,
    ) -> Result<(), StoreError>;
}

/// HTTP implementation of both seams on top of [`MicrogridClient`]
pub struct HttpTaskRepository {
    client: MicrogridClient,
    project: u32,
}

impl HttpTaskRepository {
    /// Creates a new HTTP task repository
    ///
    /// # Arguments
    /// * `client` - A client with an attached session
    /// * `project` - Project to request tasks for
    pub fn new(client: MicrogridClient, project: u32) -> Self {
        Self { client, project }
    }
}

#[async_trait]
impl TaskSource for HttpTaskRepository {
    async fn next_task(&self) -> Result<Task, FetchError> {
        Ok(self.client.get_new_task(self.project).await?)
    }
}

#[async_trait]
impl ResultSink for HttpTaskRepository {
    async fn store_result(
        &self,
        submission_id: u64,
        payload: &ResultPayload,
    ) -> Result<(), StoreError> {
        let request = StoreResult::new(submission_id, payload.clone());
        Ok(self.client.store_result(&request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_client::Session;

    #[tokio::test]
    async fn test_missing_session_is_auth_failure() {
        let repository = HttpTaskRepository::new(MicrogridClient::new("http://localhost:1"), 1);

        assert!(matches!(
            repository.next_task().await,
            Err(FetchError::AuthExpired)
        ));
        assert!(matches!(
            repository
                .store_result(1, &ResultPayload::default())
                .await,
            Err(StoreError::AuthExpired)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_site_is_transient() {
        let client = MicrogridClient::new("http://127.0.0.1:1").with_session(Session::new("s", "t"));
        let repository = HttpTaskRepository::new(client, 1);

        assert!(matches!(
            repository.next_task().await,
            Err(FetchError::Unavailable(_))
        ));
    }
}
