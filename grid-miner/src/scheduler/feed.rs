//! Task acquisition for worker lanes
//!
//! Two dispatch disciplines are supported:
//! - **Continuous**: every lane calls the source itself between tasks.
//! - **Prefetch**: a single refill loop keeps a bounded queue topped up
//!   and lanes pull from it, hiding fetch latency behind computation.
//!
//! In both cases a lane stops asking for work once [`TaskFeed::next`]
//! returns `Ok(None)`.

use grid_core::Task;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::error::MinerError;
use super::retry::RetryPolicy;
use crate::repository::TaskSource;

/// Where a lane gets its next task from
#[derive(Clone)]
pub enum TaskFeed {
    /// The lane fetches directly from the source
    Continuous {
        source: Arc<dyn TaskSource>,
        retry: RetryPolicy,
        shutdown: CancellationToken,
    },
    /// The lane pulls from the shared prefetch queue
    Prefetched { queue: Arc<Mutex<mpsc::Receiver<Task>>> },
}

impl TaskFeed {
    pub fn continuous(
        source: Arc<dyn TaskSource>,
        retry: RetryPolicy,
        shutdown: CancellationToken,
    ) -> Self {
        Self::Continuous {
            source,
            retry,
            shutdown,
        }
    }

    pub fn prefetched(queue: mpsc::Receiver<Task>) -> Self {
        Self::Prefetched {
            queue: Arc::new(Mutex::new(queue)),
        }
    }

    /// Next task for a lane, or `None` when the lane should stop
    ///
    /// Continuous feeds stop once shutdown is requested; prefetched feeds
    /// stop once the queue is closed and fully drained, so every task that
    /// was fetched is still handed out.
    pub async fn next(&self) -> Result<Option<Task>, MinerError> {
        match self {
            Self::Continuous {
                source,
                retry,
                shutdown,
            } => {
                if shutdown.is_cancelled() {
                    return Ok(None);
                }
                match retry
                    .run("fetch a task", Some(shutdown), || source.next_task())
                    .await
                {
                    Ok(task) => Ok(Some(task)),
                    Err(err) => MinerError::from_fetch(err).map_or(Ok(None), Err),
                }
            }
            Self::Prefetched { queue } => Ok(queue.lock().await.recv().await),
        }
    }

    /// Empties the prefetch queue, returning tasks no lane will run
    pub async fn abandon_queued(&self) -> Vec<Task> {
        let mut abandoned = Vec::new();
        if let Self::Prefetched { queue } = self {
            let mut queue = queue.lock().await;
            while let Ok(task) = queue.try_recv() {
                abandoned.push(task);
            }
        }
        abandoned
    }
}

/// Keeps the prefetch queue full until shutdown
///
/// A slot in the queue is reserved before each fetch, so no more tasks are
/// held than the queue can take. Returns the number of tasks fetched.
/// Dropping `queue` on return closes it for the lanes.
pub async fn refill(
    source: Arc<dyn TaskSource>,
    retry: RetryPolicy,
    shutdown: CancellationToken,
    queue: mpsc::Sender<Task>,
) -> Result<u64, MinerError> {
    info!("Prefetching up to {} task(s)", queue.max_capacity());
    let mut fetched = 0;

    loop {
        let permit = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            permit = queue.reserve() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    debug!("All lanes are gone, stopping prefetch");
                    break;
                }
            },
        };

        match retry
            .run("prefetch a task", Some(&shutdown), || source.next_task())
            .await
        {
            Ok(task) => {
                debug!(task = task.uid, "Queued task");
                permit.send(task);
                fetched += 1;
            }
            Err(err) => match MinerError::from_fetch(err) {
                Some(err) => return Err(err),
                None => break,
            },
        }
    }

    info!("Prefetch stopped after {} task(s)", fetched);
    Ok(fetched)
}
