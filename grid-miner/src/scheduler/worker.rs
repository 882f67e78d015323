//! Worker lanes
//!
//! A lane repeatedly takes a task from its feed, runs the computation on a
//! blocking thread and stores the result. A lane holds at most one task at
//! a time and always stores a finished computation, even after shutdown
//! has been requested.

use grid_core::{RunningAverage, Task, TaskResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::error::MinerError;
use super::feed::TaskFeed;
use super::retry::RetryPolicy;
use crate::repository::ResultSink;
use crate::service::{ComputeError, Computation};

/// What a lane did before it stopped
#[derive(Debug)]
pub struct LaneReport {
    pub lane: usize,
    /// Computations finished, including any whose result was not stored
    pub computed: u64,
    pub stored: u64,
    pub average: Duration,
    pub outcome: Result<(), MinerError>,
}

/// State owned by a single lane
pub struct Worker {
    lane: usize,
    computation: Arc<dyn Computation>,
    sink: Arc<dyn ResultSink>,
    retry: RetryPolicy,
    average: RunningAverage,
    stored: u64,
}

impl Worker {
    pub fn new(
        lane: usize,
        computation: Arc<dyn Computation>,
        sink: Arc<dyn ResultSink>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            lane,
            computation,
            sink,
            retry,
            average: RunningAverage::new(),
            stored: 0,
        }
    }

    /// Runs the lane until its feed is exhausted or a task fails
    pub async fn run(mut self, feed: TaskFeed) -> LaneReport {
        info!(lane = self.lane, "Worker started");

        let outcome = loop {
            let task = match feed.next().await {
                Ok(Some(task)) => task,
                Ok(None) => break Ok(()),
                Err(err) => break Err(err),
            };

            if let Err(err) = self.process(task).await {
                break Err(err);
            }
        };

        match &outcome {
            Ok(()) => info!(
                lane = self.lane,
                stored = self.stored,
                "Worker finished, average task time {:?}",
                self.average.value()
            ),
            Err(err) => error!(lane = self.lane, "Worker terminated: {}", err),
        }

        LaneReport {
            lane: self.lane,
            computed: self.average.samples(),
            stored: self.stored,
            average: self.average.value(),
            outcome,
        }
    }

    async fn process(&mut self, task: Task) -> Result<(), MinerError> {
        info!(
            lane = self.lane,
            task = task.uid,
            "Computing {}..{}",
            task.start_number,
            task.stop_number
        );

        let result = self.compute(task).await?;
        let average = self.average.update(result.duration);
        info!(
            lane = self.lane,
            task = result.task_uid,
            "Finished in {:?} with {} result(s), average {:?}",
            result.duration,
            result.payload.len(),
            average
        );

        self.store(&result).await?;
        self.stored += 1;
        Ok(())
    }

    async fn compute(&self, task: Task) -> Result<TaskResult, MinerError> {
        let computation = Arc::clone(&self.computation);
        let task_uid = task.uid;
        let submission_id = task.submission_id();

        let (payload, duration) = tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let payload = computation.compute(&task);
            (payload, started.elapsed())
        })
        .await
        .map_err(|e| MinerError::Compute {
            task_uid,
            source: ComputeError::Aborted(e.to_string()),
        })?;

        let payload = payload.map_err(|source| MinerError::Compute { task_uid, source })?;

        Ok(TaskResult {
            task_uid,
            submission_id,
            payload,
            duration,
        })
    }

    /// Stores a result; never interrupted by shutdown
    async fn store(&self, result: &TaskResult) -> Result<(), MinerError> {
        debug!(
            lane = self.lane,
            task = result.task_uid,
            "Storing result under {}",
            result.submission_id
        );

        self.retry
            .run("store a result", None, || {
                self.sink.store_result(result.submission_id, &result.payload)
            })
            .await
            .map_err(|err| MinerError::from_store(result.task_uid, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{StoreError, TaskSource};
    use crate::scheduler::testing::{FakeComputation, FakeSink, FakeSource};
    use tokio::sync::mpsc;

    async fn queued(tasks: u64) -> TaskFeed {
        let source = FakeSource::reliable();
        let (tx, rx) = mpsc::channel(tasks as usize);
        for _ in 0..tasks {
            tx.send(source.next_task().await.unwrap()).await.unwrap();
        }
        TaskFeed::prefetched(rx)
    }

    #[tokio::test]
    async fn test_lane_stores_every_queued_task() {
        let sink = FakeSink::accepting();
        let worker = Worker::new(
            0,
            FakeComputation::taking(Duration::from_millis(2)),
            sink.clone(),
            RetryPolicy::new(1, Duration::ZERO),
        );

        let report = worker.run(queued(3).await).await;

        assert!(report.outcome.is_ok());
        assert_eq!(report.computed, 3);
        assert_eq!(report.stored, 3);
        assert!(report.average > Duration::ZERO);
        assert_eq!(sink.stored(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_store_retries_transient_failures() {
        let attempts = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let counter = attempts.clone();
        let sink = FakeSink::failing_with(move |_| {
            (counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) < 2)
                .then(|| StoreError::Unavailable("busy".into()))
        });
        let worker = Worker::new(
            0,
            FakeComputation::taking(Duration::ZERO),
            sink.clone(),
            RetryPolicy::new(3, Duration::ZERO),
        );

        let report = worker.run(queued(1).await).await;

        assert!(report.outcome.is_ok());
        assert_eq!(sink.calls(), 3);
        assert_eq!(sink.stored(), vec![1]);
    }

    #[tokio::test]
    async fn test_exhausted_store_ends_lane() {
        let sink = FakeSink::failing_with(|_| Some(StoreError::Unavailable("down".into())));
        let worker = Worker::new(
            0,
            FakeComputation::taking(Duration::ZERO),
            sink.clone(),
            RetryPolicy::new(3, Duration::ZERO),
        );

        let report = worker.run(queued(2).await).await;

        assert!(matches!(
            report.outcome,
            Err(MinerError::StoreExhausted {
                task_uid: 1,
                attempts: 3,
                ..
            })
        ));
        assert_eq!(report.computed, 1);
        assert_eq!(report.stored, 0);
        assert_eq!(sink.calls(), 3);
    }
}
