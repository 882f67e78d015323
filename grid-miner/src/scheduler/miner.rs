//! Miner
//!
//! Owns the worker pool. Spawns one lane per worker, optionally a prefetch
//! refill loop, and waits for every lane to drain before returning.
//! Shutdown is cooperative: lanes finish and store whatever they hold.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::error::MinerError;
use super::feed::{TaskFeed, refill};
use super::retry::RetryPolicy;
use super::worker::{LaneReport, Worker};
use crate::config::{Config, Dispatch};
use crate::repository::{ResultSink, TaskSource};
use crate::service::Computation;

/// Per-lane statistics of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneSummary {
    pub lane: usize,
    pub computed: u64,
    pub stored: u64,
    pub average: Duration,
}

/// Statistics of a finished run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub lanes: Vec<LaneSummary>,
}

impl RunSummary {
    pub fn total_stored(&self) -> u64 {
        self.lanes.iter().map(|l| l.stored).sum()
    }
}

enum Exit {
    Lane(LaneReport),
    LanePanicked { lane: usize, message: String },
    Prefetch(Result<u64, MinerError>),
}

/// Worker pool driving one task source and one result sink
pub struct Miner {
    workers: usize,
    retry: RetryPolicy,
    dispatch: Dispatch,
    queue_capacity: usize,
    source: Arc<dyn TaskSource>,
    sink: Arc<dyn ResultSink>,
    computation: Arc<dyn Computation>,
}

impl Miner {
    /// Fails with [`MinerError::NoWorkers`] when `config.workers` is zero
    pub fn new(
        config: &Config,
        source: Arc<dyn TaskSource>,
        sink: Arc<dyn ResultSink>,
        computation: Arc<dyn Computation>,
    ) -> Result<Self, MinerError> {
        if config.workers == 0 {
            return Err(MinerError::NoWorkers);
        }

        Ok(Self {
            workers: config.workers,
            retry: config.retry_policy(),
            dispatch: config.dispatch,
            queue_capacity: config.queue_capacity(),
            source,
            sink,
            computation,
        })
    }

    /// Mines until `signal` fires or the run fails
    ///
    /// `signal` is awaited at most once. Returns the first unrecoverable
    /// error seen, but only after every lane has stopped.
    pub async fn run<S>(&self, signal: S) -> Result<RunSummary, MinerError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let shutdown = CancellationToken::new();
        let listener = tokio::spawn(listen(signal, shutdown.clone()));

        let result = self.run_until(shutdown).await;

        listener.abort();
        result
    }

    /// Mines until `shutdown` is cancelled or the run fails
    pub async fn run_until(&self, shutdown: CancellationToken) -> Result<RunSummary, MinerError> {
        info!(
            "Starting mining with {} worker(s) using {} ({:?} dispatch)",
            self.workers,
            self.computation.name(),
            self.dispatch
        );

        let mut set = JoinSet::new();

        let feed = match self.dispatch {
            Dispatch::Continuous => {
                TaskFeed::continuous(Arc::clone(&self.source), self.retry, shutdown.clone())
            }
            Dispatch::Prefetch => {
                let (tx, rx) = mpsc::channel(self.queue_capacity);
                let source = Arc::clone(&self.source);
                let retry = self.retry;
                let token = shutdown.clone();
                set.spawn(async move { Exit::Prefetch(refill(source, retry, token, tx).await) });
                TaskFeed::prefetched(rx)
            }
        };

        for lane in 0..self.workers {
            let worker = Worker::new(
                lane,
                Arc::clone(&self.computation),
                Arc::clone(&self.sink),
                self.retry,
            );
            let lane_feed = feed.clone();
            set.spawn(async move {
                match tokio::spawn(worker.run(lane_feed)).await {
                    Ok(report) => Exit::Lane(report),
                    Err(e) => Exit::LanePanicked {
                        lane,
                        message: e.to_string(),
                    },
                }
            });
        }

        let mut running = self.workers;
        let mut first_error: Option<MinerError> = None;
        let mut summary = RunSummary::default();

        while let Some(joined) = set.join_next().await {
            let failure = match joined {
                Ok(Exit::Lane(report)) => {
                    running -= 1;
                    summary.lanes.push(LaneSummary {
                        lane: report.lane,
                        computed: report.computed,
                        stored: report.stored,
                        average: report.average,
                    });
                    report.outcome.err()
                }
                Ok(Exit::LanePanicked { lane, message }) => {
                    running -= 1;
                    error!(lane, "Worker panicked: {}", message);
                    Some(MinerError::Panicked(message))
                }
                Ok(Exit::Prefetch(Ok(fetched))) => {
                    debug!("Prefetch loop finished after {} task(s)", fetched);
                    None
                }
                Ok(Exit::Prefetch(Err(err))) => {
                    error!("Prefetch loop terminated: {}", err);
                    Some(err)
                }
                Err(e) => {
                    shutdown.cancel();
                    Some(MinerError::Panicked(e.to_string()))
                }
            };

            if running == 0 && !shutdown.is_cancelled() {
                debug!("No lanes left, stopping");
                shutdown.cancel();
            }

            if let Some(err) = failure {
                if err.is_auth() && !shutdown.is_cancelled() {
                    error!("Session rejected by the site, stopping all workers");
                    shutdown.cancel();
                }
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        for task in feed.abandon_queued().await {
            warn!(
                task = task.uid,
                "Abandoning queued task {}..{}: no lane left to run it",
                task.start_number,
                task.stop_number
            );
        }

        summary.lanes.sort_by_key(|l| l.lane);
        info!(
            "Mining stopped, {} result(s) stored",
            summary.total_stored()
        );

        match first_error {
            Some(err) => Err(err),
            None => Ok(summary),
        }
    }
}

async fn listen<S>(signal: S, shutdown: CancellationToken)
where
    S: Future<Output = ()>,
{
    tokio::select! {
        _ = signal => {
            info!("Shutdown requested, finishing in-flight tasks");
            shutdown.cancel();
        }
        _ = shutdown.cancelled() => {}
    }
}
