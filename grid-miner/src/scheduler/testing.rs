//! In-memory sources, sinks and computations for scheduler tests

use async_trait::async_trait;
use grid_core::{ResultPayload, Task};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::repository::{FetchError, ResultSink, StoreError, TaskSource};
use crate::service::{ComputeError, Computation};

type FetchBehaviour = Box<dyn Fn(u64) -> Option<FetchError> + Send + Sync>;
type StoreBehaviour = Box<dyn Fn(u64) -> Option<StoreError> + Send + Sync>;

/// Hands out tasks numbered by call, `submission_id() == uid`
pub struct FakeSource {
    calls: AtomicU64,
    fetched: Mutex<Vec<u64>>,
    behaviour: FetchBehaviour,
}

impl FakeSource {
    pub fn reliable() -> Arc<Self> {
        Self::failing_with(|_| None)
    }

    pub fn failing_first(failures: u64) -> Arc<Self> {
        Self::failing_with(move |call| {
            (call <= failures).then(|| FetchError::Unavailable("site is down".into()))
        })
    }

    /// `behaviour` receives the 1-based call number
    pub fn failing_with(
        behaviour: impl Fn(u64) -> Option<FetchError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU64::new(0),
            fetched: Mutex::new(Vec::new()),
            behaviour: Box::new(behaviour),
        })
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<u64> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskSource for FakeSource {
    async fn next_task(&self) -> Result<Task, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(err) = (self.behaviour)(call) {
            return Err(err);
        }

        self.fetched.lock().unwrap().push(call);
        Ok(Task {
            uid: call,
            project_uid: 1,
            workunit_result_uid: call,
            start_number: 0,
            stop_number: 100,
        })
    }
}

/// Records successful stores by submission id
pub struct FakeSink {
    calls: AtomicU64,
    stored: Mutex<Vec<u64>>,
    behaviour: StoreBehaviour,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl FakeSink {
    pub fn accepting() -> Arc<Self> {
        Self::failing_with(|_| None)
    }

    /// `behaviour` receives the submission id
    pub fn failing_with(
        behaviour: impl Fn(u64) -> Option<StoreError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU64::new(0),
            stored: Mutex::new(Vec::new()),
            behaviour: Box::new(behaviour),
            cancel_after: None,
        })
    }

    /// Cancels `token` once `stores` results have been stored
    pub fn cancelling_after(stores: usize, token: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU64::new(0),
            stored: Mutex::new(Vec::new()),
            behaviour: Box::new(|_| None),
            cancel_after: Some((stores, token)),
        })
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<u64> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSink for FakeSink {
    async fn store_result(
        &self,
        submission_id: u64,
        _payload: &ResultPayload,
    ) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = (self.behaviour)(submission_id) {
            return Err(err);
        }

        let count = {
            let mut stored = self.stored.lock().unwrap();
            stored.push(submission_id);
            stored.len()
        };
        if let Some((limit, token)) = &self.cancel_after {
            if count >= *limit {
                token.cancel();
            }
        }
        Ok(())
    }
}

/// Sleeps for a fixed time and tracks how many calls overlap
pub struct FakeComputation {
    delay: Duration,
    broken: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeComputation {
    pub fn taking(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            broken: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn broken() -> Arc<Self> {
        let computation = Self::taking(Duration::ZERO);
        computation.broken.store(true, Ordering::SeqCst);
        computation
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Computation for FakeComputation {
    fn name(&self) -> &str {
        "fake"
    }

    fn compute(&self, task: &Task) -> Result<ResultPayload, ComputeError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(ComputeError::Unavailable("broken on purpose".into()));
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(ResultPayload(vec![task.uid]))
    }
}
