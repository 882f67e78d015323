//! Bounded retry with a fixed cooldown
//!
//! The delay between attempts is constant. Only failures classified as
//! [`FailureKind::Transient`] are retried; protocol and auth failures are
//! returned after the first attempt.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::repository::{Classify, FailureKind};

/// Why a retried operation gave up
#[derive(Debug, Error)]
pub enum RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Every attempt failed with a transient error
    #[error("gave up after {attempts} attempt(s): {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    /// A failure that retrying cannot fix
    #[error(transparent)]
    Fatal(E),

    /// Cancellation was requested while waiting for the next attempt
    #[error("cancelled while waiting to retry")]
    Cancelled,
}

/// Attempt budget for a single fetch or store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of calls, including the first
    pub attempts: u32,
    /// Delay between consecutive calls
    pub cooldown: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, cooldown: Duration) -> Self {
        Self { attempts, cooldown }
    }

    /// Runs `operation` until it succeeds or the budget is spent
    ///
    /// When `cancel` is given, a pending cooldown ends early with
    /// [`RetryError::Cancelled`]. A call already in progress is never
    /// interrupted.
    pub async fn run<T, E, F, Fut>(
        &self,
        what: &str,
        cancel: Option<&CancellationToken>,
        mut operation: F,
    ) -> Result<T, RetryError<E>>
    where
        E: std::error::Error + Classify + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if err.kind() != FailureKind::Transient {
                return Err(RetryError::Fatal(err));
            }
            if attempt >= attempts {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: err,
                });
            }

            warn!(
                "Failed to {} (attempt {}/{}): {}; retrying in {:?}",
                what, attempt, attempts, err, self.cooldown
            );

            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => return Err(RetryError::Cancelled),
                        _ = tokio::time::sleep(self.cooldown) => {}
                    }
                }
                None => tokio::time::sleep(self.cooldown).await,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{FetchError, StoreError};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn no_cooldown(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_permanent_transient_failure_uses_whole_budget() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = no_cooldown(3)
            .run("fetch a task", None, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Unavailable("down".into()))
            })
            .await;

        assert!(matches!(
            result,
            Err(RetryError::Exhausted { attempts: 3, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = &AtomicU32::new(0);

        let result = no_cooldown(3)
            .run("fetch a task", None, move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(FetchError::Unavailable("down".into()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_protocol_failure_is_not_retried() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = no_cooldown(5)
            .run("store a result", None, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::VersionMismatch)
            })
            .await;

        assert!(matches!(
            result,
            Err(RetryError::Fatal(StoreError::VersionMismatch))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let result: Result<(), _> = no_cooldown(5)
            .run("fetch a task", None, move || async move { Err(FetchError::AuthExpired) })
            .await;

        assert!(matches!(result, Err(RetryError::Fatal(FetchError::AuthExpired))));
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_cooldown() {
        let token = CancellationToken::new();
        let policy = RetryPolicy::new(5, Duration::from_secs(3600));
        let calls = &AtomicU32::new(0);

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                token.cancel();
            })
        };

        let result: Result<(), _> = policy
            .run("fetch a task", Some(&token), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Unavailable("down".into()))
            })
            .await;

        canceller.await.unwrap();
        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.cooldown, Duration::from_secs(10));
    }
}
