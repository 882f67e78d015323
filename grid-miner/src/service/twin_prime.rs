//! Twin prime search
//!
//! The Microgrid twin prime project asks for every twin pair `(p, p + 2)`
//! inside a task's range. Candidates above 3 are always of the form
//! `6k - 1, 6k + 1`, and each is confirmed by trial division against a
//! precomputed table of small primes before falling back to odd divisors.

use grid_core::{ResultPayload, Task};
use tracing::debug;

use super::computation::{ComputeError, Computation};

/// Computation searching task ranges for twin primes
pub struct TwinPrimeComputation {
    /// First `sieve_size` odd primes, ascending
    primes: Vec<u64>,
}

impl TwinPrimeComputation {
    /// Builds the small prime table
    ///
    /// # Arguments
    /// * `sieve_size` - Number of odd primes to precompute
    pub fn new(sieve_size: usize) -> Self {
        let mut primes: Vec<u64> = Vec::with_capacity(sieve_size);
        let mut candidate = 3u64;

        while primes.len() < sieve_size {
            if primes
                .iter()
                .take_while(|&&p| p * p <= candidate)
                .all(|&p| candidate % p != 0)
            {
                primes.push(candidate);
            }
            candidate += 2;
        }

        debug!(
            "Generated {} sieve primes (largest {:?})",
            primes.len(),
            primes.last()
        );
        Self { primes }
    }

    pub fn is_prime(&self, n: u64) -> bool {
        if n < 2 {
            return false;
        }
        if n % 2 == 0 {
            return n == 2;
        }

        for &p in &self.primes {
            if p > n / p {
                return true;
            }
            if n % p == 0 {
                return n == p;
            }
        }

        let mut divisor = self.primes.last().map_or(3, |&p| p + 2);
        while divisor <= n / divisor {
            if n % divisor == 0 {
                return false;
            }
            divisor += 2;
        }
        true
    }

    /// Lower members of all twin pairs with `start <= p` and `p + 2 <= stop`
    pub fn twins(&self, start: u64, stop: u64) -> Vec<u64> {
        let mut twins = Vec::new();

        if start <= 3 && stop >= 5 {
            twins.push(3);
        }

        let mut k = start.saturating_add(1).div_ceil(6).max(1);
        while let Some(upper) = k.checked_mul(6).and_then(|n| n.checked_add(1)) {
            if upper > stop {
                break;
            }
            let lower = upper - 2;
            if self.is_prime(lower) && self.is_prime(upper) {
                twins.push(lower);
            }
            k += 1;
        }

        twins
    }
}

impl Computation for TwinPrimeComputation {
    fn name(&self) -> &str {
        "twin-prime"
    }

    fn compute(&self, task: &Task) -> Result<ResultPayload, ComputeError> {
        let range = task.range();
        if range.is_empty() {
            return Err(ComputeError::InvalidRange {
                start: *range.start(),
                stop: *range.end(),
            });
        }

        Ok(self.twins(*range.start(), *range.end()).into())
    }
}
