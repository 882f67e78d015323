//! Miner configuration
//!
//! Defines all configurable parameters for the miner including
//! the worker count, the retry budget and the site connection settings.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::scheduler::RetryPolicy;

/// How worker lanes obtain tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Each lane fetches its own task after storing the previous result
    Continuous,
    /// A refill loop keeps a bounded queue of fetched tasks
    Prefetch,
}

impl FromStr for Dispatch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continuous" => Ok(Self::Continuous),
            "prefetch" => Ok(Self::Prefetch),
            other => anyhow::bail!("unknown dispatch discipline '{}'", other),
        }
    }
}

/// Miner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Site base URL (e.g., "https://microgrid.arikado.ru/")
    pub base_url: String,

    /// Where `grid login` saved the session
    pub session_file: PathBuf,

    /// Project to request tasks for
    pub project: u32,

    /// Number of concurrent worker lanes
    pub workers: usize,

    /// Maximum calls per fetch or store, including the first
    pub attempts: u32,

    /// Fixed delay between attempts
    pub cooldown: Duration,

    pub dispatch: Dispatch,

    /// Tasks queued beyond one per worker; `None` means one extra per worker
    pub prefetch_overhead: Option<usize>,

    /// Number of odd primes used for trial division
    pub sieve_size: usize,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(base_url: String, session_file: PathBuf) -> Self {
        Self {
            base_url,
            session_file,
            project: 1,
            workers: default_workers(),
            attempts: 5,
            cooldown: Duration::from_secs(10),
            dispatch: Dispatch::Prefetch,
            prefetch_overhead: None,
            sieve_size: 10_000,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MICROGRID_URL (optional, default: the public site)
    /// - MICROGRID_SESSION_FILE (optional, default: ./session.json)
    /// - MICROGRID_PROJECT (optional, default: 1)
    /// - MINER_WORKERS (optional, default: available cores)
    /// - MINER_ATTEMPTS (optional, default: 5)
    /// - MINER_COOLDOWN_MS (optional, milliseconds, default: 10000)
    /// - MINER_DISPATCH (optional, prefetch or continuous, default: prefetch)
    /// - MINER_PREFETCH_OVERHEAD (optional, default: worker count)
    /// - MINER_SIEVE_SIZE (optional, default: 10000)
    ///
    /// Unparsable values are errors rather than falling back to defaults.
    /// The result is validated.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load(|key| std::env::var(key).ok())
    }

    fn load(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let config = Self::from_lookup(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let base_url =
            lookup("MICROGRID_URL").unwrap_or_else(|| grid_client::DEFAULT_BASE_URL.to_string());

        let session_file = lookup("MICROGRID_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_session_file);

        let mut config = Self::new(base_url, session_file);

        if let Some(project) = parse_var(&lookup, "MICROGRID_PROJECT")? {
            config.project = project;
        }

        if let Some(workers) = parse_var(&lookup, "MINER_WORKERS")? {
            config.workers = workers;
        }

        if let Some(attempts) = parse_var(&lookup, "MINER_ATTEMPTS")? {
            config.attempts = attempts;
        }

        if let Some(millis) = parse_var(&lookup, "MINER_COOLDOWN_MS")? {
            config.cooldown = Duration::from_millis(millis);
        }

        if let Some(dispatch) = lookup("MINER_DISPATCH") {
            config.dispatch = dispatch.parse()?;
        }

        config.prefetch_overhead = parse_var(&lookup, "MINER_PREFETCH_OVERHEAD")?;

        if let Some(sieve_size) = parse_var(&lookup, "MINER_SIEVE_SIZE")? {
            config.sieve_size = sieve_size;
        }

        Ok(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, self.cooldown)
    }

    /// Capacity of the prefetch queue
    pub fn queue_capacity(&self) -> usize {
        self.workers + self.prefetch_overhead.unwrap_or(self.workers)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url cannot be empty");
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!("base_url must start with http:// or https://");
        }

        if self.workers == 0 {
            anyhow::bail!("workers must be greater than 0");
        }

        if self.attempts == 0 {
            anyhow::bail!("attempts must be greater than 0");
        }

        if self.sieve_size == 0 {
            anyhow::bail!("sieve_size must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            grid_client::DEFAULT_BASE_URL.to_string(),
            default_session_file(),
        )
    }
}

fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid {} '{}': {}", key, raw, e))
        })
        .transpose()
}

fn default_session_file() -> PathBuf {
    PathBuf::from("session.json")
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(8)
}
