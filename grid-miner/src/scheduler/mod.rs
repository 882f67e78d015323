//! Scheduler layer for the miner
//!
//! This layer runs a fixed pool of worker lanes against a task source and
//! a result sink. It handles task dispatch, bounded retries and
//! cooperative shutdown; the lanes never abandon a task they hold.

mod error;
mod feed;
mod miner;
mod retry;
mod worker;

#[cfg(test)]
mod testing;

pub use error::MinerError;
pub use miner::Miner;
pub use retry::RetryPolicy;
