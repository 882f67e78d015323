//! Grid Core
//!
//! Core types shared by the Microgrid client and the miner.
//!
//! This crate contains:
//! - Domain types: tasks, computed results and per-lane statistics
//! - DTOs: request bodies exchanged with the Microgrid site

pub mod domain;
pub mod dto;
pub mod stats;

pub use domain::result::{ResultPayload, TaskResult};
pub use domain::task::Task;
pub use stats::RunningAverage;
