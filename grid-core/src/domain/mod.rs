//! Core domain types
//!
//! These types are shared between the HTTP client (which decodes them from
//! the site) and the miner (which schedules and computes them).

pub mod result;
pub mod task;
