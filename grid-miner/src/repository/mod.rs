//! Repository layer
//!
//! Repositories abstract communication with the Microgrid site behind two
//! narrow seams: a source of tasks and a sink for results. They carry no
//! scheduling logic.
//!
//! Both seams are trait-based so the scheduler can be driven by in-memory
//! fakes in tests.

mod error;
mod tasks;

pub use error::{Classify, FailureKind, FetchError, StoreError};
pub use tasks::{HttpTaskRepository, ResultSink, TaskSource};
