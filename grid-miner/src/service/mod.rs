//! Service layer
//!
//! Services contain the business logic that runs on a task once it has
//! been fetched. The computation is injected into the scheduler as a trait
//! object, resolved once before the worker pool starts.

mod computation;
mod twin_prime;

pub use computation::{ComputeError, Computation};
pub use twin_prime::TwinPrimeComputation;
