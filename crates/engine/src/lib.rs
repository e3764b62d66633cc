//! # Finboard Engine
//!
//! The orchestrator of the finance dashboard backend. It owns the tiered
//! fallback between the three backend query shapes and the date-range
//! precondition shared by every read path.
//!
//! ## Public API
//!
//! - `FinanceService`: summary and breakdown read paths for a date range and filters.
//! - `FallbackResolver`: tries the aggregate view, then the summary RPC, then
//!   the raw transactions, and reports which one answered.
//! - `Attempt`: the outcome of a single tier.
//! - `EngineError`: the specific error types that can be returned from this crate.

pub mod error;
pub mod resolver;
pub mod service;

#[cfg(test)]
mod testing;

pub use error::EngineError;
pub use resolver::{Attempt, FallbackResolver};
pub use service::FinanceService;
