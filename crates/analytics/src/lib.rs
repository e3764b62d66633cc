//! # Finboard Analytics
//!
//! This crate turns raw marketplace transactions into the figures the finance
//! dashboard shows: one category per record, income/expense totals, chart
//! slices, and per-row detail for the breakdown table.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of the
//!   backend or of which tier produced the data. It depends only on
//!   `core-types` and on the category catalog from `configuration`.
//! - **Stateless Calculation:** Every component is a calculator over its inputs;
//!   the catalog it owns is immutable and can be swapped in tests.
//!
//! ## Public API
//!
//! - `Categorizer`: classifies one `RawRecord` into exactly one `Category`.
//! - `Aggregator`: folds classified amounts into a `FinanceSummary` and a sorted
//!   list of `CategoryAmount`s, and builds that list for any summary.
//! - `BreakdownProjector`: maps the most recent records into `BreakdownRow`s.

// Declare the modules that constitute this crate.
pub mod aggregator;
pub mod categorizer;
pub mod projector;

// Re-export the key components to create a clean, public-facing API.
pub use aggregator::Aggregator;
pub use categorizer::Categorizer;
pub use projector::{BreakdownProjector, DEFAULT_BREAKDOWN_LIMIT};
