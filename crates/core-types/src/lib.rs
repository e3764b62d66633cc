pub mod enums;
pub mod error;
pub mod normalize;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Category, DateType, SummarySource};
pub use error::CoreError;
pub use structs::{
    BreakdownRow, CategoryAmount, ClassifiedAmount, DateRange, FinanceReport, FinanceSummary,
    Filters, RawRecord,
};
