//! FILENAME: core/filter-engine/src/lib.rs
//! Type-aware row filtering for query results.
//!
//! Layers:
//! - `definition`: Serializable filter descriptors (what the filter IS)
//! - `engine`: Resolution, compilation and evaluation (HOW rows are tested)
//!
//! Used by the pivot pipeline before pivoting, and standalone wherever only
//! row-level filtering is needed.

pub mod definition;
pub mod engine;

#[cfg(test)]
mod tests;

pub use definition::*;
pub use engine::{apply_filters, compile_filter, resolve_column, CompiledFilter, FilterOutcome, FilterPlan, Verdict};
